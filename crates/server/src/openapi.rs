//! OpenAPI document. The generic handlers are described per collection by
//! the doc-only operations below.

use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::dto::{ProductResponse, UserResponse};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBody { pub error: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductRequestDoc {
    /// Ignored on create; must equal the path id on replace.
    pub id: Option<i32>,
    #[schema(max_length = 100, min_length = 1)]
    pub name: String,
    #[schema(max_length = 500)]
    pub description: Option<String>,
    /// Must be greater than zero.
    #[schema(example = 9.99)]
    pub price: f64,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserRequestDoc {
    pub id: Option<i32>,
    #[schema(max_length = 100, min_length = 1)]
    pub name: String,
    #[schema(max_length = 100)]
    pub email: String,
    #[schema(max_length = 20, min_length = 1)]
    pub phone_number: String,
    /// Write-only.
    #[schema(max_length = 100, min_length = 1)]
    pub password: String,
}

#[utoipa::path(get, path = "/api/products", tag = "products",
    responses((status = 200, description = "All products ordered by id", body = [ProductResponse])))]
pub fn list_products() {}

#[utoipa::path(get, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub fn get_product() {}

#[utoipa::path(post, path = "/api/products", tag = "products",
    request_body = ProductRequestDoc,
    responses(
        (status = 201, description = "Created", body = ProductResponse,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    ))]
pub fn create_product() {}

#[utoipa::path(put, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductRequestDoc,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Invalid payload or id mismatch", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 500, description = "Concurrent modification")
    ))]
pub fn replace_product() {}

#[utoipa::path(delete, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub fn delete_product() {}

#[utoipa::path(get, path = "/api/users", tag = "users",
    responses((status = 200, description = "All users ordered by id", body = [UserResponse])))]
pub fn list_users() {}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub fn get_user() {}

#[utoipa::path(post, path = "/api/users", tag = "users",
    request_body = UserRequestDoc,
    responses(
        (status = 201, description = "Created", body = UserResponse,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    ))]
pub fn create_user() {}

#[utoipa::path(put, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserRequestDoc,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Invalid payload or id mismatch", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 500, description = "Concurrent modification")
    ))]
pub fn replace_user() {}

#[utoipa::path(delete, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub fn delete_user() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        list_products,
        get_product,
        create_product,
        replace_product,
        delete_product,
        list_users,
        get_user,
        create_user,
        replace_user,
        delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            ProductRequestDoc,
            UserRequestDoc,
            ProductResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "products"),
        (name = "users")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_both_collections() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/api/products", "/api/products/{id}", "/api/users", "/api/users/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
