//! Generic CRUD handlers, mounted once per resource.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::products::Products;
use service::resource::{Resource, ResourceService, Versioned};
use service::users::Users;

use crate::context::{PersistenceContext, ServerState};
use crate::dto::{ProductResponse, UserResponse};
use crate::errors::ApiError;
use crate::extract::{IdPath, JsonBody};

/// A resource reachable over HTTP under `/api/{COLLECTION}`.
pub trait HttpResource: Resource + Sized {
    const COLLECTION: &'static str;
    type Response: Serialize + From<Self::Record> + Send + 'static;

    fn service(db: DatabaseConnection) -> ResourceService<Self>;
}

impl HttpResource for Products {
    const COLLECTION: &'static str = "products";
    type Response = ProductResponse;

    fn service(db: DatabaseConnection) -> ResourceService<Self> {
        service::products::service(db)
    }
}

impl HttpResource for Users {
    const COLLECTION: &'static str = "users";
    type Response = UserResponse;

    fn service(db: DatabaseConnection) -> ResourceService<Self> {
        service::users::service(db)
    }
}

pub async fn list<R: HttpResource>(ctx: PersistenceContext) -> Result<Json<Vec<R::Response>>, ApiError> {
    let records = R::service(ctx.connection()).list().await?;
    Ok(Json(records.into_iter().map(R::Response::from).collect()))
}

pub async fn fetch<R: HttpResource>(
    ctx: PersistenceContext,
    IdPath(id): IdPath,
) -> Result<Json<R::Response>, ApiError> {
    let record = R::service(ctx.connection()).get(id).await?;
    Ok(Json(R::Response::from(record)))
}

pub async fn create<R: HttpResource>(
    ctx: PersistenceContext,
    JsonBody(input): JsonBody<R::Input>,
) -> Result<Response, ApiError> {
    let record = R::service(ctx.connection()).create(input).await?;
    let location = format!("/api/{}/{}", R::COLLECTION, record.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(R::Response::from(record)),
    )
        .into_response())
}

pub async fn replace<R: HttpResource>(
    ctx: PersistenceContext,
    IdPath(id): IdPath,
    JsonBody(input): JsonBody<R::Input>,
) -> Result<StatusCode, ApiError> {
    R::service(ctx.connection()).replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove<R: HttpResource>(ctx: PersistenceContext, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    R::service(ctx.connection()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `/api/{collection}` and `/api/{collection}/:id` for resource `R`.
pub fn resource_routes<R: HttpResource>() -> Router<ServerState> {
    let collection = format!("/api/{}", R::COLLECTION);
    let item = format!("{}/:id", collection);
    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&item, get(fetch::<R>).put(replace::<R>).delete(remove::<R>))
}
