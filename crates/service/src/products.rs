//! Product resource and its SeaORM store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use models::product::{self, ProductInput};
use crate::errors::ServiceError;
use crate::resource::{Resource, ResourceService, ResourceStore, Versioned};

pub struct Products;

/// Writable product columns.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

impl Resource for Products {
    const NAME: &'static str = "product";

    type Input = ProductInput;
    type Draft = ProductDraft;
    type Record = product::Model;

    fn input_id(input: &ProductInput) -> Option<i32> { input.id }

    fn prepare(input: ProductInput) -> Result<ProductDraft, ServiceError> {
        Ok(ProductDraft { name: input.name, description: input.description, price: input.price })
    }
}

impl Versioned for product::Model {
    fn id(&self) -> i32 { self.id }
    fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
}

/// Product service over a SeaORM connection.
///
/// ```
/// # use migration::MigratorTrait;
/// # tokio_test::block_on(async {
/// let cfg = configs::DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
/// let db = models::db::connect_with_config(&cfg).await.unwrap();
/// migration::Migrator::up(&db, None).await.unwrap();
///
/// let products = service::products::service(db);
/// assert!(products.list().await.unwrap().is_empty());
/// assert!(products.get(1).await.is_err());
/// # });
/// ```
pub fn service(db: DatabaseConnection) -> ResourceService<Products> {
    ResourceService::new(Arc::new(SeaOrmProductStore { db }))
}

/// SeaORM-backed product store.
pub struct SeaOrmProductStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ResourceStore<Products> for SeaOrmProductStore {
    async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find(&self, id: i32) -> Result<Option<product::Model>, ServiceError> {
        product::Entity::find_by_id(id).one(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(&self, draft: ProductDraft, now: DateTime<Utc>) -> Result<product::Model, ServiceError> {
        let am = product::ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            created_at: Set(now),
            updated_at: Set(None),
        };
        am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn replace(&self, current: &product::Model, draft: ProductDraft, now: DateTime<Utc>) -> Result<(), ServiceError> {
        let am = product::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        let guard = match current.updated_at {
            Some(ts) => product::Column::UpdatedAt.eq(ts),
            None => product::Column::UpdatedAt.is_null(),
        };
        let res = product::Entity::update_many()
            .set(am)
            .filter(product::Column::Id.eq(current.id))
            .filter(guard)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Err(ServiceError::WriteConflict(format!("product {} changed since it was read", current.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = product::Entity::delete_by_id(id).exec(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }
}
