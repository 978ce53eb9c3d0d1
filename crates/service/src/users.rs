//! User resource and its SeaORM store.
//!
//! The plain-text password never leaves this module: it is hashed in
//! [`Users::prepare`] and only the hash reaches the table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use models::user::{self, UserInput};
use crate::errors::ServiceError;
use crate::password;
use crate::resource::{Resource, ResourceService, ResourceStore, Versioned};

pub struct Users;

/// Writable user columns, password already hashed.
#[derive(Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
}

impl Resource for Users {
    const NAME: &'static str = "user";

    type Input = UserInput;
    type Draft = UserDraft;
    type Record = user::Model;

    fn input_id(input: &UserInput) -> Option<i32> { input.id }

    fn prepare(input: UserInput) -> Result<UserDraft, ServiceError> {
        let password_hash = password::hash_password(&input.password)?;
        Ok(UserDraft {
            name: input.name,
            email: input.email,
            phone_number: input.phone_number,
            password_hash,
        })
    }
}

impl Versioned for user::Model {
    fn id(&self) -> i32 { self.id }
    fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
}

/// User service over a SeaORM connection.
pub fn service(db: DatabaseConnection) -> ResourceService<Users> {
    ResourceService::new(Arc::new(SeaOrmUserStore { db }))
}

/// SeaORM-backed user store.
pub struct SeaOrmUserStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ResourceStore<Users> for SeaOrmUserStore {
    async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        user::Entity::find_by_id(id).one(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(&self, draft: UserDraft, now: DateTime<Utc>) -> Result<user::Model, ServiceError> {
        let am = user::ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            email: Set(draft.email),
            phone_number: Set(draft.phone_number),
            password_hash: Set(draft.password_hash),
            created_at: Set(now),
            updated_at: Set(None),
        };
        am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn replace(&self, current: &user::Model, draft: UserDraft, now: DateTime<Utc>) -> Result<(), ServiceError> {
        let am = user::ActiveModel {
            name: Set(draft.name),
            email: Set(draft.email),
            phone_number: Set(draft.phone_number),
            password_hash: Set(draft.password_hash),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        let guard = match current.updated_at {
            Some(ts) => user::Column::UpdatedAt.eq(ts),
            None => user::Column::UpdatedAt.is_null(),
        };
        let res = user::Entity::update_many()
            .set(am)
            .filter(user::Column::Id.eq(current.id))
            .filter(guard)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Err(ServiceError::WriteConflict(format!("user {} changed since it was read", current.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }
}
