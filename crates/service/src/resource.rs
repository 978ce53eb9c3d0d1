//! Generic CRUD contract shared by every exposed resource.
//!
//! A [`Resource`] describes the payload/record types of one collection, a
//! [`ResourceStore`] persists them, and [`ResourceService`] implements the
//! five operations once on top of both.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::errors::ServiceError;

/// Static description of one resource collection.
pub trait Resource: Send + Sync + 'static {
    /// Singular name used in error messages and logs.
    const NAME: &'static str;

    /// Write payload as received from the caller.
    type Input: Validate + DeserializeOwned + Send + Sync + 'static;
    /// Validated payload ready to be persisted.
    type Draft: Send + Sync + 'static;
    /// Persisted row.
    type Record: Versioned + Send + Sync + 'static;

    /// Id carried by the payload, if any.
    fn input_id(input: &Self::Input) -> Option<i32>;

    /// Turn a validated payload into a draft.
    fn prepare(input: Self::Input) -> Result<Self::Draft, ServiceError>;
}

/// Identity and revision marker of a stored row.
pub trait Versioned {
    fn id(&self) -> i32;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Storage port for one resource.
#[async_trait]
pub trait ResourceStore<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R::Record>, ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<R::Record>, ServiceError>;
    async fn insert(&self, draft: R::Draft, now: DateTime<Utc>) -> Result<R::Record, ServiceError>;
    /// Overwrite every writable column of `current` and set `updated_at` to
    /// `now`, only if the row still carries `current.updated_at()`.
    /// Returns [`ServiceError::WriteConflict`] when no row matched.
    async fn replace(&self, current: &R::Record, draft: R::Draft, now: DateTime<Utc>) -> Result<(), ServiceError>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// The five CRUD operations for resource `R`.
pub struct ResourceService<R: Resource> {
    store: Arc<dyn ResourceStore<R>>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn ResourceStore<R>>) -> Self { Self { store } }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list(&self) -> Result<Vec<R::Record>, ServiceError> {
        self.store.list().await
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn get(&self, id: i32) -> Result<R::Record, ServiceError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::NAME, id))
    }

    /// Validate and insert. Any payload id is ignored.
    #[instrument(skip(self, input), fields(resource = R::NAME))]
    pub async fn create(&self, input: R::Input) -> Result<R::Record, ServiceError> {
        input.validate()?;
        let draft = R::prepare(input)?;
        let record = self.store.insert(draft, timestamp_now()).await?;
        info!(id = record.id(), "record_created");
        Ok(record)
    }

    /// Full replace of an existing record.
    ///
    /// A write conflict is checked exactly once more: if the row is gone the
    /// caller gets `NotFound`, otherwise the conflict itself is returned.
    #[instrument(skip(self, input), fields(resource = R::NAME))]
    pub async fn replace(&self, id: i32, input: R::Input) -> Result<(), ServiceError> {
        if let Some(body) = R::input_id(&input) {
            if body != id {
                return Err(ServiceError::IdMismatch { path: id, body });
            }
        }
        input.validate()?;

        let current = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::NAME, id))?;
        let draft = R::prepare(input)?;
        let now = next_revision(current.updated_at());

        match self.store.replace(&current, draft, now).await {
            Ok(()) => {
                info!(id, "record_replaced");
                Ok(())
            }
            Err(ServiceError::WriteConflict(reason)) => {
                if self.store.find(id).await?.is_some() {
                    error!(id, %reason, "write conflict on replace; record still exists");
                    Err(ServiceError::WriteConflict(reason))
                } else {
                    warn!(id, "record deleted while being replaced");
                    Err(ServiceError::not_found(R::NAME, id))
                }
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if self.store.delete(id).await? {
            info!(id, "record_deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found(R::NAME, id))
        }
    }
}

/// Current time at the microsecond precision the database keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// New `updated_at` value, strictly after `previous`.
pub fn next_revision(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = timestamp_now();
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}
