//! Per-request persistence context.
//!
//! Every resource handler takes a [`PersistenceContext`] as its first
//! extractor. The context is opened before the handler body runs and
//! released when it is dropped, on every exit path.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use sea_orm::DatabaseConnection;
use tracing::trace;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Shared application state. Only the connection pool lives here.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

pub struct PersistenceContext {
    id: u64,
    db: DatabaseConnection,
    opened_at: Instant,
}

impl PersistenceContext {
    pub fn open(db: &DatabaseConnection) -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!(context_id = id, "persistence context opened");
        Self { id, db: db.clone(), opened_at: Instant::now() }
    }

    /// Pool handle scoped to this request.
    pub fn connection(&self) -> DatabaseConnection {
        self.db.clone()
    }
}

impl Drop for PersistenceContext {
    fn drop(&mut self) {
        trace!(
            context_id = self.id,
            elapsed_us = self.opened_at.elapsed().as_micros() as u64,
            "persistence context released"
        );
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PersistenceContext
where
    ServerState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ServerState::from_ref(state);
        Ok(Self::open(&state.db))
    }
}
