//! Extractors whose rejections render as [`ApiError`] instead of axum's
//! plain-text defaults.

use axum::extract::{FromRequest, FromRequestParts};
use serde::Deserialize;

use crate::errors::ApiError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Integer id taken from the `:id` path segment.
#[derive(FromRequestParts, Deserialize)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath(pub i32);
