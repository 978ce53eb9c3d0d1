//! Pieces shared by every crate in the workspace: tracing setup and the
//! health payload.

pub mod types;
pub mod utils;
