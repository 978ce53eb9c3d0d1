//! SeaORM entities for the two independent tables plus the write payloads
//! (with their validation rules) that feed them.

pub mod db;
pub mod product;
pub mod user;
