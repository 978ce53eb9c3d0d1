//! Service layer implementing the CRUD contract shared by every resource.
//! - `resource` holds the generic five-operation service and its storage port.
//! - `products` / `users` describe each resource and provide its SeaORM store.
//! - Validation and password hashing happen here, before anything is written.

pub mod errors;
pub mod password;
pub mod products;
pub mod resource;
pub mod users;
#[cfg(test)]
pub mod test_support;
