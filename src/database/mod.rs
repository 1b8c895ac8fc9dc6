pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{rollback, Database, DatabaseError};
