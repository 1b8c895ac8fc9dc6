// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus service info and health probes.

pub mod auth;
pub mod health;

pub use health::{health, root};
