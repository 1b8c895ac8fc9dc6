pub mod collection;
pub mod record;
pub mod search;

// Re-export handler functions for use in routing
pub use collection::get as list;
pub use collection::post as create;

pub use record::delete;
pub use record::get;
pub use record::put as update;
pub use record::salary_history;

pub use search::{lookups, search};
