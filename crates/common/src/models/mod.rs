//! Data models shared across services
//!
//! Records mirror the search API payload and use its camelCase keys so
//! the persisted JSON files round-trip the API fields untouched.

mod record;

pub use record::{AuthorRef, Record};
