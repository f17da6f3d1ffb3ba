// hwtrack - Homework tracker core: token-scoped SQLite store and display ordering

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod record;
pub mod sorter;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, TrackerError};
pub use models::{Element, ElementId, ElementState, ElementType, Lesson, NewElement, Token, User, UserId};
pub use record::Record;
pub use sorter::{URGENCY_WINDOW_DAYS, sort_elements, sort_elements_within};
pub use store::Store;
