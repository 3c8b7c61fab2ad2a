pub mod api;

pub use api::{ApiErrorBody, ApiResponse, PageMeta};
