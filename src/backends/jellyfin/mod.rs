mod api;
pub mod dto;
mod errors;


pub use api::{ApiResult, JellyfinApi};
pub use errors::JellyfinApiError;
