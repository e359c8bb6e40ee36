pub mod jellyfin;

pub use jellyfin::{JellyfinApi, JellyfinApiError};
