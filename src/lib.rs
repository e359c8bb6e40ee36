//! Paged, cached, observable lists over Jellyfin server collections.
//!
//! [`pager::ApiRequestPager`] backs every scrollable row and grid of the
//! client: it exposes a remote paginated endpoint as a randomly indexable
//! list, fetching pages on demand through a [`pager::RequestHandler`].

pub mod backends;
pub mod config;
pub mod constants;
pub mod mapper;
pub mod models;
pub mod pager;

#[cfg(test)]
mod test_utils;

pub use backends::{JellyfinApi, JellyfinApiError};
pub use config::Config;
pub use models::{BaseItem, BaseItemKind};
pub use pager::{ApiRequestPager, PagerError, PagerSnapshot, RequestHandler};
