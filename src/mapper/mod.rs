//! Conversions from Jellyfin wire DTOs to client models.

mod base_item_mapper;

pub use base_item_mapper::{BaseItemMapper, DateTimeTransformer, TicksTransformer};
