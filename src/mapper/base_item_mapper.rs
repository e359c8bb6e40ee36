use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::backends::jellyfin::dto::BaseItemDto;
use crate::models::{BaseItem, BaseItemKind, MediaItemId, SeriesId};

/// Jellyfin ticks are 100ns units.
pub struct TicksTransformer;

impl TicksTransformer {
    pub const TICKS_PER_SECOND: u64 = 10_000_000;

    pub fn to_duration(ticks: Option<u64>) -> Option<Duration> {
        ticks.map(|t| Duration::from_nanos(t.saturating_mul(100)))
    }

    pub fn from_duration(duration: Duration) -> u64 {
        (duration.as_nanos() / 100) as u64
    }
}

pub struct DateTimeTransformer;

impl DateTimeTransformer {
    pub fn from_rfc3339(s: Option<&str>) -> Option<DateTime<Utc>> {
        s.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Maps `BaseItemDto`s into `BaseItem`s for one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseItemMapper {
    pub use_series_for_primary: bool,
}

impl BaseItemMapper {
    pub fn new(use_series_for_primary: bool) -> Self {
        Self {
            use_series_for_primary,
        }
    }

    pub fn map(&self, dto: BaseItemDto) -> BaseItem {
        let kind = dto
            .item_type
            .as_deref()
            .map(BaseItemKind::from)
            .unwrap_or_else(|| BaseItemKind::Other(String::new()));
        let user_data = dto.user_data.unwrap_or_default();

        BaseItem {
            id: MediaItemId::new(dto.id),
            name: dto.name.unwrap_or_default(),
            sort_name: dto.sort_name,
            kind,
            series_id: dto.series_id.map(SeriesId::new),
            series_name: dto.series_name,
            season_number: dto.parent_index_number,
            episode_number: dto.index_number,
            production_year: dto.production_year,
            runtime: TicksTransformer::to_duration(dto.run_time_ticks),
            playback_position: TicksTransformer::to_duration(user_data.playback_position_ticks),
            played: user_data.played,
            favorite: user_data.is_favorite,
            premiere_date: DateTimeTransformer::from_rfc3339(dto.premiere_date.as_deref()),
            start_date: DateTimeTransformer::from_rfc3339(dto.start_date.as_deref()),
            end_date: DateTimeTransformer::from_rfc3339(dto.end_date.as_deref()),
            channel_name: dto.channel_name,
            primary_image_tag: dto.image_tags.primary,
            series_primary_image_tag: dto.series_primary_image_tag,
            use_series_for_primary: self.use_series_for_primary,
        }
    }
}
