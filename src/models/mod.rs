mod identifiers;

pub use identifiers::{LibraryId, MediaItemId, PlaylistId, SeriesId, UserId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Item types the lists can contain. Anything the client does not
/// special-case is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseItemKind {
    Movie,
    Series,
    Season,
    Episode,
    BoxSet,
    Playlist,
    Genre,
    Program,
    TvChannel,
    CollectionFolder,
    Folder,
    MusicAlbum,
    Audio,
    Video,
    Other(String),
}

impl BaseItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            BaseItemKind::Movie => "Movie",
            BaseItemKind::Series => "Series",
            BaseItemKind::Season => "Season",
            BaseItemKind::Episode => "Episode",
            BaseItemKind::BoxSet => "BoxSet",
            BaseItemKind::Playlist => "Playlist",
            BaseItemKind::Genre => "Genre",
            BaseItemKind::Program => "Program",
            BaseItemKind::TvChannel => "TvChannel",
            BaseItemKind::CollectionFolder => "CollectionFolder",
            BaseItemKind::Folder => "Folder",
            BaseItemKind::MusicAlbum => "MusicAlbum",
            BaseItemKind::Audio => "Audio",
            BaseItemKind::Video => "Video",
            BaseItemKind::Other(other) => other,
        }
    }

    pub fn is_playable(&self) -> bool {
        matches!(
            self,
            BaseItemKind::Movie
                | BaseItemKind::Episode
                | BaseItemKind::Video
                | BaseItemKind::Audio
                | BaseItemKind::Program
        )
    }
}

impl From<&str> for BaseItemKind {
    fn from(value: &str) -> Self {
        match value {
            "Movie" => BaseItemKind::Movie,
            "Series" => BaseItemKind::Series,
            "Season" => BaseItemKind::Season,
            "Episode" => BaseItemKind::Episode,
            "BoxSet" => BaseItemKind::BoxSet,
            "Playlist" => BaseItemKind::Playlist,
            "Genre" | "MusicGenre" => BaseItemKind::Genre,
            "Program" | "LiveTvProgram" => BaseItemKind::Program,
            "TvChannel" => BaseItemKind::TvChannel,
            "CollectionFolder" | "UserView" => BaseItemKind::CollectionFolder,
            "Folder" => BaseItemKind::Folder,
            "MusicAlbum" => BaseItemKind::MusicAlbum,
            "Audio" => BaseItemKind::Audio,
            "Video" => BaseItemKind::Video,
            other => BaseItemKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BaseItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item id + tag pair identifying a cached server image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub item_id: &'a str,
    pub tag: &'a str,
}

/// The client-side media entity every list row is built from.
///
/// Immutable once decoded; pagers hand out `Arc<BaseItem>` so one decoded
/// page is shared by every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseItem {
    pub id: MediaItemId,
    pub name: String,
    pub sort_name: Option<String>,
    pub kind: BaseItemKind,
    pub series_id: Option<SeriesId>,
    pub series_name: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub production_year: Option<u32>,
    pub runtime: Option<Duration>,
    pub playback_position: Option<Duration>,
    pub played: bool,
    pub favorite: bool,
    pub premiere_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub channel_name: Option<String>,
    pub primary_image_tag: Option<String>,
    pub series_primary_image_tag: Option<String>,
    /// Rows such as "next up" show the series poster instead of the
    /// episode still.
    pub use_series_for_primary: bool,
}

impl BaseItem {
    /// Title as shown in a card: "Series - S1E2" for episodes, the name otherwise.
    pub fn title(&self) -> String {
        match (&self.kind, &self.series_name) {
            (BaseItemKind::Episode, Some(series)) => match (self.season_number, self.episode_number) {
                (Some(season), Some(episode)) => format!("{} - S{}E{}", series, season, episode),
                _ => series.clone(),
            },
            _ => self.name.clone(),
        }
    }

    pub fn primary_image(&self) -> Option<ImageRef<'_>> {
        if self.use_series_for_primary
            && let (Some(series_id), Some(tag)) = (&self.series_id, &self.series_primary_image_tag)
        {
            return Some(ImageRef {
                item_id: series_id.as_str(),
                tag,
            });
        }

        self.primary_image_tag.as_deref().map(|tag| ImageRef {
            item_id: self.id.as_str(),
            tag,
        })
    }

    /// Resume progress in `[0, 100]`, `None` when nothing was watched yet.
    pub fn played_percentage(&self) -> Option<f64> {
        let position = self.playback_position?;
        let runtime = self.runtime?;
        if runtime.is_zero() || position.is_zero() {
            return None;
        }
        Some((position.as_secs_f64() / runtime.as_secs_f64() * 100.0).min(100.0))
    }
}
