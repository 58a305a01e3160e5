pub mod tidal;

use anyhow::Result;
use async_trait::async_trait;

/// Entity kind a search hit was resolved as by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Album,
    Track,
    Playlist,
    Other,
}

impl EntityKind {
    /// Map a provider type tag (e.g. "ARTISTS" on a Tidal top hit)
    pub fn from_type_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "ARTIST" | "ARTISTS" => EntityKind::Artist,
            "ALBUM" | "ALBUMS" => EntityKind::Album,
            "TRACK" | "TRACKS" => EntityKind::Track,
            "PLAYLIST" | "PLAYLISTS" => EntityKind::Playlist,
            _ => EntityKind::Other,
        }
    }
}

/// Outcome of resolving one free-text name against the search capability.
///
/// Resolved once at the provider boundary; callers never see the raw
/// response shape.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// No usable top hit for the query
    NoMatch,
    /// The top-ranked hit
    Match {
        id: u64,
        name: String,
        kind: EntityKind,
    },
}

/// Remote capabilities the reconciliation loop depends on
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Check if the service holds a usable session
    fn is_authenticated(&self) -> bool;

    /// Resolve a free-text artist name to the provider's top-ranked hit
    async fn search_artist(&mut self, query: &str, limit: usize) -> Result<SearchOutcome>;

    /// Add an artist to the acting user's favorites.
    ///
    /// Re-adding an already-favorited artist must succeed without
    /// duplicating it.
    async fn add_favorite_artist(&mut self, artist_id: u64) -> Result<()>;
}

pub use tidal::TidalClient;
