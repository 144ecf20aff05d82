use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CatalogError;

/// One playable item.  Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    #[serde(alias = "url")]
    pub source_url: String,
    #[serde(alias = "thumbnail", default)]
    pub thumbnail_url: String,
    pub name: String,
    #[serde(default)]
    pub album: String,
    #[serde(alias = "duration")]
    pub duration_secs: u32,
}

impl Track {
    /// Card caption, e.g. `Meri Neend Mera Chain (From "Hum Hain Rahi Pyar Ke")`.
    pub fn caption(&self) -> String {
        format!("{} (From \"{}\")", self.name, self.album)
    }
}

#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    track: Vec<Track>,
}

/// Ordered, read-only list of tracks with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(tracks.len());
        for t in &tracks {
            if !seen.insert(t.id) {
                return Err(CatalogError::DuplicateId(t.id));
            }
            if t.duration_secs == 0 {
                return Err(CatalogError::ZeroDuration(t.id));
            }
        }
        Ok(Self { tracks })
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            tracks: builtin_tracks(),
        }
    }

    pub fn parse_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: TomlCatalogFile = toml::from_str(content)?;
        Self::new(file.track)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml_str(&content)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in list.
    /// A file that fails to parse is logged and ignored.
    pub fn load_or_builtin(path: &Path) -> Self {
        if path.exists() {
            match Self::from_toml_file(path) {
                Ok(c) => {
                    info!("Loaded {} tracks from {}", c.len(), path.display());
                    return c;
                }
                Err(e) => warn!("Ignoring catalog {}: {}", path.display(), e),
            }
        }
        let c = Self::builtin();
        info!("Using built-in catalog ({} tracks)", c.len());
        c
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Resolve a route id to its track.
    pub fn find(&self, id: u32) -> Result<&Track, CatalogError> {
        self.tracks
            .iter()
            .find(|t| t.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn position_of(&self, id: u32) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }
}

fn builtin_tracks() -> Vec<Track> {
    vec![
        Track {
            id: 1,
            source_url: "https://cdn.jattpendu.com/download/128k-wuku/Meri-Neend-Mera-Chain.mp3"
                .to_string(),
            thumbnail_url: "https://cdn.jattpendu.com/thumbmed/1030389.jpg".to_string(),
            name: "Meri Neend Mera Chain".to_string(),
            album: "Hum Hain Rahi Pyar Ke".to_string(),
            duration_secs: 298,
        },
        Track {
            id: 2,
            source_url:
                "https://cdn.jattpendu.com/download/128k-wukg/Mujse-Mohabaat-Ka-Izhaar.mp3"
                    .to_string(),
            thumbnail_url: "https://cdn.jattpendu.com/thumbmed/1030389.jpg".to_string(),
            name: "Mujse Mohabaat Ka Izhaar".to_string(),
            album: "Hum Hain Rahi Pyar Ke".to_string(),
            duration_secs: 311,
        },
        Track {
            id: 3,
            source_url: "https://cdn.jattpendu.com/download/128k-ncgb/Teri-Chunnariya-(From-%22Hello-Brother%22).mp3"
                .to_string(),
            thumbnail_url: "https://thumb.pagalworld.gay/thumb/c/1868_4.jpg".to_string(),
            name: "Teri Chunariya Dil Legayi".to_string(),
            album: "Hello Brother (1999)".to_string(),
            duration_secs: 356,
        },
    ]
}
