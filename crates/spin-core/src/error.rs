use std::path::PathBuf;

/// Failures raised while building or querying the track catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no track with id {0}")]
    NotFound(u32),

    #[error("duplicate track id {0}")]
    DuplicateId(u32),

    #[error("track {0} has a zero duration")]
    ZeroDuration(u32),

    #[error("failed to read catalog {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog toml: {0}")]
    Parse(#[from] toml::de::Error),
}
