//! Action enum: every user intent a component can produce.

/// Which page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Catalog grid, with the mini player once a track is selected.
    Index,
    /// Full-page player for one track id.
    Media(u32),
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlay,
    ToggleMute,
    IncreaseVolume,
    ToggleLoop,
    /// Seek to a fraction (0.0..=1.0) of the mounted track.
    Seek(f64),

    // ── Navigation ───────────────────────────────────────────────────────────
    /// Mount the mini player on this track id.
    Select(u32),
    /// Go to the full-page player for this track id.
    OpenMedia(u32),
    /// Leave the full-page player for the catalog.
    Back,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleDebug,
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

impl Action {
    /// Actions that change the mounted player's state.
    pub fn is_playback(&self) -> bool {
        matches!(
            self,
            Self::TogglePlay
                | Self::ToggleMute
                | Self::IncreaseVolume
                | Self::ToggleLoop
                | Self::Seek(_)
        )
    }
}
