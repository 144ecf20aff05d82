//! AppState: shared read-only data passed to all components during render/event.
//!
//! The App event loop is the only thing that writes to AppState.  The
//! mounted player's state lives in `PlayerSession`; `now_playing` is a copy
//! taken after every change so components never reach into the session.

use chrono::{DateTime, Local};
use spin_core::catalog::{Catalog, Track};
use spin_core::playback::{PlayerVariant, Volume, VolumeIcon};

use crate::action::Route;

/// Snapshot of the mounted player.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub track: Track,
    pub variant: PlayerVariant,
    pub is_playing: bool,
    pub is_muted: bool,
    pub is_looping: bool,
    pub volume: Volume,
    pub volume_icon: VolumeIcon,
    pub progress_secs: u32,
    pub progress_ratio: f64,
    pub debug_visible: bool,
    /// Last debug clock reading.
    pub clock: DateTime<Local>,
}

pub struct AppState {
    pub catalog: Catalog,
    pub route: Route,
    pub now_playing: Option<NowPlaying>,
    pub show_keys_bar: bool,
    pub show_help: bool,
}

impl AppState {
    pub fn new(catalog: Catalog, route: Route, show_keys_bar: bool) -> Self {
        Self {
            catalog,
            route,
            now_playing: None,
            show_keys_bar,
            show_help: false,
        }
    }

    /// Id of the mounted track, if any.
    pub fn playing_id(&self) -> Option<u32> {
        self.now_playing.as_ref().map(|np| np.track.id)
    }
}
