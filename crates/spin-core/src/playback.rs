//! Playback state machine for one mounted player.
//!
//! A `Player` is bound to a single track for its whole lifetime.  It owns the
//! transient UI state (playing / muted / looping / volume / progress) and
//! pushes every change to an `AudioOutput`, which is the host's playback
//! primitive.  Progress is advanced by an external 1 Hz timer calling
//! `on_tick()`; the audio primitive's own end-of-media signal calls
//! `on_ended()`.
//!
//! ```text
//!            play / toggle_play / seek
//!   Paused ─────────────────────────────▶ Playing
//!     ▲                                     │
//!     └──── pause / toggle_play / on_ended ─┤
//!     └──── on_tick at end (policy) ────────┘
//! ```

use tracing::debug;

use crate::catalog::Track;

/// Number of non-zero volume levels in the ladder (0.1 … 1.0).
pub const VOLUME_STEPS: u8 = 10;

// ── AudioOutput ───────────────────────────────────────────────────────────────

/// Side-effect sink for the host playback primitive.
///
/// Every call is fire-and-forget: implementations queue the request and
/// report failures out of band.  The state machine never waits for the
/// primitive and never rolls its own state back on failure.
pub trait AudioOutput {
    /// Bind `source` without starting playback.
    fn load(&mut self, source: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_position(&mut self, secs: u32);
    /// `volume` is 0.0..=1.0.
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
    fn set_looping(&mut self, looping: bool);
    /// Release the bound source.
    fn stop(&mut self);
}

// ── Volume ────────────────────────────────────────────────────────────────────

/// Output volume held as whole tenths, so it is always a ladder level or 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(u8);

impl Volume {
    pub const SILENT: Volume = Volume(0);
    pub const MAX: Volume = Volume(VOLUME_STEPS);

    /// Ladder level `tenths` (1..=10).  Out-of-range values clamp to the ladder.
    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.clamp(1, VOLUME_STEPS))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / f32::from(VOLUME_STEPS)
    }

    pub fn percent(self) -> u8 {
        self.0 * 10
    }

    /// Next ladder level, wrapping 1.0 → 0.1.  From silence this is 0.1.
    pub fn next_level(self) -> Self {
        if self.0 >= VOLUME_STEPS {
            Self(1)
        } else {
            Self(self.0 + 1)
        }
    }
}

/// Which volume glyph to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIcon {
    Off,
    Low,
    Medium,
    High,
}

impl VolumeIcon {
    /// Off when muted, High at ≥ 0.8, Medium in (0.2, 0.8), Low in (0, 0.2].
    pub fn for_state(muted: bool, volume: Volume) -> Self {
        if muted {
            return Self::Off;
        }
        match volume.tenths() {
            0 => Self::Off,
            1..=2 => Self::Low,
            3..=7 => Self::Medium,
            _ => Self::High,
        }
    }
}

// ── Variant policy ────────────────────────────────────────────────────────────

/// What the progress timer does when progress reaches the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Always stop and rewind, regardless of the loop flag.
    AlwaysReset,
    /// Stop and rewind unless looping; when looping, restart the counter and
    /// keep playing while the primitive loops the media.
    ResetUnlessLooping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerVariant {
    /// Inline bar under the catalog.
    Mini,
    /// Full-page player with debug overlay.
    Full,
}

impl PlayerVariant {
    pub fn default_volume(self) -> Volume {
        match self {
            Self::Mini => Volume::from_tenths(8),
            Self::Full => Volume::from_tenths(5),
        }
    }

    pub fn end_policy(self) -> EndPolicy {
        match self {
            Self::Mini => EndPolicy::ResetUnlessLooping,
            Self::Full => EndPolicy::AlwaysReset,
        }
    }

    pub fn has_loop_control(self) -> bool {
        matches!(self, Self::Mini)
    }

    pub fn has_debug_overlay(self) -> bool {
        matches!(self, Self::Full)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Result of one progress-timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed.
    Ignored,
    /// Progress moved forward by one second.
    Advanced,
    /// Reached the end while looping; counter restarted, still playing.
    Looped,
    /// Reached the end; paused and rewound.
    Ended,
}

pub struct Player<A: AudioOutput> {
    track: Track,
    variant: PlayerVariant,
    audio: A,
    is_playing: bool,
    is_muted: bool,
    is_looping: bool,
    volume: Volume,
    progress_secs: u32,
}

impl<A: AudioOutput> Player<A> {
    /// Bind `track` to `audio` and start from the variant's defaults.
    pub fn mount(track: Track, variant: PlayerVariant, mut audio: A) -> Self {
        let volume = variant.default_volume();
        audio.load(&track.source_url);
        audio.set_volume(volume.as_f32());
        audio.set_muted(false);
        audio.set_looping(false);
        debug!(
            "player: mounted {:?} id={} src={}",
            variant, track.id, track.source_url
        );
        Self {
            track,
            variant,
            audio,
            is_playing: false,
            is_muted: false,
            is_looping: false,
            volume,
            progress_secs: 0,
        }
    }

    /// Stop the primitive and drop this player's state.
    pub fn unmount(mut self) -> A {
        debug!("player: unmounted id={}", self.track.id);
        self.audio.stop();
        self.audio
    }

    // ── transport ─────────────────────────────────────────────────────────────

    pub fn play(&mut self) {
        self.audio.play();
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.audio.pause();
        self.is_playing = false;
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
        self.audio.set_looping(self.is_looping);
    }

    /// Unmuting restores the variant default, not the pre-mute level.
    pub fn toggle_mute(&mut self) {
        self.is_muted = !self.is_muted;
        self.volume = if self.is_muted {
            Volume::SILENT
        } else {
            self.variant.default_volume()
        };
        self.audio.set_muted(self.is_muted);
        self.audio.set_volume(self.volume.as_f32());
    }

    pub fn increase_volume(&mut self) {
        self.volume = self.volume.next_level();
        self.audio.set_volume(self.volume.as_f32());
    }

    /// Jump to `fraction` (clamped to 0..=1) of the track and make sure it plays.
    pub fn seek(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let target = (f64::from(self.track.duration_secs) * fraction).floor() as u32;
        self.progress_secs = target.min(self.track.duration_secs);
        self.audio.set_position(self.progress_secs);
        if !self.is_playing {
            self.play();
        }
    }

    /// Seek from a click `x` cells/pixels into a bar `width` wide.
    pub fn seek_at(&mut self, x: f64, width: f64) {
        if width <= 0.0 {
            return;
        }
        self.seek(x / width);
    }

    // ── time source ───────────────────────────────────────────────────────────

    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.is_playing {
            return TickOutcome::Ignored;
        }
        self.progress_secs = self.progress_secs.saturating_add(1);
        if self.progress_secs < self.track.duration_secs {
            return TickOutcome::Advanced;
        }
        match (self.variant.end_policy(), self.is_looping) {
            (EndPolicy::ResetUnlessLooping, true) => {
                self.progress_secs = 0;
                TickOutcome::Looped
            }
            _ => {
                self.end_of_track();
                TickOutcome::Ended
            }
        }
    }

    /// End-of-media notification from the audio primitive.
    pub fn on_ended(&mut self) {
        self.end_of_track();
    }

    fn end_of_track(&mut self) {
        debug!("player: end of track id={}", self.track.id);
        self.audio.pause();
        self.audio.set_position(0);
        self.is_playing = false;
        self.progress_secs = 0;
    }

    // ── accessors ─────────────────────────────────────────────────────────────

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn variant(&self) -> PlayerVariant {
        self.variant
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn progress_secs(&self) -> u32 {
        self.progress_secs
    }

    /// 0.0..=1.0 fill for a progress bar.
    pub fn progress_ratio(&self) -> f64 {
        if self.track.duration_secs == 0 {
            return 0.0;
        }
        f64::from(self.progress_secs) / f64::from(self.track.duration_secs)
    }

    pub fn volume_icon(&self) -> VolumeIcon {
        VolumeIcon::for_state(self.is_muted, self.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Null;

    impl AudioOutput for Null {
        fn load(&mut self, _source: &str) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn set_position(&mut self, _secs: u32) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn set_muted(&mut self, _muted: bool) {}
        fn set_looping(&mut self, _looping: bool) {}
        fn stop(&mut self) {}
    }

    fn track(duration_secs: u32) -> Track {
        Track {
            id: 1,
            source_url: "file:///a.mp3".into(),
            thumbnail_url: String::new(),
            name: "a".into(),
            album: "b".into(),
            duration_secs,
        }
    }

    #[test]
    fn test_volume_ladder_wraps() {
        assert_eq!(Volume::MAX.next_level(), Volume::from_tenths(1));
        assert_eq!(Volume::SILENT.next_level(), Volume::from_tenths(1));
        assert_eq!(Volume::from_tenths(0), Volume::from_tenths(1));
        assert_eq!(Volume::from_tenths(8).percent(), 80);
    }

    #[test]
    fn test_volume_icon_thresholds() {
        let v = Volume::from_tenths;
        assert_eq!(VolumeIcon::for_state(true, v(10)), VolumeIcon::Off);
        assert_eq!(VolumeIcon::for_state(false, Volume::SILENT), VolumeIcon::Off);
        assert_eq!(VolumeIcon::for_state(false, v(1)), VolumeIcon::Low);
        assert_eq!(VolumeIcon::for_state(false, v(2)), VolumeIcon::Low);
        assert_eq!(VolumeIcon::for_state(false, v(3)), VolumeIcon::Medium);
        assert_eq!(VolumeIcon::for_state(false, v(7)), VolumeIcon::Medium);
        assert_eq!(VolumeIcon::for_state(false, v(8)), VolumeIcon::High);
    }

    #[test]
    fn test_tick_while_paused_is_ignored() {
        let mut p = Player::mount(track(10), PlayerVariant::Mini, Null);
        assert_eq!(p.on_tick(), TickOutcome::Ignored);
        assert_eq!(p.progress_secs(), 0);
    }

    #[test]
    fn test_looping_mini_restarts_counter() {
        let mut p = Player::mount(track(3), PlayerVariant::Mini, Null);
        p.toggle_loop();
        p.play();
        assert_eq!(p.on_tick(), TickOutcome::Advanced);
        assert_eq!(p.on_tick(), TickOutcome::Advanced);
        assert_eq!(p.on_tick(), TickOutcome::Looped);
        assert_eq!(p.progress_secs(), 0);
        assert!(p.is_playing());
    }

    #[test]
    fn test_seek_nan_and_out_of_range_clamp() {
        let mut p = Player::mount(track(100), PlayerVariant::Full, Null);
        p.seek(f64::NAN);
        assert_eq!(p.progress_secs(), 0);
        p.seek(3.0);
        assert_eq!(p.progress_secs(), 100);
        p.seek(-1.0);
        assert_eq!(p.progress_secs(), 0);
    }
}
