//! PlayerSession: one mounted player plus the timers scoped to it.
//!
//! The session owns the `Player`, its progress timer (runs while playing)
//! and its debug clock (runs while the overlay is visible).  After every
//! state change `sync_timers` brings both slots in line with their
//! conditions.  Dropping the session drops both slots, which aborts the
//! timer tasks.

use chrono::Local;
use spin_core::catalog::Track;
use spin_core::playback::{Player, PlayerVariant, TickOutcome};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::action::Action;
use crate::app::AppMessage;
use crate::app_state::NowPlaying;
use crate::audio::AudioHandle;
use crate::timer::{tick_timer, MountId, TimerKind, TimerSlot, TimerTick};

pub struct PlayerSession {
    mount: MountId,
    player: Player<AudioHandle>,
    progress: TimerSlot,
    clock: TimerSlot,
    debug_visible: bool,
    clock_reading: chrono::DateTime<Local>,
    tx: mpsc::Sender<AppMessage>,
}

impl PlayerSession {
    pub fn mount(
        mount: MountId,
        track: Track,
        variant: PlayerVariant,
        audio: AudioHandle,
        tx: mpsc::Sender<AppMessage>,
    ) -> Self {
        Self {
            mount,
            player: Player::mount(track, variant, audio),
            progress: TimerSlot::new(),
            clock: TimerSlot::new(),
            debug_visible: false,
            clock_reading: Local::now(),
            tx,
        }
    }

    /// Stop playback and release the timers.
    pub fn unmount(self) {
        let Self {
            mount,
            player,
            mut progress,
            mut clock,
            ..
        } = self;
        progress.cancel();
        clock.cancel();
        player.unmount();
        debug!("session: unmounted {:?}", mount);
    }

    pub fn mount_id(&self) -> MountId {
        self.mount
    }

    pub fn track_id(&self) -> u32 {
        self.player.track().id
    }

    pub fn variant(&self) -> PlayerVariant {
        self.player.variant()
    }

    /// Apply a playback action.  Returns false for actions the session
    /// does not handle.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::TogglePlay => self.player.toggle_play(),
            Action::ToggleMute => self.player.toggle_mute(),
            Action::IncreaseVolume => self.player.increase_volume(),
            Action::ToggleLoop if self.variant().has_loop_control() => self.player.toggle_loop(),
            Action::Seek(fraction) => self.player.seek(*fraction),
            Action::ToggleDebug if self.variant().has_debug_overlay() => {
                self.debug_visible = !self.debug_visible;
                if self.debug_visible {
                    self.clock_reading = Local::now();
                }
            }
            _ => return false,
        }
        self.sync_timers();
        true
    }

    /// Feed a timer tick.  `None` when the tick belongs to another mount.
    pub fn on_timer(&mut self, tick: TimerTick) -> Option<TickOutcome> {
        if tick.mount != self.mount {
            trace!("session: stale tick from {:?}", tick.mount);
            return None;
        }
        let slot = match tick.kind {
            TimerKind::Progress => &self.progress,
            TimerKind::Clock => &self.clock,
        };
        if !slot.accepts(tick.generation) {
            trace!("session: tick from retired {:?} timer", tick.kind);
            return None;
        }
        let outcome = match tick.kind {
            TimerKind::Progress => self.player.on_tick(),
            TimerKind::Clock => {
                if !self.debug_visible {
                    return None;
                }
                self.clock_reading = Local::now();
                TickOutcome::Ignored
            }
        };
        self.sync_timers();
        Some(outcome)
    }

    /// End-of-media from the audio engine.
    pub fn on_ended(&mut self) {
        self.player.on_ended();
        self.sync_timers();
    }

    #[cfg(test)]
    pub fn is_progress_timer_active(&self) -> bool {
        self.progress.is_active()
    }

    #[cfg(test)]
    pub fn is_clock_timer_active(&self) -> bool {
        self.clock.is_active()
    }

    pub fn snapshot(&self) -> NowPlaying {
        let p = &self.player;
        NowPlaying {
            track: p.track().clone(),
            variant: p.variant(),
            is_playing: p.is_playing(),
            is_muted: p.is_muted(),
            is_looping: p.is_looping(),
            volume: p.volume(),
            volume_icon: p.volume_icon(),
            progress_secs: p.progress_secs(),
            progress_ratio: p.progress_ratio(),
            debug_visible: self.debug_visible,
            clock: self.clock_reading,
        }
    }

    fn sync_timers(&mut self) {
        let mount = self.mount;
        let tx = &self.tx;
        self.progress.sync(self.player.is_playing(), |generation| {
            trace!("session: progress timer {} on {:?}", generation, mount);
            let tick = TimerTick {
                mount,
                kind: TimerKind::Progress,
                generation,
            };
            tick_timer(tx.clone(), tick, AppMessage::Timer)
        });
        self.clock.sync(self.debug_visible, |generation| {
            let tick = TimerTick {
                mount,
                kind: TimerKind::Clock,
                generation,
            };
            tick_timer(tx.clone(), tick, AppMessage::Timer)
        });
    }
}
