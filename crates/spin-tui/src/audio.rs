//! Audio engine: the single owner of the mpv process.
//!
//! Players talk to it through `AudioHandle`, which implements
//! `spin_core::playback::AudioOutput` by queueing `AudioCommand`s.  The
//! engine task applies them to mpv in order and reports back through
//! `AudioNotice`s: `Ended` when mpv reaches the end of the media, `Error`
//! when a command or a file load fails.  `Ended` carries the `MountId` that
//! loaded the file, so a notice still queued when the next player mounts is
//! recognisably stale.
//!
//! mpv is spawned lazily on the first command.  The engine remembers the
//! desired source / pause / volume / mute / loop values so a respawned
//! process can be brought back to the same state.

use std::path::PathBuf;

use spin_core::config::AudioConfig;
use spin_core::playback::AudioOutput;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mpv::{MpvDriver, MpvEvent, MpvHandle};
use crate::timer::MountId;

/// One queued side effect for the playback primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Load { source: String, mount: MountId },
    Play,
    Pause,
    Seek(u32),
    Volume(f32),
    Mute(bool),
    Loop(bool),
    Stop,
}

/// Out-of-band reports from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioNotice {
    /// Playback of the file loaded by this mount reached its end.
    Ended(MountId),
    /// A command could not be carried out.
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("mpv not found (install mpv or set audio.mpv_binary)")]
    MpvNotFound,
    #[error("failed to start mpv: {0}")]
    Spawn(anyhow::Error),
}

// ── AudioHandle ───────────────────────────────────────────────────────────────

/// Cloneable, non-blocking command sender.
#[derive(Clone)]
pub struct AudioHandle {
    tx: mpsc::Sender<AudioCommand>,
    mount: MountId,
}

impl AudioHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AudioCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                mount: MountId(0),
            },
            rx,
        )
    }

    /// A sender whose loads are tagged with `mount`.
    pub fn for_mount(&self, mount: MountId) -> Self {
        Self {
            tx: self.tx.clone(),
            mount,
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if let Err(e) = self.tx.try_send(cmd) {
            warn!("audio: dropped command: {}", e);
        }
    }
}

impl AudioOutput for AudioHandle {
    fn load(&mut self, source: &str) {
        self.send(AudioCommand::Load {
            source: source.to_string(),
            mount: self.mount,
        });
    }

    fn play(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn set_position(&mut self, secs: u32) {
        self.send(AudioCommand::Seek(secs));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::Volume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.send(AudioCommand::Mute(muted));
    }

    fn set_looping(&mut self, looping: bool) {
        self.send(AudioCommand::Loop(looping));
    }

    fn stop(&mut self) {
        self.send(AudioCommand::Stop);
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    Unloaded,
    Loading,
    Loaded,
}

/// What the players asked for, independent of whether mpv is alive.
#[derive(Debug, Clone)]
struct Desired {
    source: Option<String>,
    mount: MountId,
    paused: bool,
    volume: f32,
    muted: bool,
    looping: bool,
}

impl Default for Desired {
    fn default() -> Self {
        Self {
            source: None,
            mount: MountId(0),
            paused: true,
            volume: 1.0,
            muted: false,
            looping: false,
        }
    }
}

pub struct AudioEngine {
    config: AudioConfig,
    driver: Option<MpvDriver>,
    handle: Option<MpvHandle>,
    mpv_event_tx: mpsc::Sender<MpvEvent>,
    mpv_event_rx: Option<mpsc::Receiver<MpvEvent>>,
    notice_tx: mpsc::Sender<AudioNotice>,
    desired: Desired,
    file: FileState,
    /// Applied once the current file has loaded.
    pending_seek: Option<u32>,
}

impl AudioEngine {
    pub fn new(config: AudioConfig, notice_tx: mpsc::Sender<AudioNotice>) -> Self {
        let (mpv_event_tx, mpv_event_rx) = mpsc::channel(256);
        Self {
            config,
            driver: None,
            handle: None,
            mpv_event_tx,
            mpv_event_rx: Some(mpv_event_rx),
            notice_tx,
            desired: Desired::default(),
            file: FileState::Unloaded,
            pending_seek: None,
        }
    }

    /// Run until every `AudioHandle` has been dropped.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<AudioCommand>) -> anyhow::Result<()> {
        info!("audio: engine starting");
        let mut mpv_rx = self
            .mpv_event_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("audio engine already running"))?;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("audio: command channel closed, shutting down");
                        break;
                    };
                    debug!("audio: command {:?}", cmd);
                    if let Err(e) = self.handle_command(cmd).await {
                        error!("audio: command failed: {}", e);
                        self.notify(AudioNotice::Error(e.to_string())).await;
                    }
                }
                Some(evt) = mpv_rx.recv() => {
                    self.handle_mpv_event(evt).await;
                }
            }
        }

        if let Some(driver) = self.driver.as_mut() {
            driver.kill().await;
        }
        Ok(())
    }

    async fn notify(&self, notice: AudioNotice) {
        if self.notice_tx.send(notice).await.is_err() {
            debug!("audio: notice receiver gone");
        }
    }

    async fn handle_command(&mut self, cmd: AudioCommand) -> anyhow::Result<()> {
        // Record intent first so a respawn can replay it.
        match &cmd {
            AudioCommand::Load { source, mount } => {
                self.desired.source = Some(source.clone());
                self.desired.mount = *mount;
                self.desired.paused = true;
                self.pending_seek = None;
            }
            AudioCommand::Play => self.desired.paused = false,
            AudioCommand::Pause => self.desired.paused = true,
            AudioCommand::Seek(secs) => self.pending_seek = Some(*secs),
            AudioCommand::Volume(v) => self.desired.volume = *v,
            AudioCommand::Mute(m) => self.desired.muted = *m,
            AudioCommand::Loop(l) => self.desired.looping = *l,
            AudioCommand::Stop => {
                self.desired.source = None;
                self.desired.paused = true;
                self.pending_seek = None;
            }
        }

        // Nothing to do for mpv until a source exists.
        if self.handle.is_none() && self.desired.source.is_none() {
            return Ok(());
        }
        let (mpv, fresh) = self.ensure_handle().await?;
        if fresh {
            // `restore` already replayed everything, this command included.
            return Ok(());
        }

        match cmd {
            AudioCommand::Load { source, .. } => {
                mpv.set_pause(true).await?;
                mpv.load(&source).await?;
                self.file = FileState::Loading;
            }
            AudioCommand::Play => {
                mpv.set_pause(false).await?;
                self.reload_if_unloaded(&mpv).await?;
            }
            AudioCommand::Pause => mpv.set_pause(true).await?,
            AudioCommand::Seek(secs) => match self.file {
                FileState::Loaded => {
                    self.pending_seek = None;
                    mpv.seek_to(secs).await?;
                }
                FileState::Loading => {}
                FileState::Unloaded => self.reload_if_unloaded(&mpv).await?,
            },
            AudioCommand::Volume(v) => mpv.set_volume(v).await?,
            AudioCommand::Mute(m) => mpv.set_mute(m).await?,
            AudioCommand::Loop(l) => mpv.set_loop(l).await?,
            AudioCommand::Stop => {
                mpv.set_pause(true).await?;
                mpv.stop().await?;
                self.file = FileState::Unloaded;
            }
        }
        Ok(())
    }

    /// After an `eof`, mpv in idle mode has dropped the file; bring it back.
    async fn reload_if_unloaded(&mut self, mpv: &MpvHandle) -> anyhow::Result<()> {
        if self.file != FileState::Unloaded {
            return Ok(());
        }
        if let Some(url) = self.desired.source.clone() {
            debug!("audio: reloading {}", url);
            mpv.load(&url).await?;
            self.file = FileState::Loading;
        }
        Ok(())
    }

    /// Returns the live handle and whether mpv was (re)spawned for it.
    async fn ensure_handle(&mut self) -> anyhow::Result<(MpvHandle, bool)> {
        let alive = self
            .driver
            .as_mut()
            .map(|d| d.process_alive())
            .unwrap_or(false);
        if let (true, Some(h)) = (alive, self.handle.as_ref()) {
            return Ok((h.clone(), false));
        }
        if self.handle.take().is_some() {
            warn!("audio: mpv died, respawning");
        }

        let binary = spin_core::platform::find_mpv_binary(
            self.config.mpv_binary.as_ref(),
            self.config.use_system_mpv,
        )
        .ok_or(AudioError::MpvNotFound)?;
        let driver = self.driver.get_or_insert_with(|| MpvDriver::new(binary));
        let handle = driver
            .spawn_and_connect(self.mpv_event_tx.clone())
            .await
            .map_err(AudioError::Spawn)?;

        self.file = FileState::Unloaded;
        self.restore(&handle).await?;
        self.handle = Some(handle.clone());
        Ok((handle, true))
    }

    /// Bring a fresh mpv process up to the desired state.
    async fn restore(&mut self, mpv: &MpvHandle) -> anyhow::Result<()> {
        let d = self.desired.clone();
        mpv.set_volume(d.volume).await?;
        mpv.set_mute(d.muted).await?;
        mpv.set_loop(d.looping).await?;
        mpv.set_pause(d.paused).await?;
        if let Some(url) = d.source {
            mpv.load(&url).await?;
            self.file = FileState::Loading;
        }
        Ok(())
    }

    async fn handle_mpv_event(&mut self, evt: MpvEvent) {
        match evt.event_name() {
            Some("file-loaded") => {
                self.file = FileState::Loaded;
                if let (Some(secs), Some(mpv)) = (self.pending_seek.take(), self.handle.clone()) {
                    if let Err(e) = mpv.seek_to(secs).await {
                        warn!("audio: deferred seek to {}s failed: {}", secs, e);
                    }
                }
            }
            Some("end-file") => match evt.end_reason() {
                // An eof while a newer load is pending belongs to the old file.
                Some("eof") if self.file == FileState::Loading => {
                    debug!("audio: eof of a replaced file ignored");
                }
                Some("eof") => {
                    info!("audio: end of media ({:?})", self.desired.mount);
                    self.file = FileState::Unloaded;
                    self.notify(AudioNotice::Ended(self.desired.mount)).await;
                }
                Some("error") => {
                    self.file = FileState::Unloaded;
                    let why = evt.file_error().unwrap_or("unknown error").to_string();
                    warn!("audio: playback failed: {}", why);
                    self.notify(AudioNotice::Error(format!("playback failed: {}", why)))
                        .await;
                }
                // `stop` / `redirect` come from our own loadfile/stop.
                _ => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_queues_commands_in_order() {
        let (handle, mut rx) = AudioHandle::channel(8);
        let mut handle = handle.for_mount(MountId(3));
        handle.load("file:///a.mp3");
        handle.set_volume(0.5);
        handle.play();
        handle.set_position(12);
        handle.stop();
        let got: Vec<AudioCommand> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            got,
            vec![
                AudioCommand::Load {
                    source: "file:///a.mp3".into(),
                    mount: MountId(3),
                },
                AudioCommand::Volume(0.5),
                AudioCommand::Play,
                AudioCommand::Seek(12),
                AudioCommand::Stop,
            ]
        );
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let (mut handle, mut rx) = AudioHandle::channel(1);
        handle.play();
        handle.pause();
        assert_eq!(rx.try_recv().ok(), Some(AudioCommand::Play));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_commands_without_source_do_not_spawn_mpv() {
        let (notice_tx, mut notice_rx) = mpsc::channel(4);
        let config = AudioConfig {
            mpv_binary: Some(PathBuf::from("/nonexistent/mpv")),
            use_system_mpv: true,
        };
        let mut engine = AudioEngine::new(config, notice_tx);
        engine.handle_command(AudioCommand::Volume(0.3)).await.unwrap();
        engine.handle_command(AudioCommand::Loop(true)).await.unwrap();
        assert!(engine.handle.is_none());
        assert_eq!(engine.desired.volume, 0.3);
        assert!(engine.desired.looping);
        assert!(notice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_eof_event_reports_ended() {
        let (notice_tx, mut notice_rx) = mpsc::channel(4);
        let mut engine = AudioEngine::new(AudioConfig::default(), notice_tx);
        engine.desired.mount = MountId(4);
        engine.file = FileState::Loaded;
        engine
            .handle_mpv_event(MpvEvent {
                raw: serde_json::json!({"event": "end-file", "reason": "eof"}),
            })
            .await;
        assert_eq!(notice_rx.recv().await, Some(AudioNotice::Ended(MountId(4))));
        assert_eq!(engine.file, FileState::Unloaded);

        engine
            .handle_mpv_event(MpvEvent {
                raw: serde_json::json!({"event": "end-file", "reason": "stop"}),
            })
            .await;
        assert!(notice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_eof_during_pending_load_is_not_reported() {
        let (notice_tx, mut notice_rx) = mpsc::channel(4);
        let mut engine = AudioEngine::new(AudioConfig::default(), notice_tx);
        engine.desired.mount = MountId(5);
        engine.file = FileState::Loading;
        engine
            .handle_mpv_event(MpvEvent {
                raw: serde_json::json!({"event": "end-file", "reason": "eof"}),
            })
            .await;
        assert!(notice_rx.try_recv().is_err());
        assert_eq!(engine.file, FileState::Loading);
    }
}
