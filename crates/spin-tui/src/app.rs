//! App: component-based event loop.
//!
//! - `App` owns all components, the mounted `PlayerSession`, and `AppState`.
//! - One `tokio::mpsc` channel carries `AppMessage`s in: terminal events from
//!   a blocking reader task, timer ticks from the session's timers, and audio
//!   notices forwarded from the engine.
//! - The loop draws when something changed, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use spin_core::catalog::Track;
use spin_core::playback::{PlayerVariant, TickOutcome};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::{Action, Route},
    app_state::AppState,
    audio::{AudioHandle, AudioNotice},
    component::Component,
    components::{
        catalog_grid::CatalogGrid,
        debug_overlay::{DebugOverlay, DEBUG_OVERLAY_WIDTH},
        full_player::FullPlayer,
        help_overlay::HelpOverlay,
        mini_player::{MiniPlayer, MINI_PLAYER_HEIGHT},
    },
    session::PlayerSession,
    theme::C_BG,
    timer::{MountId, TimerTick},
    widgets::{controls::contains, status_bar, toast::ToastManager},
};

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    Timer(TimerTick),
    Audio(AudioNotice),
}

/// Toast expiry and disc animation.
const UI_TICK: Duration = Duration::from_millis(250);

/// Areas from the last draw, for mouse routing.
#[derive(Debug, Clone, Default)]
struct PaneAreas {
    grid: Rect,
    mini: Rect,
    full: Rect,
    debug: Rect,
}

pub struct App {
    state: AppState,
    audio: AudioHandle,
    session: Option<PlayerSession>,
    next_mount: u64,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    catalog_grid: CatalogGrid,
    mini_player: MiniPlayer,
    full_player: FullPlayer,
    debug_overlay: DebugOverlay,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    pane_areas: PaneAreas,
    should_quit: bool,
}

impl App {
    pub fn new(state: AppState, audio: AudioHandle) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let route = state.route;
        let mut app = Self {
            state,
            audio,
            session: None,
            next_mount: 0,
            tx,
            rx: Some(rx),
            catalog_grid: CatalogGrid::new(),
            mini_player: MiniPlayer::new(),
            full_player: FullPlayer::new(),
            debug_overlay: DebugOverlay::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            pane_areas: PaneAreas::default(),
            should_quit: false,
        };
        app.enter_route(route);
        app
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self, notice_rx: mpsc::Receiver<AudioNotice>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, notice_rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        if let Some(session) = self.session.take() {
            session.unmount();
        }
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("spin: exiting");
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut notice_rx: mpsc::Receiver<AudioNotice>,
    ) -> anyhow::Result<()> {
        let mut rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("app already running"))?;

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            if event_tx.is_closed() {
                break;
            }
            match event::poll(UI_TICK) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(_) => break,
            }
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: audio notices (engine → AppMessage) ──────────────
        let notice_tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(notice) = notice_rx.recv().await {
                if notice_tx.send(AppMessage::Audio(notice)).await.is_err() {
                    break;
                }
            }
        });

        let mut ui_tick = tokio::time::interval(UI_TICK);
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 64;
                    let mut redraw = self.handle_message(msg);
                    for _ in 0..MAX_DRAIN {
                        match rx.try_recv() {
                            Ok(next) => redraw |= self.handle_message(next),
                            Err(_) => break,
                        }
                    }
                    needs_redraw = redraw;
                }

                _ = ui_tick.tick() => {
                    let expired = self.toast.tick();
                    self.full_player.tick(&self.state);
                    let animating = self
                        .state
                        .now_playing
                        .as_ref()
                        .is_some_and(|np| np.is_playing && matches!(self.state.route, Route::Media(_)));
                    needs_redraw = expired || animating;
                }
            }
        }
        Ok(())
    }

    /// Returns true when the screen needs a redraw.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                    true
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    let changed = !actions.is_empty();
                    for a in actions {
                        self.dispatch(a);
                    }
                    changed
                }
                Event::Resize(..) => true,
                _ => false,
            },
            AppMessage::Timer(tick) => self.on_timer(tick),
            AppMessage::Audio(notice) => {
                match notice {
                    AudioNotice::Ended(mount) => match self.session.as_mut() {
                        Some(session) if session.mount_id() == mount => session.on_ended(),
                        _ => {
                            debug!("audio: stale end-of-media from {:?}", mount);
                            return false;
                        }
                    },
                    AudioNotice::Error(msg) => {
                        warn!("audio: {}", msg);
                        self.toast.error(msg);
                    }
                }
                self.refresh_now_playing();
                true
            }
        }
    }

    fn on_timer(&mut self, tick: TimerTick) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.on_timer(tick) {
            None => false,
            Some(outcome) => {
                if outcome == TickOutcome::Ended {
                    debug!("track {} ended on progress timer", session.track_id());
                }
                self.refresh_now_playing();
                true
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys, always active
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Action::Quit];
            }
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE && !self.state.show_help => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.state.show_help {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if key.code == KeyCode::Char('K') {
            return vec![Action::ToggleKeys];
        }

        let s = &self.state;
        match s.route {
            Route::Index => {
                let actions = self.catalog_grid.handle_key(key, s);
                if !actions.is_empty() || is_grid_key(key.code) {
                    return actions;
                }
                self.mini_player.handle_key(key, s)
            }
            Route::Media(_) => {
                let actions = self.debug_overlay.handle_key(key, s);
                if !actions.is_empty() {
                    return actions;
                }
                self.full_player.handle_key(key, s)
            }
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if !matches!(event.kind, MouseEventKind::Down(_)) || self.state.show_help {
            return vec![];
        }
        let (col, row) = (event.column, event.row);
        let areas = self.pane_areas.clone();
        let s = &self.state;
        match s.route {
            Route::Index => {
                if contains(areas.mini, col, row) {
                    return self.mini_player.handle_mouse(event, areas.mini, s);
                }
                if contains(areas.grid, col, row) {
                    return self.catalog_grid.handle_mouse(event, areas.grid, s);
                }
                vec![]
            }
            Route::Media(_) => {
                if contains(areas.debug, col, row) {
                    return self.debug_overlay.handle_mouse(event, areas.debug, s);
                }
                if contains(areas.full, col, row) {
                    return self.full_player.handle_mouse(event, areas.full, s);
                }
                vec![]
            }
        }
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        if action.is_playback() || action == Action::ToggleDebug {
            if let Some(session) = self.session.as_mut() {
                if !session.apply(&action) {
                    debug!("{:?} ignored by {:?} player", action, session.variant());
                }
            }
            self.refresh_now_playing();
            return;
        }

        match action {
            Action::Select(id) => self.select(id),
            Action::OpenMedia(id) => {
                self.state.route = Route::Media(id);
                self.enter_route(Route::Media(id));
            }
            Action::Back => {
                let previous = self.session.as_ref().map(PlayerSession::track_id);
                self.state.route = Route::Index;
                self.enter_route(Route::Index);
                if let Some(id) = previous {
                    self.catalog_grid.select_id(id, &self.state);
                }
            }
            Action::ToggleHelp => self.state.show_help = !self.state.show_help,
            Action::ToggleKeys => self.state.show_keys_bar = !self.state.show_keys_bar,
            Action::CopyToClipboard(text) => self.copy_to_clipboard(text),
            Action::Quit => self.should_quit = true,
            Action::TogglePlay
            | Action::ToggleMute
            | Action::IncreaseVolume
            | Action::ToggleLoop
            | Action::Seek(_)
            | Action::ToggleDebug => {}
        }
    }

    /// Mount the mini player on `id`.  Reselecting the mounted track is a no-op.
    fn select(&mut self, id: u32) {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.track_id() == id && s.variant() == PlayerVariant::Mini)
        {
            return;
        }
        match self.state.catalog.find(id) {
            Ok(track) => {
                let track = track.clone();
                self.mount(track, PlayerVariant::Mini);
            }
            Err(e) => debug!("select: {}", e),
        }
    }

    /// Unmount whatever is playing and mount the player the route calls for.
    fn enter_route(&mut self, route: Route) {
        self.unmount();
        match route {
            Route::Index => {}
            Route::Media(id) => match self.state.catalog.find(id) {
                Ok(track) => {
                    let track = track.clone();
                    self.mount(track, PlayerVariant::Full);
                }
                // no player rendered
                Err(e) => debug!("media route: {}", e),
            },
        }
        self.refresh_now_playing();
    }

    fn mount(&mut self, track: Track, variant: PlayerVariant) {
        self.unmount();
        self.next_mount += 1;
        let mount = MountId(self.next_mount);
        info!("mounting {:?} player on track {} ({:?})", variant, track.id, mount);
        self.session = Some(PlayerSession::mount(
            mount,
            track,
            variant,
            self.audio.for_mount(mount),
            self.tx.clone(),
        ));
        self.refresh_now_playing();
    }

    fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            session.unmount();
        }
        self.state.now_playing = None;
    }

    fn refresh_now_playing(&mut self) {
        self.state.now_playing = self.session.as_ref().map(PlayerSession::snapshot);
    }

    fn copy_to_clipboard(&mut self, text: String) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
            Ok(()) => {
                // Truncate for toast display
                let display = if text.chars().count() > 40 {
                    format!("{}…", text.chars().take(40).collect::<String>())
                } else {
                    text
                };
                self.toast.success(format!("copied: {}", display));
            }
            Err(e) => {
                warn!("clipboard error: {}", e);
                self.toast.error(format!("clipboard error: {}", e));
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let status_h = if self.state.show_keys_bar { 1u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(status_h)])
            .split(area);
        let body = outer[0];

        self.pane_areas = PaneAreas::default();
        match self.state.route {
            Route::Index => self.draw_index(frame, body),
            Route::Media(_) => self.draw_media(frame, body),
        }

        if self.state.show_keys_bar {
            status_bar::draw_keys_bar(
                frame,
                outer[1],
                self.state.route,
                self.state.now_playing.is_some(),
            );
        }

        // ── Help overlay (on top of everything) ──────────────────────────────
        self.help_overlay.draw(frame, area, false, &self.state);

        // ── Toast notifications (topmost layer) ──────────────────────────────
        self.toast.draw(frame, area);
    }

    fn draw_index(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let mini_h = if self.state.now_playing.is_some() {
            MINI_PLAYER_HEIGHT + 1
        } else {
            0
        };
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(mini_h)])
            .split(area);

        self.catalog_grid
            .draw(frame, split[0], !self.state.show_help, &self.state);
        self.pane_areas.grid = split[0];

        if mini_h > 0 {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(split[1]);
            status_bar::draw_separator(frame, rows[0]);
            self.mini_player.draw(frame, rows[1], false, &self.state);
            self.pane_areas.mini = rows[1];
        }
    }

    fn draw_media(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        self.full_player.draw(frame, area, true, &self.state);
        self.pane_areas.full = area;

        if self
            .state
            .now_playing
            .as_ref()
            .is_some_and(|np| np.debug_visible)
        {
            let w = DEBUG_OVERLAY_WIDTH.min(area.width);
            let h = 11u16.min(area.height);
            let debug = Rect::new(area.x + area.width - w, area.y, w, h);
            self.debug_overlay.draw(frame, debug, false, &self.state);
            self.pane_areas.debug = debug;
        }
    }
}

/// Keys the grid owns even when they did not produce an action.
fn is_grid_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('h')
            | KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Char('l')
    )
}

#[cfg(test)]
mod tests {
    use spin_core::catalog::Catalog;

    use super::*;
    use crate::audio::AudioCommand;

    fn app(route: Route) -> (App, mpsc::Receiver<AudioCommand>) {
        let (audio, cmd_rx) = AudioHandle::channel(256);
        let state = AppState::new(Catalog::builtin(), route, true);
        (App::new(state, audio), cmd_rx)
    }

    fn key(c: char) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
    }

    fn ids() -> (u32, u32) {
        let c = Catalog::builtin();
        (c.tracks()[0].id, c.tracks()[1].id)
    }

    #[tokio::test]
    async fn test_select_then_other_track_resets_state() {
        let (mut app, _cmds) = app(Route::Index);
        let (first, second) = ids();

        app.dispatch(Action::Select(second));
        app.dispatch(Action::ToggleMute);
        app.dispatch(Action::ToggleLoop);
        app.dispatch(Action::Seek(0.5));
        let np = app.state.now_playing.clone().unwrap();
        assert!(np.is_muted && np.is_looping && np.is_playing);

        app.dispatch(Action::Select(first));
        let np = app.state.now_playing.clone().unwrap();
        assert_eq!(np.track.id, first);
        assert_eq!(np.volume.tenths(), 8);
        assert!(!np.is_muted && !np.is_looping && !np.is_playing);
        assert_eq!(np.progress_secs, 0);
    }

    #[tokio::test]
    async fn test_reselect_same_track_keeps_state() {
        let (mut app, _cmds) = app(Route::Index);
        let (first, _) = ids();
        app.dispatch(Action::Select(first));
        app.dispatch(Action::IncreaseVolume);
        let mount = app.session.as_ref().map(PlayerSession::mount_id);

        app.dispatch(Action::Select(first));
        assert_eq!(app.session.as_ref().map(PlayerSession::mount_id), mount);
        assert_eq!(app.state.now_playing.as_ref().unwrap().volume.tenths(), 9);
    }

    #[tokio::test]
    async fn test_media_route_mounts_full_player() {
        let (_, second) = ids();
        let (mut app, _cmds) = app(Route::Media(second));
        let np = app.state.now_playing.clone().unwrap();
        assert_eq!(np.variant, PlayerVariant::Full);
        assert_eq!(np.volume.tenths(), 5);

        app.handle_message(key('b'));
        assert!(app.state.now_playing.as_ref().unwrap().debug_visible);

        app.dispatch(Action::Back);
        assert_eq!(app.state.route, Route::Index);
        assert!(app.state.now_playing.is_none());
        assert_eq!(app.catalog_grid.selected(), 1);
    }

    #[tokio::test]
    async fn test_unknown_media_id_renders_no_player() {
        let (app, mut cmds) = app(Route::Media(4242));
        assert!(app.session.is_none());
        assert!(app.state.now_playing.is_none());
        assert!(cmds.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_tick_after_remount_is_ignored() {
        let (mut app, _cmds) = app(Route::Index);
        let (first, second) = ids();
        app.dispatch(Action::Select(first));
        app.dispatch(Action::TogglePlay);
        let old = app.session.as_ref().unwrap().mount_id();

        app.dispatch(Action::Select(second));
        app.dispatch(Action::TogglePlay);
        let redraw = app.handle_message(AppMessage::Timer(TimerTick {
            mount: old,
            kind: crate::timer::TimerKind::Progress,
            generation: 1,
        }));
        assert!(!redraw);
        assert_eq!(app.state.now_playing.as_ref().unwrap().progress_secs, 0);
    }

    #[tokio::test]
    async fn test_end_of_media_from_previous_mount_is_ignored() {
        let (mut app, _cmds) = app(Route::Index);
        let (first, second) = ids();
        app.dispatch(Action::Select(first));
        let old = app.session.as_ref().unwrap().mount_id();

        app.dispatch(Action::Select(second));
        app.dispatch(Action::TogglePlay);
        let redraw = app.handle_message(AppMessage::Audio(AudioNotice::Ended(old)));
        assert!(!redraw);
        assert!(app.state.now_playing.as_ref().unwrap().is_playing);

        let current = app.session.as_ref().unwrap().mount_id();
        app.handle_message(AppMessage::Audio(AudioNotice::Ended(current)));
        assert!(!app.state.now_playing.as_ref().unwrap().is_playing);
    }

    #[tokio::test]
    async fn test_player_loads_are_tagged_with_their_mount() {
        let (mut app, mut cmds) = app(Route::Index);
        let (first, _) = ids();
        app.dispatch(Action::Select(first));
        let mount = app.session.as_ref().unwrap().mount_id();
        let tagged = std::iter::from_fn(|| cmds.try_recv().ok()).find_map(|c| match c {
            AudioCommand::Load { mount, .. } => Some(mount),
            _ => None,
        });
        assert_eq!(tagged, Some(mount));
    }

    #[tokio::test]
    async fn test_keys_route_to_player_and_quit() {
        let (mut app, _cmds) = app(Route::Index);
        let (first, _) = ids();
        app.dispatch(Action::Select(first));

        app.handle_message(key(' '));
        assert!(app.state.now_playing.as_ref().unwrap().is_playing);
        app.handle_message(key('r'));
        assert!(app.state.now_playing.as_ref().unwrap().is_looping);

        // `l` moves the grid highlight, never the loop flag
        app.handle_message(key('l'));
        assert!(app.state.now_playing.as_ref().unwrap().is_looping);
        assert_eq!(app.catalog_grid.selected(), 1);

        // with help open, `q` only closes the overlay
        app.handle_message(key('?'));
        assert!(app.state.show_help);
        app.handle_message(key('q'));
        assert!(!app.state.show_help);
        assert!(!app.should_quit);
        app.handle_message(key('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_audio_error_becomes_toast() {
        let (mut app, _cmds) = app(Route::Index);
        app.handle_message(AppMessage::Audio(AudioNotice::Error(
            "playback failed: no such file".into(),
        )));
        assert!(!app.toast.is_empty());
    }
}
