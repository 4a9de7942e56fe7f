pub mod actions;
pub mod events;
pub mod reducer;
pub mod state;
pub mod timers;

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::Config;
use crate::input;
use crate::lyrics::{self, LyricsClient};
use crate::player::{MediaCommand, MpvHandle};
use crate::queue::{LoopMode, Track};
use crate::storage::StorageHandle;
use crate::tui::{self, TuiTerminal};
use actions::{Action, Effect, LayoutBounds};
use events::{Event, NetworkEvent, PlayerEvent};
use state::{AppState, Toast};
use timers::TimerSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct App {
    cfg: Config,
    state: AppState,
    tracks: Vec<Track>,
    lyrics: LyricsClient,
    storage: Option<StorageHandle>,
    mpv: Option<MpvHandle>,
    timers: TimerSet,
    lyrics_task: Option<JoinHandle<()>>,
    frame_task: Option<JoinHandle<()>>,
    layout: LayoutBounds,
}

impl App {
    pub fn new(cfg: Config, tracks: Vec<Track>, loop_mode: Option<LoopMode>) -> anyhow::Result<Self> {
        let lyrics = LyricsClient::new(&cfg.lyrics)?;
        let storage = cfg.lyrics.persist.then(|| {
            let handle = StorageHandle::new(cfg.paths.cache_db());
            // Create the schema up front so a broken cache shows in the log once
            if let Err(e) = crate::storage::Storage::open(handle.path()) {
                warn!(error = %format!("{e:#}"), "lyrics cache disabled");
                return None;
            }
            Some(handle)
        });

        let mut state = AppState::from_config(&cfg);
        if let Some(mode) = loop_mode {
            state.reduce(Action::SetLoopMode(mode));
        }

        Ok(Self {
            cfg,
            state,
            tracks,
            lyrics,
            storage: storage.flatten(),
            mpv: None,
            timers: TimerSet::new(),
            lyrics_task: None,
            frame_task: None,
            layout: LayoutBounds::default(),
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.ui.mouse);

        // Best-effort: the UI still runs without an audio backend
        match MpvHandle::spawn(
            tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&self.cfg.paths.mpv_log()),
        )
        .await
        {
            Ok(h) => self.mpv = Some(h),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "mpv unavailable");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
            }
        }

        self.frame_task = Some(spawn_frame_ticker(tx.clone(), self.cfg.ui.frame_rate));

        if let Ok((w, h)) = crossterm::terminal::size() {
            self.dispatch(input::resize_action(w, h), &tx).await;
        }

        // Push the configured audio settings into the backend
        let volume = self.state.clock().volume();
        let muted = self.state.clock().muted();
        let mode = self.state.transport().loop_mode();
        self.dispatch(Action::SetVolume(volume), &tx).await;
        self.dispatch(Action::SetMuted(muted), &tx).await;
        self.dispatch(Action::SetLoopMode(mode), &tx).await;

        let tracks = std::mem::take(&mut self.tracks);
        info!(tracks = tracks.len(), "starting playback session");
        self.dispatch(Action::SetPlaylist(tracks), &tx).await;
        if self.cfg.player.autoplay {
            self.dispatch(Action::Play, &tx).await;
        }

        self.redraw(terminal, &tx).await?;

        while let Some(ev) = rx.recv().await {
            let redraw = !matches!(ev, Event::Frame) || self.state.clock().is_playing();
            if let Some(action) = self.event_to_action(ev) {
                self.dispatch(action, &tx).await;
            }

            if self.state.should_quit {
                break;
            }

            if self.state.toast.as_ref().is_some_and(Toast::is_expired) {
                self.dispatch(Action::DismissToast, &tx).await;
            }

            if redraw {
                self.redraw(terminal, &tx).await?;
            }
        }

        self.shutdown();
        Ok(())
    }

    fn event_to_action(&self, ev: Event) -> Option<Action> {
        match ev {
            Event::Input(input_ev) => input::map_input_to_action(&self.state, input_ev),
            Event::Player(pe) => Some(player_action(pe)),
            Event::Network(NetworkEvent::LyricsLoaded { request, document }) => {
                Some(Action::LyricsLoaded { request, document })
            }
            Event::Network(NetworkEvent::LyricsFailed { request, error }) => {
                Some(Action::LyricsFailed { request, error })
            }
            Event::Timer { timer, token } => Some(Action::TimerFired { timer, token }),
            Event::Frame => Some(Action::AnimationFrame),
        }
    }

    async fn redraw(&mut self, terminal: &mut TuiTerminal, tx: &mpsc::Sender<Event>) -> anyhow::Result<()> {
        let layout = tui::draw(terminal, &self.state)?;
        if layout != self.layout {
            self.layout = layout;
            self.dispatch(Action::Layout(layout), tx).await;
        }
        Ok(())
    }

    /// Reduce an action and run its effects until nothing is left
    async fn dispatch(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            for effect in self.state.reduce(action) {
                if let Some(next) = self.execute(effect, tx).await {
                    pending.push_back(next);
                }
            }
        }
    }

    async fn execute(&mut self, effect: Effect, tx: &mpsc::Sender<Event>) -> Option<Action> {
        match effect {
            Effect::Media(cmd) => {
                let Some(mpv) = &self.mpv else {
                    return matches!(cmd, MediaCommand::Load { .. } | MediaCommand::Play)
                        .then(|| Action::MediaError("audio backend unavailable".into()));
                };
                match mpv.execute(&cmd).await {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(?cmd, error = %format!("{e:#}"), "media command failed");
                        Some(Action::MediaError(format!("{e:#}")))
                    }
                }
            }
            Effect::FetchLyrics { request, track } => {
                self.spawn_lyrics_fetch(request, track, tx);
                None
            }
            Effect::StartTimer { timer, token, after } => {
                self.timers.start(timer, token, after, tx.clone());
                None
            }
            Effect::CancelTimer(timer) => {
                self.timers.cancel(timer);
                None
            }
            Effect::FullpageChange(value) => Some(Action::SetFullpage(value)),
        }
    }

    fn spawn_lyrics_fetch(&mut self, request: u64, track: Track, tx: &mpsc::Sender<Event>) {
        // Only the newest request matters
        if let Some(task) = self.lyrics_task.take() {
            task.abort();
        }

        let client = self.lyrics.clone();
        let storage = self.storage.clone();
        let tx = tx.clone();
        debug!(request, url = %track.url, "fetching lyrics");

        self.lyrics_task = Some(tokio::spawn(async move {
            let event = match lyrics::load_document(&client, storage, &track).await {
                Ok(document) => NetworkEvent::LyricsLoaded { request, document },
                Err(e) => {
                    warn!(request, error = %format!("{e:#}"), "lyrics fetch failed");
                    NetworkEvent::LyricsFailed {
                        request,
                        error: format!("{e:#}"),
                    }
                }
            };
            let _ = tx.send(Event::Network(event)).await;
        }));
    }

    fn shutdown(&mut self) {
        self.timers.cancel_all();
        if let Some(task) = self.lyrics_task.take() {
            task.abort();
        }
        if let Some(task) = self.frame_task.take() {
            task.abort();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn player_action(pe: PlayerEvent) -> Action {
    match pe {
        PlayerEvent::Ready { generation } => Action::MediaReady {
            generation,
            duration: None,
        },
        PlayerEvent::Position { seconds } => Action::TimeUpdate { seconds },
        PlayerEvent::Duration { seconds } => Action::DurationChanged { seconds },
        PlayerEvent::Ended => Action::Ended,
        PlayerEvent::Error(e) => Action::MediaError(e),
        PlayerEvent::Warning(w) => Action::MediaWarning(w),
    }
}

fn spawn_frame_ticker(tx: mpsc::Sender<Event>, frame_rate: u32) -> JoinHandle<()> {
    let period = Duration::from_secs_f64(1.0 / f64::from(frame_rate.clamp(1, 120)));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            // Drop frames while the loop is busy
            match tx.try_send(Event::Frame) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_events_map_to_actions() {
        assert!(matches!(
            player_action(PlayerEvent::Ready { generation: Some(3) }),
            Action::MediaReady {
                generation: Some(3),
                duration: None
            }
        ));
        assert!(matches!(
            player_action(PlayerEvent::Position { seconds: 2.5 }),
            Action::TimeUpdate { seconds } if seconds == 2.5
        ));
        assert!(matches!(player_action(PlayerEvent::Ended), Action::Ended));
        assert!(matches!(
            player_action(PlayerEvent::Warning("x".into())),
            Action::MediaWarning(_)
        ));
    }

    #[tokio::test]
    async fn frame_ticker_stops_when_receiver_closes() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = spawn_frame_ticker(tx, 120);
        assert!(matches!(rx.recv().await, Some(Event::Frame)));
        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("ticker exits")
            .expect("ticker did not panic");
    }
}
