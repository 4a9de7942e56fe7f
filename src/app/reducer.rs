//! The player state machine
//!
//! Every state change goes through [`AppState::reduce`], which returns the
//! effects (media commands, fetches, timers) the host has to carry out.

use tracing::{debug, info, warn};

use super::actions::{Action, Effect, LayoutBounds, TimerKind};
use super::state::{AppState, Toast};
use crate::gesture::{DragTarget, GestureIntent};
use crate::lyrics::LyricDocument;
use crate::player::{MediaCommand, SeekTarget};
use crate::presentation::Orientation;
use crate::queue::{EndOutcome, LoopMode};

type Effects = Vec<Effect>;

impl AppState {
    pub fn reduce(&mut self, action: Action) -> Effects {
        let mut fx = Effects::new();
        match action {
            Action::Quit => self.should_quit = true,

            Action::SetPlaylist(tracks) => {
                info!(count = tracks.len(), "playlist replaced");
                self.transport.replace(tracks);
                self.load_current(&mut fx);
            }
            Action::LoadTrack(index) => {
                if self.transport.set_current(index) {
                    self.load_current(&mut fx);
                } else {
                    debug!(index, "track index out of range");
                }
            }
            Action::Next => {
                if self.transport.next().is_some() {
                    self.load_current(&mut fx);
                }
            }
            Action::Previous => {
                if self.transport.previous().is_some() {
                    self.load_current(&mut fx);
                }
            }
            Action::Play => self.play(&mut fx),
            Action::Pause => self.pause(&mut fx),
            Action::TogglePlay => {
                if self.clock.is_playing() {
                    self.pause(&mut fx);
                } else {
                    self.play(&mut fx);
                }
            }
            Action::SetLoopMode(mode) => self.set_loop_mode(mode, &mut fx),
            Action::CycleLoopMode => {
                let mode = self.transport.loop_mode().next();
                self.set_loop_mode(mode, &mut fx);
                self.toast = Some(Toast::success(format!("Loop: {mode}")));
            }

            Action::MediaReady {
                generation,
                duration,
            } => self.on_ready(generation, duration, &mut fx),
            Action::TimeUpdate { seconds } => {
                // The bar follows the pointer while it is being dragged
                if !self.gestures.is_dragging(DragTarget::Progress)
                    && self.clock.time_update(seconds)
                {
                    self.resolve_lyrics();
                }
            }
            Action::DurationChanged { seconds } => self.clock.set_duration(Some(seconds)),
            Action::Ended => self.on_ended(&mut fx),
            Action::MediaError(error) => {
                warn!(%error, "playback failed");
                fx.push(Effect::Media(self.clock.fail()));
                self.resume_on_ready = false;
                self.cancel_timer(TimerKind::ReadyTimeout, &mut fx);
                self.cancel_timer(TimerKind::SeekSettle, &mut fx);
                self.controls.show();
                self.toast = Some(Toast::error(error));
            }
            Action::MediaWarning(message) => {
                warn!(%message, "media backend");
            }

            Action::Seek(target) => self.seek(target, &mut fx),
            Action::SeekBy(delta) => {
                let target = self.clock.current_time() + delta;
                self.seek(SeekTarget::Seconds(target), &mut fx);
            }
            Action::SetVolume(volume) => fx.push(Effect::Media(self.clock.set_volume(volume))),
            Action::VolumeBy(delta) => {
                let volume = self.clock.volume() + delta;
                fx.push(Effect::Media(self.clock.set_volume(volume)));
            }
            Action::SetMuted(muted) => fx.push(Effect::Media(self.clock.set_muted(muted))),
            Action::ToggleMute => {
                let muted = !self.clock.muted();
                fx.push(Effect::Media(self.clock.set_muted(muted)));
            }

            Action::Layout(layout) => self.set_layout(layout),
            Action::PointerDown { x, y } => {
                if let Some(intent) = self.gestures.pointer_down(x, y) {
                    self.apply_gesture(intent, &mut fx);
                }
            }
            Action::PointerMove { x, y } => {
                self.track_hover(x, y, &mut fx);
                if let Some(intent) = self.gestures.pointer_move(x, y) {
                    self.apply_gesture(intent, &mut fx);
                }
            }
            Action::PointerUp => {
                if let Some(target) = self.gestures.pointer_up() {
                    debug!(?target, "drag finished");
                }
            }
            Action::PointerEnter => self.pointer_enter(&mut fx),
            Action::PointerLeave => self.pointer_leave(&mut fx),

            Action::LyricsLoaded { request, document } => {
                if request != self.lyrics.request {
                    debug!(request, current = self.lyrics.request, "dropping stale lyrics");
                    return fx;
                }
                debug!(request, entries = document.len(), "lyrics loaded");
                self.swap_document(document);
            }
            Action::LyricsFailed { request, error } => {
                if request != self.lyrics.request {
                    debug!(request, "dropping stale lyrics failure");
                    return fx;
                }
                warn!(request, %error, "lyrics unavailable");
                self.swap_document(LyricDocument::default());
            }

            Action::TimerFired { timer, token } => self.on_timer(timer, token, &mut fx),
            Action::AnimationFrame => {
                self.rotation
                    .advance(self.clock.is_playing(), self.clock.is_loading());
            }

            Action::Resize { width, height } => {
                self.orientation = Orientation::from_size(width, height);
            }
            Action::SetFullpage(fullpage) => self.fullpage = fullpage,
            Action::Escape => {
                if self.fullpage {
                    fx.push(Effect::FullpageChange(false));
                }
            }
            Action::DismissToast => self.toast = None,
        }
        fx
    }

    /// Point the media element and the lyric fetch at the current track
    fn load_current(&mut self, fx: &mut Effects) {
        let was_playing = self.clock.is_playing();
        self.cancel_timer(TimerKind::ReadyTimeout, fx);
        self.cancel_timer(TimerKind::SeekSettle, fx);

        let Some(track) = self.transport.current_track().cloned() else {
            fx.push(Effect::Media(self.clock.unload()));
            self.resume_on_ready = false;
            self.lyrics.request += 1;
            self.swap_document(LyricDocument::default());
            return;
        };

        info!(index = ?self.transport.current_index(), url = %track.url, "loading track");
        fx.push(Effect::Media(self.clock.load(&track.url)));
        // The backend keeps its pause state across loads
        if !was_playing {
            fx.push(Effect::Media(MediaCommand::Pause));
        }
        self.resume_on_ready = was_playing;
        self.start_timer(TimerKind::ReadyTimeout, fx);

        self.lyrics.request += 1;
        self.swap_document(LyricDocument::default());
        if track.lyrics_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            self.lyrics.loading = true;
            fx.push(Effect::FetchLyrics {
                request: self.lyrics.request,
                track,
            });
        }
    }

    fn swap_document(&mut self, document: LyricDocument) {
        // Indices of the old document mean nothing in a new one, but an empty
        // document keeps the last active index as `previous`
        if !document.is_empty() {
            self.lyrics.resolver.reset();
        }
        self.lyrics.document = document;
        self.lyrics.loading = false;
        self.resolve_lyrics();
    }

    fn resolve_lyrics(&mut self) {
        self.lyrics
            .resolver
            .resolve(self.clock.current_time(), &self.lyrics.document);
    }

    fn play(&mut self, fx: &mut Effects) {
        if self.transport.is_empty() {
            return;
        }
        fx.push(Effect::Media(self.clock.play()));
    }

    fn pause(&mut self, fx: &mut Effects) {
        fx.push(Effect::Media(self.clock.pause()));
        self.resume_on_ready = false;
        self.controls.show();
        self.cancel_timer(TimerKind::AutoHide, fx);
    }

    fn set_loop_mode(&mut self, mode: LoopMode, fx: &mut Effects) {
        info!(%mode, "loop mode");
        self.transport.set_loop_mode(mode);
        fx.push(Effect::Media(
            self.clock.set_native_loop(mode == LoopMode::Single),
        ));
    }

    fn seek(&mut self, target: SeekTarget, fx: &mut Effects) {
        let Some(cmd) = self.clock.seek(target) else {
            debug!(?target, "seek ignored, duration unknown");
            return;
        };
        fx.push(Effect::Media(cmd));
        // A newer seek re-arms the timer, so only the last one clears loading
        self.start_timer(TimerKind::SeekSettle, fx);
        self.resolve_lyrics();
    }

    fn on_ready(&mut self, generation: Option<u64>, duration: Option<f64>, fx: &mut Effects) {
        if !self.clock.is_current(generation) {
            debug!(?generation, current = self.clock.generation(), "stale media ready");
            return;
        }
        if !self.clock.ready(generation, duration) {
            // e.g. mpv reloading the same file for a native loop
            self.clock.set_duration(duration);
            return;
        }
        self.cancel_timer(TimerKind::ReadyTimeout, fx);
        debug!(?duration, "media ready");
        if std::mem::take(&mut self.resume_on_ready) && self.clock.is_playing() {
            fx.push(Effect::Media(MediaCommand::Play));
        }
    }

    fn on_ended(&mut self, fx: &mut Effects) {
        match self.transport.on_track_ended() {
            EndOutcome::Stay => debug!("track ended, looping natively"),
            EndOutcome::Advanced(index) => {
                debug!(index, "track ended, advancing");
                self.load_current(fx);
            }
            EndOutcome::Restart => {
                fx.push(Effect::Media(MediaCommand::Seek { seconds: 0.0 }));
                self.clock.time_update(0.0);
                self.resolve_lyrics();
                fx.push(Effect::Media(self.clock.play()));
            }
            EndOutcome::Stop => {
                info!("end of playlist");
                fx.push(Effect::Media(self.clock.stop()));
                self.controls.show();
                self.cancel_timer(TimerKind::AutoHide, fx);
            }
        }
    }

    fn on_timer(&mut self, timer: TimerKind, token: u64, fx: &mut Effects) {
        if !self.timers.fire(timer, token) {
            debug!(?timer, token, "stale timer");
            return;
        }
        match timer {
            TimerKind::SeekSettle => self.clock.finish_seek(),
            TimerKind::AutoHide => self.controls.auto_hide(),
            TimerKind::ReadyTimeout => {
                if self.clock.awaiting_ready() {
                    warn!(source = ?self.clock.source(), "track did not become ready in time");
                    fx.push(Effect::Media(self.clock.fail()));
                    self.resume_on_ready = false;
                    self.toast = Some(Toast::error("Track failed to start"));
                }
            }
        }
    }

    fn set_layout(&mut self, layout: LayoutBounds) {
        self.gestures.set_bounds(layout.progress, layout.volume);
        self.player_bounds = layout.player;
    }

    fn track_hover(&mut self, x: f64, y: f64, fx: &mut Effects) {
        let Some(player) = self.player_bounds else {
            return;
        };
        let inside = player.contains(x, y);
        if inside && !self.controls.pointer_inside() {
            self.pointer_enter(fx);
        } else if !inside && self.controls.pointer_inside() {
            self.pointer_leave(fx);
        }
    }

    fn pointer_enter(&mut self, fx: &mut Effects) {
        if self.controls.pointer_enter() {
            self.cancel_timer(TimerKind::AutoHide, fx);
        }
    }

    fn pointer_leave(&mut self, fx: &mut Effects) {
        if self.controls.pointer_leave(self.clock.is_playing()) {
            self.start_timer(TimerKind::AutoHide, fx);
        }
    }

    fn apply_gesture(&mut self, intent: GestureIntent, fx: &mut Effects) {
        match intent {
            GestureIntent::Seek(fraction) => self.seek(SeekTarget::Fraction(fraction), fx),
            GestureIntent::Volume(level) => fx.push(Effect::Media(self.clock.set_volume(level))),
        }
    }

    fn start_timer(&mut self, timer: TimerKind, fx: &mut Effects) {
        let after = match timer {
            TimerKind::SeekSettle => self.timings.seek_settle,
            TimerKind::AutoHide => self.timings.auto_hide,
            TimerKind::ReadyTimeout => self.timings.ready_timeout,
        };
        let token = self.timers.arm(timer);
        fx.push(Effect::StartTimer {
            timer,
            token,
            after,
        });
    }

    fn cancel_timer(&mut self, timer: TimerKind, fx: &mut Effects) {
        if self.timers.disarm(timer) {
            fx.push(Effect::CancelTimer(timer));
        }
    }
}
