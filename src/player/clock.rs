//! Playback clock
//!
//! Mirrors what the media element is doing (position, duration, loading) and
//! turns transport intents into [`MediaCommand`]s for the backend. State
//! changes are applied optimistically; the backend reports back through
//! `ready`, `time_update` and `fail`.

/// Instruction for the media backend
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// `generation` identifies this load in the backend's ready report
    Load { url: String, generation: u64 },
    Play,
    Pause,
    Seek { seconds: f64 },
    /// Effective volume in `[0, 1]`, already zero while muted
    SetVolume { volume: f64 },
    SetLoop { enabled: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Position as a fraction of the duration
    Fraction(f64),
    Seconds(f64),
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    source: Option<String>,
    duration: Option<f64>,
    current_time: f64,
    is_playing: bool,
    loading: bool,
    awaiting_ready: bool,
    generation: u64,
    volume: f64,
    muted: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

impl PlaybackClock {
    pub fn new(volume: f64, muted: bool) -> Self {
        Self {
            source: None,
            duration: None,
            current_time: 0.0,
            is_playing: false,
            loading: false,
            awaiting_ready: false,
            generation: 0,
            volume: clamp_unit(volume),
            muted,
        }
    }

    /// Point the element at a new source
    pub fn load(&mut self, url: &str) -> MediaCommand {
        self.source = Some(url.to_string());
        self.duration = None;
        self.current_time = 0.0;
        self.loading = true;
        self.awaiting_ready = true;
        self.generation += 1;
        MediaCommand::Load {
            url: url.to_string(),
            generation: self.generation,
        }
    }

    /// Forget the source, used when the playlist becomes empty
    pub fn unload(&mut self) -> MediaCommand {
        self.source = None;
        self.duration = None;
        self.current_time = 0.0;
        self.loading = false;
        self.awaiting_ready = false;
        self.pause()
    }

    pub fn play(&mut self) -> MediaCommand {
        self.is_playing = true;
        MediaCommand::Play
    }

    pub fn pause(&mut self) -> MediaCommand {
        self.is_playing = false;
        MediaCommand::Pause
    }

    pub fn toggle(&mut self) -> MediaCommand {
        if self.is_playing { self.pause() } else { self.play() }
    }

    /// Playback reached the end with nothing to continue to. The backend is
    /// paused as well.
    pub fn stop(&mut self) -> MediaCommand {
        if let Some(duration) = self.duration {
            self.current_time = duration;
        }
        self.pause()
    }

    /// Load or playback failed. The backend is paused as well.
    pub fn fail(&mut self) -> MediaCommand {
        self.loading = false;
        self.awaiting_ready = false;
        self.pause()
    }

    /// Seek within the known duration. Returns `None` while the duration is
    /// unknown or the target is not a number.
    pub fn seek(&mut self, target: SeekTarget) -> Option<MediaCommand> {
        let duration = self.duration?;
        let seconds = match target {
            SeekTarget::Fraction(f) => f * duration,
            SeekTarget::Seconds(s) => s,
        };
        if !seconds.is_finite() {
            return None;
        }

        let seconds = seconds.clamp(0.0, duration);
        self.current_time = seconds;
        self.loading = true;
        Some(MediaCommand::Seek { seconds })
    }

    /// The post-seek settle delay elapsed
    pub fn finish_seek(&mut self) {
        if !self.awaiting_ready {
            self.loading = false;
        }
    }

    /// The element can play the source of load `generation`. Returns false
    /// when no load was pending or the report belongs to an older load. An
    /// untagged report (`None`) is taken for the current load.
    pub fn ready(&mut self, generation: Option<u64>, duration: Option<f64>) -> bool {
        if !self.awaiting_ready || !self.is_current(generation) {
            return false;
        }
        self.awaiting_ready = false;
        self.loading = false;
        self.set_duration(duration);
        true
    }

    /// Apply a position report. Ignored while a load is pending.
    pub fn time_update(&mut self, seconds: f64) -> bool {
        if self.awaiting_ready || !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        self.current_time = match self.duration {
            Some(duration) => seconds.min(duration),
            None => seconds,
        };
        true
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
            self.duration = Some(d);
        }
    }

    /// A non-zero volume unmutes
    pub fn set_volume(&mut self, volume: f64) -> MediaCommand {
        let volume = clamp_unit(volume);
        self.volume = volume;
        if self.muted && volume > 0.0 {
            self.muted = false;
        }
        self.volume_command()
    }

    pub fn set_muted(&mut self, muted: bool) -> MediaCommand {
        self.muted = muted;
        self.volume_command()
    }

    pub fn set_native_loop(&self, enabled: bool) -> MediaCommand {
        MediaCommand::SetLoop { enabled }
    }

    fn volume_command(&self) -> MediaCommand {
        MediaCommand::SetVolume {
            volume: self.effective_volume(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn awaiting_ready(&self) -> bool {
        self.awaiting_ready
    }

    /// Bumped on every `load`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a backend report tagged with `generation` is about the
    /// current load
    pub fn is_current(&self, generation: Option<u64>) -> bool {
        generation.is_none_or(|g| g == self.generation)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Rounded effective volume, 0 while muted
    pub fn volume_percent(&self) -> u8 {
        (self.effective_volume() * 100.0).round() as u8
    }

    /// Position in percent, 0 while the duration is unknown
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.current_time / d * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_clock(duration: f64) -> PlaybackClock {
        let mut c = PlaybackClock::default();
        c.load("a.mp3");
        assert!(c.ready(Some(1), Some(duration)));
        c
    }

    #[test]
    fn load_resets_position() {
        let mut c = ready_clock(100.0);
        c.time_update(42.0);
        let cmd = c.load("b.mp3");
        assert_eq!(
            cmd,
            MediaCommand::Load {
                url: "b.mp3".into(),
                generation: 2
            }
        );
        assert_eq!(c.current_time(), 0.0);
        assert_eq!(c.duration(), None);
        assert!(c.is_loading());
        assert!(c.awaiting_ready());
        assert_eq!(c.generation(), 2);
    }

    #[test]
    fn seek_clamps_into_duration() {
        let mut c = ready_clock(120.0);
        assert_eq!(
            c.seek(SeekTarget::Seconds(-10.0)),
            Some(MediaCommand::Seek { seconds: 0.0 })
        );
        assert_eq!(
            c.seek(SeekTarget::Seconds(220.0)),
            Some(MediaCommand::Seek { seconds: 120.0 })
        );
        assert_eq!(
            c.seek(SeekTarget::Fraction(0.25)),
            Some(MediaCommand::Seek { seconds: 30.0 })
        );
        assert!(c.is_loading());
        c.finish_seek();
        assert!(!c.is_loading());
    }

    #[test]
    fn seek_needs_duration() {
        let mut c = PlaybackClock::default();
        c.load("a.mp3");
        assert_eq!(c.seek(SeekTarget::Fraction(0.5)), None);
        assert_eq!(c.current_time(), 0.0);

        let mut c = ready_clock(10.0);
        assert_eq!(c.seek(SeekTarget::Fraction(f64::NAN)), None);
    }

    #[test]
    fn settle_does_not_clear_pending_load() {
        let mut c = PlaybackClock::default();
        c.load("a.mp3");
        c.finish_seek();
        assert!(c.is_loading());
    }

    #[test]
    fn time_updates_wait_for_ready() {
        let mut c = PlaybackClock::default();
        c.load("a.mp3");
        assert!(!c.time_update(3.0));
        assert_eq!(c.current_time(), 0.0);

        assert!(c.ready(None, None));
        assert!(!c.ready(None, Some(10.0)));
        assert!(c.time_update(3.0));
        assert_eq!(c.progress(), 0.0);

        c.set_duration(Some(12.0));
        assert_eq!(c.progress(), 25.0);
        assert!(!c.time_update(f64::NAN));
    }

    #[test]
    fn volume_unmutes_and_clamps() {
        let mut c = PlaybackClock::new(0.8, false);
        assert_eq!(c.set_muted(true), MediaCommand::SetVolume { volume: 0.0 });
        assert_eq!(c.volume_percent(), 0);
        assert_eq!(c.volume(), 0.8);

        assert_eq!(c.set_volume(0.5), MediaCommand::SetVolume { volume: 0.5 });
        assert!(!c.muted());
        assert_eq!(c.volume_percent(), 50);

        c.set_muted(true);
        c.set_volume(0.0);
        assert!(c.muted());

        c.set_volume(7.0);
        assert_eq!(c.volume(), 1.0);
    }

    #[test]
    fn failure_stops_playback() {
        let mut c = PlaybackClock::default();
        c.play();
        c.load("bad.mp3");
        assert_eq!(c.fail(), MediaCommand::Pause);
        assert!(!c.is_playing());
        assert!(!c.is_loading());
        assert!(!c.awaiting_ready());
    }

    #[test]
    fn toggle_flips_playing() {
        let mut c = PlaybackClock::default();
        assert_eq!(c.toggle(), MediaCommand::Play);
        assert!(c.is_playing());
        assert_eq!(c.toggle(), MediaCommand::Pause);
        assert!(!c.is_playing());
    }

    #[test]
    fn ready_from_an_older_load_is_ignored() {
        let mut c = PlaybackClock::default();
        c.load("a.mp3");
        c.load("b.mp3");
        assert!(!c.ready(Some(1), Some(30.0)));
        assert!(c.is_loading());
        assert!(c.awaiting_ready());
        assert!(!c.time_update(42.0));

        assert!(c.ready(Some(2), Some(60.0)));
        assert_eq!(c.duration(), Some(60.0));
    }

    #[test]
    fn stop_and_unload_pause_the_backend() {
        let mut c = ready_clock(10.0);
        c.play();
        assert_eq!(c.stop(), MediaCommand::Pause);
        assert!(!c.is_playing());
        assert_eq!(c.current_time(), 10.0);

        c.play();
        assert_eq!(c.unload(), MediaCommand::Pause);
        assert!(!c.is_playing());
        assert_eq!(c.source(), None);
    }
}
