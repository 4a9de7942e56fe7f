//! Media element: playback state and the mpv backend that realizes it

pub mod clock;
pub mod mpv;

pub use clock::{MediaCommand, PlaybackClock, SeekTarget};
pub use mpv::MpvHandle;
