//! Pointer gestures on the progress bar and volume slider
//!
//! The presentation layer reports where both controls are laid out; pointer
//! positions are turned into clamped fractions. A drag that starts on a
//! control keeps following the pointer wherever it goes until release.

/// Axis-aligned box in presentation coordinates, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Horizontal position as a fraction of the width, clamped to `[0, 1]`
    pub fn fraction_at(&self, px: f64) -> f64 {
        if self.width <= 0.0 || !px.is_finite() {
            return 0.0;
        }
        ((px - self.x) / self.width).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Progress,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureIntent {
    /// Seek to this fraction of the duration
    Seek(f64),
    /// Set the volume to this level
    Volume(f64),
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    progress: Option<Bounds>,
    volume: Option<Bounds>,
    drag: Option<DragTarget>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bounds(&mut self, progress: Option<Bounds>, volume: Option<Bounds>) {
        self.progress = progress;
        self.volume = volume;
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<GestureIntent> {
        let target = if self.progress.is_some_and(|b| b.contains(x, y)) {
            DragTarget::Progress
        } else if self.volume.is_some_and(|b| b.contains(x, y)) {
            DragTarget::Volume
        } else {
            return None;
        };
        self.drag = Some(target);
        self.intent(target, x)
    }

    /// Pointer moved anywhere; only matters during a drag
    pub fn pointer_move(&mut self, x: f64, _y: f64) -> Option<GestureIntent> {
        let target = self.drag?;
        self.intent(target, x)
    }

    /// Returns the drag that just ended, if any
    pub fn pointer_up(&mut self) -> Option<DragTarget> {
        self.drag.take()
    }

    pub fn dragging(&self) -> Option<DragTarget> {
        self.drag
    }

    pub fn is_dragging(&self, target: DragTarget) -> bool {
        self.drag == Some(target)
    }

    fn intent(&self, target: DragTarget, x: f64) -> Option<GestureIntent> {
        match target {
            DragTarget::Progress => self.progress.map(|b| GestureIntent::Seek(b.fraction_at(x))),
            DragTarget::Volume => self.volume.map(|b| GestureIntent::Volume(b.fraction_at(x))),
        }
    }
}
