use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::actions::TimerKind;
use super::events::Event;

/// Sleeping tasks behind the reducer's timers, one per kind.
///
/// Starting a kind aborts its previous task. Everything is aborted on drop.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: HashMap<TimerKind, JoinHandle<()>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, timer: TimerKind, token: u64, after: Duration, tx: mpsc::Sender<Event>) {
        self.cancel(timer);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The loop may be gone already
            let _ = tx.send(Event::Timer { timer, token }).await;
        });
        self.handles.insert(timer, handle);
    }

    pub fn cancel(&mut self, timer: TimerKind) {
        if let Some(handle) = self.handles.remove(&timer) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
