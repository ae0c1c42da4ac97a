use tokio::sync::broadcast;

/// Signals fanned out to display surfaces after the History mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    /// The persisted History changed; re-read via the store snapshot.
    Changed,
}

pub type HistoryReceiver = broadcast::Receiver<HistoryEvent>;

/// Fire-and-forget fan-out of "history changed" signals.
///
/// A missing listener is not an error; the signal simply has no observer.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<HistoryEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast a change signal. Non-blocking, at-most-once per call;
    /// dropped silently when nobody is subscribed.
    pub fn notify_changed(&self) {
        let _ = self.tx.send(HistoryEvent::Changed);
    }

    pub fn subscribe(&self) -> HistoryReceiver {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}
