use std::sync::Arc;
use tokio::sync::watch;

/// Redraw-notification channel of a chart.
///
/// Requests bump a generation counter; a subscriber waking up on
/// `changed()` sees every request made since its last wake-up at once.
#[derive(Debug)]
pub struct RedrawScheduler {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawScheduler {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn request(&self) {
        self.tx.send_modify(|g| *g += 1);
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    pub fn handle(&self) -> RedrawHandle {
        RedrawHandle {
            tx: Arc::clone(&self.tx),
        }
    }
}

/// Cloneable sender side, handed to load callbacks.
#[derive(Clone, Debug)]
pub struct RedrawHandle {
    tx: Arc<watch::Sender<u64>>,
}

impl RedrawHandle {
    pub fn request(&self) {
        self.tx.send_modify(|g| *g += 1);
    }
}
