use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::model::PvrEvent;

/// Fan-out of [`PvrEvent`]s to any number of subscribers.
///
/// Subscribers whose receiver has been dropped are pruned on the next
/// broadcast.
#[derive(Clone, Default)]
pub struct PvrEventBus {
    subscribers: Arc<Mutex<Vec<Sender<PvrEvent>>>>,
}

impl PvrEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<PvrEvent> {
        let (tx, rx) = unbounded::<PvrEvent>();
        {
            let mut subscribers = self.subscribers.lock().expect("Event bus mutex poisoned");
            subscribers.push(tx);
        }
        rx
    }

    pub(crate) fn broadcast(&self, event: PvrEvent) {
        let mut subscribers = self.subscribers.lock().expect("Event bus mutex poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
