// input/queue.rs - Intent queue between host event handlers and the tick
use tokio::sync::mpsc;

use super::InputEvent;
use crate::error_handling::{EngineError, Result};

/// Cloneable handle hosts use to push input from any thread
#[derive(Clone)]
pub struct IntentSender {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl IntentSender {
    pub fn send(&self, event: InputEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| EngineError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving side, drained once per tick
pub struct IntentQueue {
    tx: mpsc::UnboundedSender<InputEvent>,
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> IntentSender {
        IntentSender { tx: self.tx.clone() }
    }

    /// Everything queued so far, in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Refuse further input. Events already queued are discarded.
    pub fn close(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new()
    }
}
