//! Host input delivered to the field as messages.
//!
//! Pointer and resize events only write state; the frame loop drains whatever
//! has arrived before each tick. Posting is non-blocking, so input frequency
//! never gates render frequency.

use crate::viewport::Viewport;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Normalized cursor offset from the viewport center, nominally in [-0.5, 0.5).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// `(client_x / width - 0.5, client_y / height - 0.5)` in logical pixels.
    pub fn from_client(client_x: f64, client_y: f64, viewport: &Viewport) -> Self {
        Self {
            x: (client_x / viewport.width.max(1.0) - 0.5) as f32,
            y: (client_y / viewport.height.max(1.0) - 0.5) as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    /// Cursor position in logical client pixels.
    PointerMoved { client_x: f64, client_y: f64 },
    Resized(Viewport),
}

/// Producer half handed to the host's listeners.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<FieldEvent>,
}

impl EventSender {
    /// Posts an event without blocking.
    ///
    /// Returns `false` once the field has been dropped; the host keeps its
    /// listeners anyway, so late events are simply discarded.
    pub fn post(&self, event: FieldEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn pointer_moved(&self, client_x: f64, client_y: f64) -> bool {
        self.post(FieldEvent::PointerMoved { client_x, client_y })
    }

    pub fn resized(&self, viewport: Viewport) -> bool {
        self.post(FieldEvent::Resized(viewport))
    }
}

/// Consumer half owned by the field.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<FieldEvent>,
}

impl EventReceiver {
    /// Takes every event queued so far without waiting for more.
    pub fn drain(&self) -> impl Iterator<Item = FieldEvent> + '_ {
        std::iter::from_fn(move || match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        })
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Unbounded so a burst of pointer moves can never stall the host.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (EventSender { tx }, EventReceiver { rx })
}
