//! The environment a field is mounted into: surface lookup, viewport and
//! input listeners.

use crate::{
    events::{EventSender, FieldEvent},
    viewport::Viewport,
};
use std::{collections::HashMap, sync::Arc};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    window::{Window, WindowId},
};

/// What [`crate::field::ParticleField::init`] needs from its surroundings.
pub trait Host {
    /// Handle the renderer binds to.
    type Surface;

    /// Looks up a drawable surface by its element id.
    fn find_surface(&self, id: &str) -> Option<Self::Surface>;

    /// Current viewport of the page/window.
    fn viewport(&self) -> Viewport;

    /// Registers pointer-move and resize listeners that post into `events`.
    /// Listeners are never unregistered.
    fn listen(&mut self, events: EventSender);
}

/// Native host backed by winit windows, each registered under an element id.
pub struct WindowHost {
    surfaces: HashMap<String, Arc<Window>>,
    primary: Arc<Window>,
    max_pixel_ratio: f64,
    listener: Option<EventSender>,
}

impl WindowHost {
    /// `primary` supplies the viewport and is the window whose events are forwarded.
    pub fn new(primary: Arc<Window>, max_pixel_ratio: f64) -> Self {
        Self {
            surfaces: HashMap::new(),
            primary,
            max_pixel_ratio,
            listener: None,
        }
    }

    pub fn register(&mut self, id: impl Into<String>, window: Arc<Window>) -> &mut Self {
        self.surfaces.insert(id.into(), window);
        self
    }

    pub fn window_id(&self) -> WindowId {
        self.primary.id()
    }

    /// Converts a window event into a field message, if it is one the field
    /// listens for. Returns `true` when the event was forwarded.
    pub fn forward(&self, event: &WindowEvent) -> bool {
        let Some(events) = &self.listener else {
            return false;
        };

        let message = match event {
            WindowEvent::CursorMoved { position, .. } => {
                cursor_event(*position, self.primary.scale_factor())
            }
            WindowEvent::Resized(size) => {
                resize_event(*size, self.primary.scale_factor(), self.max_pixel_ratio)
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                resize_event(self.primary.inner_size(), *scale_factor, self.max_pixel_ratio)
            }
            _ => return false,
        };

        events.post(message)
    }
}

/// Cursor position in physical pixels → pointer message in logical pixels.
pub fn cursor_event(position: PhysicalPosition<f64>, scale_factor: f64) -> FieldEvent {
    let logical = position.to_logical::<f64>(scale_factor);
    FieldEvent::PointerMoved {
        client_x: logical.x,
        client_y: logical.y,
    }
}

/// Physical window size and scale factor → resize message.
pub fn resize_event(
    size: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f64,
) -> FieldEvent {
    FieldEvent::Resized(
        Viewport::from_physical(size, scale_factor).with_max_pixel_ratio(max_pixel_ratio),
    )
}

impl Host for WindowHost {
    type Surface = Arc<Window>;

    fn find_surface(&self, id: &str) -> Option<Arc<Window>> {
        self.surfaces.get(id).cloned()
    }

    fn viewport(&self) -> Viewport {
        Viewport::from_physical(self.primary.inner_size(), self.primary.scale_factor())
            .with_max_pixel_ratio(self.max_pixel_ratio)
    }

    fn listen(&mut self, events: EventSender) {
        self.listener = Some(events);
    }
}
