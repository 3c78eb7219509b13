//! Logical viewport size plus the pixel ratio the renderer is allowed to use.

use winit::dpi::PhysicalSize;

/// Current size of the drawable area.
///
/// `width`/`height` are logical (CSS-style) pixels. The renderer works at
/// `logical * applied_pixel_ratio`, where the device ratio is capped to
/// bound GPU cost on high-DPI displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio: crate::config::DEFAULT_MAX_PIXEL_RATIO,
        }
    }

    pub fn with_max_pixel_ratio(mut self, max: f64) -> Self {
        self.max_pixel_ratio = max;
        self
    }

    /// Builds a viewport from a window's physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            size.width as f64 / scale,
            size.height as f64 / scale,
            scale,
        )
    }

    /// `min(device_pixel_ratio, max_pixel_ratio)`.
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height.max(1.0)) as f32
    }

    /// Minimised windows report a zero-area size; nothing can be drawn then.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Size of the render target in physical pixels.
    pub fn render_size(&self) -> PhysicalSize<u32> {
        let ratio = self.pixel_ratio();
        PhysicalSize::new(
            ((self.width * ratio).round() as u32).max(1),
            ((self.height * ratio).round() as u32).max(1),
        )
    }
}
