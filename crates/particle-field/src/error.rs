//! Error types for the particle field.

use thiserror::Error;

/// Failures surfaced by [`crate::field::ParticleField`].
#[derive(Debug, Error)]
pub enum FieldError {
    /// The host has no drawable surface registered under the requested id.
    #[error("drawable surface '#{0}' not found")]
    SurfaceNotFound(String),

    /// GPU setup failed (adapter, device or surface configuration).
    #[error("GPU initialisation failed: {0}")]
    Gpu(#[from] anyhow::Error),

    /// A draw failed in a way the loop cannot recover from.
    #[error("render failed: {0}")]
    Render(RenderError),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Classification of a failed frame, mirroring the surface errors wgpu reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
}

impl RenderError {
    /// Lost and outdated surfaces are recovered by reconfiguring at the current size.
    pub fn needs_reconfigure(self) -> bool {
        matches!(self, RenderError::Lost | RenderError::Outdated)
    }

    pub fn is_fatal(self) -> bool {
        self == RenderError::OutOfMemory
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => RenderError::Lost,
            wgpu::SurfaceError::Outdated => RenderError::Outdated,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
        }
    }
}

pub type Result<T, E = FieldError> = std::result::Result<T, E>;
