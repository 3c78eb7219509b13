//! Core data types for the particle field, focused on GPU data representation.

use crate::config::Config;

/// Per-instance data uploaded to the GPU vertex buffer.
/// Must match the instance inputs in `PARTICLE_WGSL`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct PointInstance {
    /// Position in model space, before the cloud rotation.
    pub position: [f32; 3],
}

/// Per-frame uniform buffer data, respecting std140 layout.
/// Must match the layout of `FieldUniform` in `PARTICLE_WGSL`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct FieldUniformStd140 {
    /// Cloud rotation.
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
    /// Render target size in physical pixels.
    pub viewport_size: [f32; 2],
    /// Sprite size in world units, already multiplied by the pixel ratio.
    pub point_size: f32,
    /// Half the logical viewport height; scales sprites with distance.
    pub size_scale: f32,
}

// Buffer size must match the WGSL struct size.
const _: [(); 224] = [(); core::mem::size_of::<FieldUniformStd140>()];

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::SrcAlpha,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

/// Colors sum, so overlapping sprites brighten into a glow.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: ADDITIVE,
    alpha: ADDITIVE,
};

/// Appearance shared by every point sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// sRGB hex color, `0xRRGGBB`.
    pub color: u32,
    pub opacity: f32,
    /// World-space size, attenuated with distance.
    pub size: f32,
}

impl PointMaterial {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            color: cfg.color,
            opacity: cfg.opacity,
            size: cfg.point_size,
        }
    }

    /// Linear RGB color with opacity in the alpha channel.
    pub fn linear_rgba(&self) -> [f32; 4] {
        let channel = |shift: u32| srgb_to_linear(((self.color >> shift) & 0xff) as f32 / 255.0);
        [channel(16), channel(8), channel(0), self.opacity]
    }
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
