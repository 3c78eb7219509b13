//! The GPU renderer. Owns the graphics context, the particle pipeline and
//! the uploaded point cloud.

pub mod context;
pub mod pipelines;

use self::{context::GfxContext, pipelines::particles::ParticlePipeline};
use crate::{
    data::{FieldUniformStd140, PointCloud},
    error::RenderError,
    field::{Frame, FrameRenderer},
    viewport::Viewport,
};
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub particles: ParticlePipeline,
    instances: wgpu::Buffer,
    instance_count: u32,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        viewport: &Viewport,
        cloud: &PointCloud,
    ) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window, viewport.render_size()).await?;
        let particles = ParticlePipeline::new(&gfx.device, gfx.config.format);
        let instances = cloud.upload(&gfx.device);

        Ok(Self {
            gfx,
            particles,
            instances,
            instance_count: cloud.len() as u32,
        })
    }

    fn render(&mut self, swap_view: &wgpu::TextureView) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Fully transparent so the page behind shows through.
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.particles
                .draw(&mut pass, &self.instances, self.instance_count);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl FrameRenderer for Renderer {
    fn resize(&mut self, viewport: &Viewport) {
        self.gfx.resize(viewport.render_size());
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let output = self.gfx.surface.get_current_texture()?;
        let swap_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let size = self.gfx.size;
        let uniform = frame_uniform(frame, [size.width as f32, size.height as f32]);
        self.particles.write_uniform(&self.gfx.queue, &uniform);

        self.render(&swap_view);
        output.present();
        Ok(())
    }
}

/// Builds the per-frame uniform for a render target of `target_size` physical pixels.
pub fn frame_uniform(frame: &Frame<'_>, target_size: [f32; 2]) -> FieldUniformStd140 {
    FieldUniformStd140 {
        model: frame.rotation.matrix().to_cols_array_2d(),
        view: frame.camera.view().to_cols_array_2d(),
        proj: frame.camera.proj().to_cols_array_2d(),
        color: frame.material.linear_rgba(),
        viewport_size: target_size,
        point_size: frame.material.size * frame.viewport.pixel_ratio() as f32,
        size_scale: frame.viewport.height as f32 * 0.5,
    }
}
