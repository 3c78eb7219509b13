use crate::data::types::PointInstance;
use rand::{rngs::StdRng, Rng, SeedableRng};
use wgpu::util::DeviceExt;

/// A fixed set of points sampled uniformly from a cube centred on the origin.
///
/// The positions never change after generation; the cloud moves only as a
/// whole through the rotation applied at draw time.
#[derive(Debug, Clone)]
pub struct PointCloud {
    points: Vec<PointInstance>,
    spread: f32,
}

impl PointCloud {
    /// Samples `count` points with each coordinate `(rand() - 0.5) * spread`,
    /// i.e. in `[-spread/2, spread/2)`.
    pub fn generate<R: Rng + ?Sized>(count: usize, spread: f32, rng: &mut R) -> Self {
        let mut coord = || (rng.gen::<f32>() - 0.5) * spread;
        let points = (0..count)
            .map(|_| PointInstance {
                position: [coord(), coord(), coord()],
            })
            .collect();

        Self { points, spread }
    }

    /// Generates from a seeded RNG, or from entropy when `seed` is `None`.
    pub fn generate_seeded(count: usize, spread: f32, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate(count, spread, &mut rng)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn spread(&self) -> f32 {
        self.spread
    }

    pub fn points(&self) -> &[PointInstance] {
        &self.points
    }

    /// Uploads the points as an instance vertex buffer.
    pub fn upload(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Instances"),
            contents: bytemuck::cast_slice(&self.points),
            usage: wgpu::BufferUsages::VERTEX,
        })
    }
}
