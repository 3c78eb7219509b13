use glam::{Mat4, Vec3};

pub const FOV_Y_DEG: f32 = 75.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;
/// Distance from the origin along +Z.
pub const CAMERA_DEPTH: f32 = 20.0;

/// Fixed perspective camera looking at the origin.
///
/// The projection is cached; after changing `aspect` call
/// [`Camera::update_projection_matrix`] before the next draw.
#[derive(Debug, Clone)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub position: Vec3,
    pub target: Vec3,

    proj: Mat4,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_y_deg: FOV_Y_DEG,
            aspect,
            z_near: Z_NEAR,
            z_far: Z_FAR,
            position: Vec3::new(0.0, 0.0, CAMERA_DEPTH),
            target: Vec3::ZERO,
            proj: Mat4::IDENTITY, // placeholder
        };

        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the cached projection from fov, aspect and clip planes.
    pub fn update_projection_matrix(&mut self) {
        // glam's RH perspective already maps depth into wgpu's [0, 1] range.
        self.proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect,
            self.z_near,
            self.z_far,
        );
    }

    /// Sets a new aspect ratio and refreshes the projection in one step.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view()
    }
}
