use glam::{Mat4, Vec3};

/// Fixed perspective camera looking down -Z at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    pub fn new(width: f64, height: f64) -> Self {
        let mut camera = Self {
            fov_y_deg: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 4.0),
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Track the drawing surface size. A collapsed container keeps the last
    /// usable aspect.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = (width / height) as f32;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
