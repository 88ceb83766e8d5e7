use foundation::math::{
    deg_to_rad, mat4_look_at, mat4_mul, mat4_perspective, mat4_view_from_camera, Mat4,
    SingularMatrixError, Vec3,
};

/// Canvas size in pixels, sampled every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width over height; a collapsed canvas reports 1.
    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 || !self.height.is_finite() || !self.width.is_finite() {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// The observer. It never moves: the globe rotates underneath it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn fixed() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 40.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov_y_rad: deg_to_rad(60.0),
            near: 1.0,
            far: 2000.0,
        }
    }

    pub fn projection(&self, aspect: f64) -> Mat4 {
        mat4_perspective(self.fov_y_rad, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, viewport: Viewport) -> Result<ViewProjection, SingularMatrixError> {
        let projection = self.projection(viewport.aspect());
        let camera = mat4_look_at(self.position, self.target, self.up);
        let view = mat4_view_from_camera(&camera)?;
        Ok(ViewProjection {
            projection,
            view,
            view_projection: mat4_mul(&projection, &view),
            eye: self.position,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Per-frame camera matrices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewProjection {
    pub projection: Mat4,
    pub view: Mat4,
    pub view_projection: Mat4,
    pub eye: Vec3,
}
