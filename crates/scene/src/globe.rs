//! The textured sphere and the matrices its lit program needs each frame.

use foundation::math::{
    deg_to_rad, mat4_identity, mat4_inverse, mat4_mul, mat4_rotate_x, mat4_rotate_y,
    mat4_translate, mat4_transpose, Mat4, SingularMatrixError, Vec3,
};

use crate::camera::ViewProjection;

pub const GLOBE_RADIUS: f64 = 20.0;
pub const GLOBE_SEGMENTS: u32 = 48;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Globe {
    pub radius: f64,
    pub translation: Vec3,
    pub longitude_segments: u32,
    pub latitude_segments: u32,
}

impl Default for Globe {
    fn default() -> Self {
        Self {
            radius: GLOBE_RADIUS,
            translation: Vec3::ZERO,
            longitude_segments: GLOBE_SEGMENTS,
            latitude_segments: GLOBE_SEGMENTS,
        }
    }
}

/// Matrices and vectors the globe program consumes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeTransforms {
    pub world: Mat4,
    pub world_view_projection: Mat4,
    pub world_inverse_transpose: Mat4,
    pub view_world_position: Vec3,
}

impl Globe {
    /// Orients the sphere so `(latitude, longitude)` faces the camera.
    ///
    /// The extra 90° on Y compensates for where the sphere mesh puts u = 0.
    pub fn world_matrix(&self, latitude_deg: f64, longitude_deg: f64) -> Mat4 {
        let t = self.translation;
        let m = mat4_translate(&mat4_identity(), t.x, t.y, t.z);
        let m = mat4_rotate_x(&m, deg_to_rad(latitude_deg));
        mat4_rotate_y(&m, deg_to_rad(90.0 - longitude_deg))
    }

    pub fn transforms(
        &self,
        vp: &ViewProjection,
        latitude_deg: f64,
        longitude_deg: f64,
    ) -> Result<GlobeTransforms, SingularMatrixError> {
        let world = self.world_matrix(latitude_deg, longitude_deg);
        let world_inverse_transpose = mat4_transpose(&mat4_inverse(&world)?);
        Ok(GlobeTransforms {
            world,
            world_view_projection: mat4_mul(&vp.view_projection, &world),
            world_inverse_transpose,
            view_world_position: vp.eye,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Globe;
    use crate::camera::{Camera, Viewport};
    use foundation::math::{mat4_transform_point, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn zero_view_turns_sphere_a_quarter() {
        let globe = Globe::default();
        let world = globe.world_matrix(0.0, 0.0);
        // +X of the sphere ends up facing -Z after the 90° yaw.
        let p = mat4_transform_point(&world, Vec3::new(1.0, 0.0, 0.0));
        assert_close(p[0], 0.0, 1e-12);
        assert_close(p[2], -1.0, 1e-12);
        // Looking at longitude 90 undoes the yaw.
        let p = mat4_transform_point(&globe.world_matrix(0.0, 90.0), Vec3::new(1.0, 0.0, 0.0));
        assert_close(p[0], 1.0, 1e-12);
    }

    #[test]
    fn rotation_keeps_inverse_transpose_equal_to_world() {
        let globe = Globe::default();
        let vp = Camera::fixed().view_projection(Viewport::default()).unwrap();
        let t = globe.transforms(&vp, 35.0, -120.0).unwrap();
        for col in 0..4 {
            for row in 0..4 {
                assert_close(t.world_inverse_transpose[col][row], t.world[col][row], 1e-12);
            }
        }
        assert_eq!(t.view_world_position, Vec3::new(0.0, 0.0, 40.0));
    }

    #[test]
    fn surface_point_stays_in_front_of_camera() {
        let globe = Globe::default();
        let vp = Camera::fixed().view_projection(Viewport::default()).unwrap();
        let t = globe.transforms(&vp, 0.0, 90.0).unwrap();
        let clip = mat4_transform_point(&t.world_view_projection, Vec3::new(0.0, 0.0, 20.0));
        assert!(clip[3] > 0.0);
        let depth = clip[2] / clip[3];
        assert!((0.0..1.0).contains(&depth));
    }
}
