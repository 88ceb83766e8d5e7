//! 4x4 transform library.
//!
//! Matrices are column-major (`m[col][row]`), matching WGSL's `mat4x4<f32>`
//! layout, so `mat4_to_f32` output can be uploaded without transposing.
//! `translate`/`rotate_*` post-multiply: `mat4_rotate_x(m, a) == m * Rx(a)`,
//! so a chain reads in the order the transforms are applied to the model.

use super::Vec3;

pub type Mat4 = [[f64; 4]; 4];

/// `mat4_inverse` was handed a matrix with a zero determinant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SingularMatrixError {
    pub determinant: f64,
}

impl std::fmt::Display for SingularMatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "matrix is singular (determinant {})", self.determinant)
    }
}

impl std::error::Error for SingularMatrixError {}

pub fn mat4_identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f64; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_translation(x: f64, y: f64, z: f64) -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [x, y, z, 1.0],
    ]
}

pub fn mat4_x_rotation(angle_rad: f64) -> Mat4 {
    let (s, c) = angle_rad.sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_y_rotation(angle_rad: f64) -> Mat4 {
    let (s, c) = angle_rad.sin_cos();
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_translate(m: &Mat4, x: f64, y: f64, z: f64) -> Mat4 {
    mat4_mul(m, &mat4_translation(x, y, z))
}

pub fn mat4_rotate_x(m: &Mat4, angle_rad: f64) -> Mat4 {
    mat4_mul(m, &mat4_x_rotation(angle_rad))
}

pub fn mat4_rotate_y(m: &Mat4, angle_rad: f64) -> Mat4 {
    mat4_mul(m, &mat4_y_rotation(angle_rad))
}

pub fn mat4_transpose(m: &Mat4) -> Mat4 {
    let mut t = [[0.0f64; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            t[col][row] = m[row][col];
        }
    }
    t
}

pub fn mat4_inverse(m: &Mat4) -> Result<Mat4, SingularMatrixError> {
    // Cofactor expansion on the flattened column-major array.
    let a: [f64; 16] = std::array::from_fn(|i| m[i / 4][i % 4]);
    let mut inv = [0.0f64; 16];

    inv[0] = a[5] * a[10] * a[15] - a[5] * a[11] * a[14] - a[9] * a[6] * a[15]
        + a[9] * a[7] * a[14]
        + a[13] * a[6] * a[11]
        - a[13] * a[7] * a[10];
    inv[4] = -a[4] * a[10] * a[15] + a[4] * a[11] * a[14] + a[8] * a[6] * a[15]
        - a[8] * a[7] * a[14]
        - a[12] * a[6] * a[11]
        + a[12] * a[7] * a[10];
    inv[8] = a[4] * a[9] * a[15] - a[4] * a[11] * a[13] - a[8] * a[5] * a[15]
        + a[8] * a[7] * a[13]
        + a[12] * a[5] * a[11]
        - a[12] * a[7] * a[9];
    inv[12] = -a[4] * a[9] * a[14] + a[4] * a[10] * a[13] + a[8] * a[5] * a[14]
        - a[8] * a[6] * a[13]
        - a[12] * a[5] * a[10]
        + a[12] * a[6] * a[9];
    inv[1] = -a[1] * a[10] * a[15] + a[1] * a[11] * a[14] + a[9] * a[2] * a[15]
        - a[9] * a[3] * a[14]
        - a[13] * a[2] * a[11]
        + a[13] * a[3] * a[10];
    inv[5] = a[0] * a[10] * a[15] - a[0] * a[11] * a[14] - a[8] * a[2] * a[15]
        + a[8] * a[3] * a[14]
        + a[12] * a[2] * a[11]
        - a[12] * a[3] * a[10];
    inv[9] = -a[0] * a[9] * a[15] + a[0] * a[11] * a[13] + a[8] * a[1] * a[15]
        - a[8] * a[3] * a[13]
        - a[12] * a[1] * a[11]
        + a[12] * a[3] * a[9];
    inv[13] = a[0] * a[9] * a[14] - a[0] * a[10] * a[13] - a[8] * a[1] * a[14]
        + a[8] * a[2] * a[13]
        + a[12] * a[1] * a[10]
        - a[12] * a[2] * a[9];
    inv[2] = a[1] * a[6] * a[15] - a[1] * a[7] * a[14] - a[5] * a[2] * a[15]
        + a[5] * a[3] * a[14]
        + a[13] * a[2] * a[7]
        - a[13] * a[3] * a[6];
    inv[6] = -a[0] * a[6] * a[15] + a[0] * a[7] * a[14] + a[4] * a[2] * a[15]
        - a[4] * a[3] * a[14]
        - a[12] * a[2] * a[7]
        + a[12] * a[3] * a[6];
    inv[10] = a[0] * a[5] * a[15] - a[0] * a[7] * a[13] - a[4] * a[1] * a[15]
        + a[4] * a[3] * a[13]
        + a[12] * a[1] * a[7]
        - a[12] * a[3] * a[5];
    inv[14] = -a[0] * a[5] * a[14] + a[0] * a[6] * a[13] + a[4] * a[1] * a[14]
        - a[4] * a[2] * a[13]
        - a[12] * a[1] * a[6]
        + a[12] * a[2] * a[5];
    inv[3] = -a[1] * a[6] * a[11] + a[1] * a[7] * a[10] + a[5] * a[2] * a[11]
        - a[5] * a[3] * a[10]
        - a[9] * a[2] * a[7]
        + a[9] * a[3] * a[6];
    inv[7] = a[0] * a[6] * a[11] - a[0] * a[7] * a[10] - a[4] * a[2] * a[11]
        + a[4] * a[3] * a[10]
        + a[8] * a[2] * a[7]
        - a[8] * a[3] * a[6];
    inv[11] = -a[0] * a[5] * a[11] + a[0] * a[7] * a[9] + a[4] * a[1] * a[11]
        - a[4] * a[3] * a[9]
        - a[8] * a[1] * a[7]
        + a[8] * a[3] * a[5];
    inv[15] = a[0] * a[5] * a[10] - a[0] * a[6] * a[9] - a[4] * a[1] * a[10]
        + a[4] * a[2] * a[9]
        + a[8] * a[1] * a[6]
        - a[8] * a[2] * a[5];

    let det = a[0] * inv[0] + a[1] * inv[4] + a[2] * inv[8] + a[3] * inv[12];
    if det == 0.0 || !det.is_finite() {
        return Err(SingularMatrixError { determinant: det });
    }

    let inv_det = 1.0 / det;
    Ok(std::array::from_fn(|col| {
        std::array::from_fn(|row| inv[col * 4 + row] * inv_det)
    }))
}

/// Right-handed perspective projection with a `[0, 1]` clip depth range.
pub fn mat4_perspective(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let range_inv = 1.0 / (near - far);

    // Column-major form of:
    // [ f/aspect, 0,  0,               0                    ]
    // [ 0,        f,  0,               0                    ]
    // [ 0,        0,  far*range_inv,   near*far*range_inv   ]
    // [ 0,        0, -1,               0                    ]
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far * range_inv, -1.0],
        [0.0, 0.0, near * far * range_inv, 0.0],
    ]
}

/// Camera (not view) matrix placing an observer at `eye` facing `target`.
///
/// The camera looks down its local -Z. Use [`mat4_view_from_camera`] to get
/// the view matrix.
pub fn mat4_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let z_axis = (eye - target).normalize();
    let x_axis = up.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis).normalize();

    [
        [x_axis.x, x_axis.y, x_axis.z, 0.0],
        [y_axis.x, y_axis.y, y_axis.z, 0.0],
        [z_axis.x, z_axis.y, z_axis.z, 0.0],
        [eye.x, eye.y, eye.z, 1.0],
    ]
}

pub fn mat4_view_from_camera(camera: &Mat4) -> Result<Mat4, SingularMatrixError> {
    mat4_inverse(camera)
}

/// Transforms `(p, 1)` and returns the homogeneous result.
pub fn mat4_transform_point(m: &Mat4, p: Vec3) -> [f64; 4] {
    std::array::from_fn(|row| m[0][row] * p.x + m[1][row] * p.y + m[2][row] * p.z + m[3][row])
}

pub fn mat4_to_f32(m: &Mat4) -> [[f32; 4]; 4] {
    std::array::from_fn(|col| std::array::from_fn(|row| m[col][row] as f32))
}
