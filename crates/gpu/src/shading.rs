//! Interfaces of the two programs and the values fed to them.
//!
//! Shader source lives with each backend; what is fixed here is the set of
//! attribute and uniform names every backend must honour, and the uniform
//! values the frame driver produces.

use foundation::math::{mat4_to_f32, Vec3};
use formats::LightingConfig;
use scene::GlobeTransforms;

use crate::mesh::VertexAttribute;
use crate::renderer::Primitive;

/// Opaque blue, shown until the map image arrives.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 255, 255];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgramInterface {
    pub name: &'static str,
    pub attributes: &'static [VertexAttribute],
    pub uniforms: &'static [&'static str],
    pub samples_texture: bool,
    pub primitive: Primitive,
}

/// Lit, textured sphere.
pub const GLOBE_PROGRAM: ProgramInterface = ProgramInterface {
    name: "globe",
    attributes: &[
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Texcoord,
    ],
    uniforms: &[
        "u_world",
        "u_worldViewProjection",
        "u_worldInverseTranspose",
        "u_lightWorldPosition",
        "u_viewWorldPosition",
        "u_texture",
        "u_shininess",
        "u_lightColor",
        "u_specularColor",
        "u_ambience",
        "u_diffuse",
        "u_specular",
        "u_brightness",
    ],
    samples_texture: true,
    primitive: Primitive::Triangles,
};

/// Unlit flat-color lines.
pub const MARKER_PROGRAM: ProgramInterface = ProgramInterface {
    name: "marker",
    attributes: &[VertexAttribute::Position],
    uniforms: &["u_matrix", "u_color"],
    samples_texture: false,
    primitive: Primitive::Lines,
};

/// Single point light plus the mix weights of the globe program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightingParams {
    pub light_position: Vec3,
    pub light_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub brightness: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self::from(&LightingConfig::default())
    }
}

impl From<&LightingConfig> for LightingParams {
    fn from(c: &LightingConfig) -> Self {
        Self {
            light_position: Vec3::from(c.light_position),
            light_color: c.light_color,
            specular_color: c.specular_color,
            shininess: c.shininess,
            ambient: c.ambient,
            diffuse: c.diffuse,
            specular: c.specular,
            brightness: c.brightness,
        }
    }
}

/// Everything the globe program reads for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeUniforms {
    pub world: [[f32; 4]; 4],
    pub world_view_projection: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
    pub light_world_position: [f32; 3],
    pub view_world_position: [f32; 3],
    pub light_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub brightness: f32,
}

impl GlobeUniforms {
    pub fn new(t: &GlobeTransforms, lighting: &LightingParams) -> Self {
        Self {
            world: mat4_to_f32(&t.world),
            world_view_projection: mat4_to_f32(&t.world_view_projection),
            world_inverse_transpose: mat4_to_f32(&t.world_inverse_transpose),
            light_world_position: lighting.light_position.to_f32(),
            view_world_position: t.view_world_position.to_f32(),
            light_color: lighting.light_color,
            specular_color: lighting.specular_color,
            shininess: lighting.shininess,
            ambient: lighting.ambient,
            diffuse: lighting.diffuse,
            specular: lighting.specular,
            brightness: lighting.brightness,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerUniforms {
    pub matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Reference evaluation of the globe program's fragment stage.
///
/// `normal` and `surface` are in world space. Ambient, diffuse and
/// specular terms are each scaled by their weight and by brightness, and all
/// three are tinted by the texel. The specular term uses the Blinn
/// half-vector.
pub fn shade_globe(
    base: [f32; 3],
    normal: Vec3,
    surface: Vec3,
    eye: Vec3,
    lighting: &LightingParams,
) -> [f32; 4] {
    let n = normal.normalize();
    let to_light = (lighting.light_position - surface).normalize();
    let to_eye = (eye - surface).normalize();
    let half = (to_light + to_eye).normalize();

    let lambert = n.dot(to_light).max(0.0) as f32;
    let spec = if lambert > 0.0 {
        (n.dot(half).max(0.0) as f32).powf(lighting.shininess)
    } else {
        0.0
    };

    let mut out = [0.0f32, 0.0, 0.0, 1.0];
    for i in 0..3 {
        let ambient = lighting.ambient * base[i];
        let diffuse = lighting.diffuse * lambert * base[i] * lighting.light_color[i];
        let specular = lighting.specular * spec * base[i] * lighting.specular_color[i];
        out[i] = lighting.brightness * (ambient + diffuse + specular);
    }
    out
}
