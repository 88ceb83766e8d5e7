use foundation::{LayoutHandle, MeshHandle, ProgramHandle, TextureHandle};
use scene::Viewport;

use crate::mesh::MeshData;
use crate::shading::{GlobeUniforms, MarkerUniforms, ProgramInterface};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

/// A program bound to a mesh, ready to be drawn with fresh uniforms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderObject {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub layout: LayoutHandle,
    pub primitive: Primitive,
    pub indexed: bool,
    pub element_count: u32,
}

impl RenderObject {
    /// Uploads `mesh`, compiles `interface` and links the two.
    pub fn create(
        backend: &mut dyn GraphicsBackend,
        interface: &ProgramInterface,
        mesh: &MeshData,
    ) -> Result<Self, BackendError> {
        let program = backend.create_program(interface)?;
        let mesh_handle = backend.create_mesh(mesh)?;
        let layout = backend.create_vertex_layout(program, mesh_handle)?;
        Ok(Self {
            program,
            mesh: mesh_handle,
            layout,
            primitive: interface.primitive,
            indexed: mesh.is_indexed(),
            element_count: mesh.element_count(),
        })
    }

    pub fn draw(&self, uniforms: UniformValues, texture: Option<TextureHandle>) -> DrawCall {
        DrawCall {
            program: self.program,
            mesh: self.mesh,
            layout: self.layout,
            primitive: self.primitive,
            indexed: self.indexed,
            count: self.element_count,
            texture,
            uniforms,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValues {
    Globe(GlobeUniforms),
    Marker(MarkerUniforms),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub layout: LayoutHandle,
    pub primitive: Primitive,
    pub indexed: bool,
    pub count: u32,
    pub texture: Option<TextureHandle>,
    pub uniforms: UniformValues,
}

/// One frame's worth of draw calls, executed in order after the clear.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub calls: Vec<DrawCall>,
}

impl RenderFrame {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            clear_depth: 1.0,
            calls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    Unsupported(String),
    MissingAttribute {
        program: &'static str,
        attribute: &'static str,
    },
    UnknownHandle(&'static str, u32),
    Device(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            BackendError::MissingAttribute { program, attribute } => {
                write!(f, "program {program} needs {attribute}, mesh has none")
            }
            BackendError::UnknownHandle(kind, index) => write!(f, "unknown {kind} handle {index}"),
            BackendError::Device(msg) => write!(f, "device error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// What the frame driver needs from a graphics API.
///
/// Resources are created once during initialization; afterwards the driver
/// only calls [`GraphicsBackend::submit`] once per frame.
pub trait GraphicsBackend {
    fn create_program(&mut self, interface: &ProgramInterface)
        -> Result<ProgramHandle, BackendError>;

    fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, BackendError>;

    /// Binds the mesh's vertex streams to the program's attributes.
    fn create_vertex_layout(
        &mut self,
        program: ProgramHandle,
        mesh: MeshHandle,
    ) -> Result<LayoutHandle, BackendError>;

    /// Creates an RGBA8 texture. Sampling clamps to edge with linear filtering.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, BackendError>;

    /// Replaces a texture's contents in place; the handle stays valid.
    fn replace_texture(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), BackendError>;

    /// Current drawable size, sampled every frame.
    fn viewport(&self) -> Viewport;

    fn submit(&mut self, frame: &RenderFrame) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Backend that keeps everything in memory, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub viewport: Viewport,
    pub programs: Vec<ProgramInterface>,
    pub meshes: Vec<MeshData>,
    pub layouts: Vec<(ProgramHandle, MeshHandle)>,
    pub textures: Vec<RecordedTexture>,
    pub frames: Vec<RenderFrame>,
    /// Keep only the most recent frame when set.
    pub keep_last_frame_only: bool,
}

impl RecordingBackend {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.frames.last()
    }

    fn texture_mut(&mut self, texture: TextureHandle) -> Result<&mut RecordedTexture, BackendError> {
        self.textures
            .get_mut(texture.index() as usize)
            .ok_or(BackendError::UnknownHandle("texture", texture.index()))
    }
}

fn check_texture_size(width: u32, height: u32, rgba: &[u8]) -> Result<(), BackendError> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || rgba.len() != expected {
        return Err(BackendError::Device(format!(
            "texture {width}x{height} needs {expected} bytes, got {}",
            rgba.len()
        )));
    }
    Ok(())
}

impl GraphicsBackend for RecordingBackend {
    fn create_program(
        &mut self,
        interface: &ProgramInterface,
    ) -> Result<ProgramHandle, BackendError> {
        self.programs.push(*interface);
        Ok(ProgramHandle::new(self.programs.len() as u32 - 1))
    }

    fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, BackendError> {
        self.meshes.push(mesh.clone());
        Ok(MeshHandle::new(self.meshes.len() as u32 - 1))
    }

    fn create_vertex_layout(
        &mut self,
        program: ProgramHandle,
        mesh: MeshHandle,
    ) -> Result<LayoutHandle, BackendError> {
        let interface = self
            .programs
            .get(program.index() as usize)
            .ok_or(BackendError::UnknownHandle("program", program.index()))?;
        let data = self
            .meshes
            .get(mesh.index() as usize)
            .ok_or(BackendError::UnknownHandle("mesh", mesh.index()))?;
        if let Some(missing) = interface.attributes.iter().find(|a| !data.provides(**a)) {
            return Err(BackendError::MissingAttribute {
                program: interface.name,
                attribute: missing.name(),
            });
        }
        self.layouts.push((program, mesh));
        Ok(LayoutHandle::new(self.layouts.len() as u32 - 1))
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, BackendError> {
        check_texture_size(width, height, rgba)?;
        self.textures.push(RecordedTexture {
            width,
            height,
            rgba: rgba.to_vec(),
        });
        Ok(TextureHandle::new(self.textures.len() as u32 - 1))
    }

    fn replace_texture(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), BackendError> {
        check_texture_size(width, height, rgba)?;
        let slot = self.texture_mut(texture)?;
        *slot = RecordedTexture {
            width,
            height,
            rgba: rgba.to_vec(),
        };
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn submit(&mut self, frame: &RenderFrame) -> Result<(), BackendError> {
        if self.keep_last_frame_only {
            self.frames.clear();
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}
