#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use foundation::{LayoutHandle, MeshHandle, ProgramHandle, TextureHandle};
    use gpu::{
        BackendError, DrawCall, GlobeUniforms, GraphicsBackend, MarkerUniforms, MeshData,
        Primitive, ProgramInterface, RenderFrame, UniformValues, VertexAttribute,
    };
    use scene::Viewport;

    const GLOBE_SHADER: &str = r#"
struct Globals {
    world: mat4x4<f32>,
    world_view_projection: mat4x4<f32>,
    world_inverse_transpose: mat4x4<f32>,
    light_world_position: vec3<f32>,
    shininess: f32,
    view_world_position: vec3<f32>,
    ambience: f32,
    light_color: vec3<f32>,
    diffuse: f32,
    specular_color: vec3<f32>,
    specular: f32,
    brightness: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> u: Globals;

@group(1) @binding(0)
var t_map: texture_2d<f32>;
@group(1) @binding(1)
var s_map: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) texcoord: vec2<f32>,
    @location(2) surface_to_light: vec3<f32>,
    @location(3) surface_to_view: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) a_position: vec3<f32>,
    @location(1) a_normal: vec3<f32>,
    @location(2) a_texcoord: vec2<f32>,
) -> VsOut {
    let p = vec4<f32>(a_position, 1.0);
    let surface = (u.world * p).xyz;
    var out: VsOut;
    out.pos = u.world_view_projection * p;
    out.normal = (u.world_inverse_transpose * vec4<f32>(a_normal, 0.0)).xyz;
    out.texcoord = a_texcoord;
    out.surface_to_light = u.light_world_position - surface;
    out.surface_to_view = u.view_world_position - surface;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let l = normalize(in.surface_to_light);
    let v = normalize(in.surface_to_view);
    let h = normalize(l + v);

    let lambert = max(dot(n, l), 0.0);
    var spec = 0.0;
    if (lambert > 0.0) {
        spec = pow(max(dot(n, h), 0.0), u.shininess);
    }

    let base = textureSample(t_map, s_map, in.texcoord).rgb;
    let ambient = u.ambience * base;
    let diffuse = u.diffuse * lambert * base * u.light_color;
    let specular = u.specular * spec * base * u.specular_color;
    return vec4<f32>(u.brightness * (ambient + diffuse + specular), 1.0);
}
"#;

    const MARKER_SHADER: &str = r#"
struct Marker {
    matrix: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: Marker;

@vertex
fn vs_main(@location(0) a_position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.matrix * vec4<f32>(a_position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u.color;
}
"#;

    // Dynamic uniform offsets must be multiples of this.
    const UNIFORM_ALIGNMENT: u64 = 256;

    fn uniform_stride(block_size: u64) -> u64 {
        block_size.div_ceil(UNIFORM_ALIGNMENT) * UNIFORM_ALIGNMENT
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct GlobeBlock {
        world: [[f32; 4]; 4],
        world_view_projection: [[f32; 4]; 4],
        world_inverse_transpose: [[f32; 4]; 4],
        light_world_position: [f32; 3],
        shininess: f32,
        view_world_position: [f32; 3],
        ambience: f32,
        light_color: [f32; 3],
        diffuse: f32,
        specular_color: [f32; 3],
        specular: f32,
        brightness: f32,
        _pad: [f32; 3],
    }

    impl From<&GlobeUniforms> for GlobeBlock {
        fn from(u: &GlobeUniforms) -> Self {
            Self {
                world: u.world,
                world_view_projection: u.world_view_projection,
                world_inverse_transpose: u.world_inverse_transpose,
                light_world_position: u.light_world_position,
                shininess: u.shininess,
                view_world_position: u.view_world_position,
                ambience: u.ambient,
                light_color: u.light_color,
                diffuse: u.diffuse,
                specular_color: u.specular_color,
                specular: u.specular,
                brightness: u.brightness,
                _pad: [0.0; 3],
            }
        }
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct MarkerBlock {
        matrix: [[f32; 4]; 4],
        color: [f32; 4],
    }

    impl From<&MarkerUniforms> for MarkerBlock {
        fn from(u: &MarkerUniforms) -> Self {
            Self {
                matrix: u.matrix,
                color: u.color,
            }
        }
    }

    /// Grow-only uniform buffer addressed with dynamic offsets.
    #[derive(Debug)]
    struct UniformArena {
        block_size: u64,
        stride: u64,
        capacity: u64,
        buffer: ::wgpu::Buffer,
        bind_group: ::wgpu::BindGroup,
    }

    impl UniformArena {
        fn new(
            device: &::wgpu::Device,
            layout: &::wgpu::BindGroupLayout,
            block_size: u64,
            capacity: u64,
        ) -> Self {
            let capacity = capacity.max(1);
            let stride = uniform_stride(block_size);
            let buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-uniform-arena"),
                size: capacity * stride,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-uniform-arena-bg"),
                layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::Buffer(::wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: ::wgpu::BufferSize::new(block_size),
                    }),
                }],
            });
            Self {
                block_size,
                stride,
                capacity,
                buffer,
                bind_group,
            }
        }

        fn ensure_capacity(
            &mut self,
            device: &::wgpu::Device,
            layout: &::wgpu::BindGroupLayout,
            blocks: u64,
        ) {
            if blocks > self.capacity {
                *self = Self::new(device, layout, self.block_size, blocks.next_power_of_two());
            }
        }
    }

    #[derive(Debug)]
    struct Program {
        interface: ProgramInterface,
        pipeline: ::wgpu::RenderPipeline,
        uniforms: UniformArena,
    }

    #[derive(Debug)]
    struct Mesh {
        positions: ::wgpu::Buffer,
        normals: Option<::wgpu::Buffer>,
        texcoords: Option<::wgpu::Buffer>,
        indices: Option<::wgpu::Buffer>,
    }

    impl Mesh {
        fn stream(&self, attribute: VertexAttribute) -> Option<&::wgpu::Buffer> {
            match attribute {
                VertexAttribute::Position => Some(&self.positions),
                VertexAttribute::Normal => self.normals.as_ref(),
                VertexAttribute::Texcoord => self.texcoords.as_ref(),
            }
        }
    }

    #[derive(Debug)]
    struct Texture {
        width: u32,
        height: u32,
        texture: ::wgpu::Texture,
        bind_group: ::wgpu::BindGroup,
    }

    #[derive(Debug)]
    pub struct WgpuBackend {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        canvas: web_sys::HtmlCanvasElement,
        depth_view: ::wgpu::TextureView,
        uniform_layout: ::wgpu::BindGroupLayout,
        texture_layout: ::wgpu::BindGroupLayout,
        sampler: ::wgpu::Sampler,
        programs: Vec<Program>,
        meshes: Vec<Mesh>,
        layouts: Vec<(ProgramHandle, MeshHandle)>,
        textures: Vec<Texture>,
    }

    fn device_error(e: impl std::fmt::Display) -> BackendError {
        BackendError::Device(e.to_string())
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn vertex_format(attribute: VertexAttribute) -> ::wgpu::VertexFormat {
        match attribute.components() {
            2 => ::wgpu::VertexFormat::Float32x2,
            _ => ::wgpu::VertexFormat::Float32x3,
        }
    }

    pub async fn init_wgpu_from_canvas_id(canvas_id: &str) -> Result<WgpuBackend, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas missing"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let width = (canvas.client_width().max(1)) as u32;
        let height = (canvas.client_height().max(1)) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // The surface borrows the instance for its whole life, so the
        // instance is leaked for the lifetime of the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("globe-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-uniforms-bgl"),
            entries: &[::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-texture-bgl"),
            entries: &[
                ::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Texture {
                        sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: ::wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                ::wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-map-sampler"),
            address_mode_u: ::wgpu::AddressMode::ClampToEdge,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            address_mode_w: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            mipmap_filter: ::wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(WgpuBackend {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            canvas,
            depth_view,
            uniform_layout,
            texture_layout,
            sampler,
            programs: Vec::new(),
            meshes: Vec::new(),
            layouts: Vec::new(),
            textures: Vec::new(),
        })
    }

    impl WgpuBackend {
        /// Matches the drawing buffer to the canvas's CSS size.
        fn sync_canvas_size(&mut self) {
            let width = self.canvas.client_width().max(1) as u32;
            let height = self.canvas.client_height().max(1) as u32;
            if width == self.config.width && height == self.config.height {
                return;
            }
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }

        fn build_pipeline(&self, interface: &ProgramInterface) -> Result<::wgpu::RenderPipeline, BackendError> {
            let source = match interface.name {
                "globe" => GLOBE_SHADER,
                "marker" => MARKER_SHADER,
                other => {
                    return Err(BackendError::Unsupported(format!("no shader for program {other}")));
                }
            };
            let shader = self
                .device
                .create_shader_module(::wgpu::ShaderModuleDescriptor {
                    label: Some(interface.name),
                    source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
                });

            let mut bind_group_layouts = vec![&self.uniform_layout];
            if interface.samples_texture {
                bind_group_layouts.push(&self.texture_layout);
            }
            let layout = self
                .device
                .create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                    label: Some("globe-program-layout"),
                    bind_group_layouts: &bind_group_layouts,
                    immediate_size: 0,
                });

            // One buffer per attribute, in interface order.
            let attributes: Vec<[::wgpu::VertexAttribute; 1]> = interface
                .attributes
                .iter()
                .enumerate()
                .map(|(location, a)| {
                    [::wgpu::VertexAttribute {
                        format: vertex_format(*a),
                        offset: 0,
                        shader_location: location as u32,
                    }]
                })
                .collect();
            let buffers: Vec<::wgpu::VertexBufferLayout<'_>> = interface
                .attributes
                .iter()
                .zip(&attributes)
                .map(|(a, attrs)| ::wgpu::VertexBufferLayout {
                    array_stride: (a.components() * 4) as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: attrs,
                })
                .collect();

            let (topology, cull_mode) = match interface.primitive {
                Primitive::Triangles => (::wgpu::PrimitiveTopology::TriangleList, Some(::wgpu::Face::Back)),
                Primitive::Lines => (::wgpu::PrimitiveTopology::LineList, None),
            };

            Ok(self
                .device
                .create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
                    label: Some(interface.name),
                    layout: Some(&layout),
                    vertex: ::wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &buffers,
                    },
                    fragment: Some(::wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(::wgpu::ColorTargetState {
                            format: self.config.format,
                            blend: Some(::wgpu::BlendState::REPLACE),
                            write_mask: ::wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: ::wgpu::PrimitiveState {
                        topology,
                        strip_index_format: None,
                        front_face: ::wgpu::FrontFace::Ccw,
                        cull_mode,
                        polygon_mode: ::wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(::wgpu::DepthStencilState {
                        format: ::wgpu::TextureFormat::Depth24Plus,
                        depth_write_enabled: true,
                        depth_compare: ::wgpu::CompareFunction::Less,
                        stencil: ::wgpu::StencilState::default(),
                        bias: ::wgpu::DepthBiasState::default(),
                    }),
                    multisample: ::wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                }))
        }

        fn upload_texture(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Texture, BackendError> {
            if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
                return Err(BackendError::Device(format!(
                    "texture {width}x{height} got {} bytes",
                    rgba.len()
                )));
            }
            let size = ::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            let texture = self.device.create_texture(&::wgpu::TextureDescriptor {
                label: Some("globe-map"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: ::wgpu::TextureDimension::D2,
                format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.write_texels(&texture, size, rgba);
            let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
            let bind_group = self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-map-bg"),
                layout: &self.texture_layout,
                entries: &[
                    ::wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ::wgpu::BindingResource::TextureView(&view),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 1,
                        resource: ::wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            Ok(Texture {
                width,
                height,
                texture,
                bind_group,
            })
        }

        fn write_texels(&self, texture: &::wgpu::Texture, size: ::wgpu::Extent3d, rgba: &[u8]) {
            self.queue.write_texture(
                ::wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: ::wgpu::Origin3d::ZERO,
                    aspect: ::wgpu::TextureAspect::All,
                },
                rgba,
                ::wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size.width * 4),
                    rows_per_image: None,
                },
                size,
            );
        }

        /// Packs each call's uniforms into its program's arena and returns
        /// the dynamic offset per call.
        fn stage_uniforms(&mut self, calls: &[DrawCall]) -> Result<Vec<u32>, BackendError> {
            let mut staging: Vec<Vec<u8>> = vec![Vec::new(); self.programs.len()];
            let mut offsets = Vec::with_capacity(calls.len());
            for call in calls {
                let index = call.program.index() as usize;
                let stride = self
                    .programs
                    .get(index)
                    .map(|p| p.uniforms.stride)
                    .ok_or(BackendError::UnknownHandle("program", call.program.index()))?;
                let bytes = &mut staging[index];
                let offset = bytes.len();
                match &call.uniforms {
                    UniformValues::Globe(u) => {
                        bytes.extend_from_slice(bytemuck::bytes_of(&GlobeBlock::from(u)))
                    }
                    UniformValues::Marker(u) => {
                        bytes.extend_from_slice(bytemuck::bytes_of(&MarkerBlock::from(u)))
                    }
                }
                bytes.resize(offset + stride as usize, 0);
                offsets.push(offset as u32);
            }

            for (program, bytes) in self.programs.iter_mut().zip(&staging) {
                if bytes.is_empty() {
                    continue;
                }
                let blocks = bytes.len() as u64 / program.uniforms.stride;
                program
                    .uniforms
                    .ensure_capacity(&self.device, &self.uniform_layout, blocks);
                self.queue.write_buffer(&program.uniforms.buffer, 0, bytes);
            }
            Ok(offsets)
        }
    }

    impl GraphicsBackend for WgpuBackend {
        fn create_program(
            &mut self,
            interface: &ProgramInterface,
        ) -> Result<ProgramHandle, BackendError> {
            let pipeline = self.build_pipeline(interface)?;
            let block_size = if interface.samples_texture {
                std::mem::size_of::<GlobeBlock>()
            } else {
                std::mem::size_of::<MarkerBlock>()
            } as u64;
            let uniforms = UniformArena::new(&self.device, &self.uniform_layout, block_size, 16);
            self.programs.push(Program {
                interface: *interface,
                pipeline,
                uniforms,
            });
            Ok(ProgramHandle::new(self.programs.len() as u32 - 1))
        }

        fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, BackendError> {
            if mesh.positions.is_empty() {
                return Err(BackendError::Device("mesh has no vertices".to_string()));
            }
            let upload = |label: &str, contents: &[u8], usage: ::wgpu::BufferUsages| {
                self.device
                    .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents,
                        usage,
                    })
            };
            let vertex = ::wgpu::BufferUsages::VERTEX;
            let gpu_mesh = Mesh {
                positions: upload("mesh-positions", bytemuck::cast_slice(&mesh.positions), vertex),
                normals: (!mesh.normals.is_empty())
                    .then(|| upload("mesh-normals", bytemuck::cast_slice(&mesh.normals), vertex)),
                texcoords: (!mesh.texcoords.is_empty())
                    .then(|| upload("mesh-texcoords", bytemuck::cast_slice(&mesh.texcoords), vertex)),
                indices: mesh.is_indexed().then(|| {
                    upload(
                        "mesh-indices",
                        bytemuck::cast_slice(&mesh.indices),
                        ::wgpu::BufferUsages::INDEX,
                    )
                }),
            };
            self.meshes.push(gpu_mesh);
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
                .map(|p| p.interface)
                .ok_or(BackendError::UnknownHandle("program", program.index()))?;
            let gpu_mesh = self
                .meshes
                .get(mesh.index() as usize)
                .ok_or(BackendError::UnknownHandle("mesh", mesh.index()))?;
            if let Some(missing) = interface
                .attributes
                .iter()
                .find(|a| gpu_mesh.stream(**a).is_none())
            {
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
            let texture = self.upload_texture(width, height, rgba)?;
            self.textures.push(texture);
            Ok(TextureHandle::new(self.textures.len() as u32 - 1))
        }

        fn replace_texture(
            &mut self,
            texture: TextureHandle,
            width: u32,
            height: u32,
            rgba: &[u8],
        ) -> Result<(), BackendError> {
            let index = texture.index() as usize;
            let slot = self
                .textures
                .get(index)
                .ok_or(BackendError::UnknownHandle("texture", texture.index()))?;
            if slot.width == width && slot.height == height {
                let size = ::wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                };
                self.write_texels(&slot.texture, size, rgba);
                return Ok(());
            }
            let replacement = self.upload_texture(width, height, rgba)?;
            self.textures[index] = replacement;
            Ok(())
        }

        fn viewport(&self) -> Viewport {
            Viewport::new(
                self.canvas.client_width().max(1) as f64,
                self.canvas.client_height().max(1) as f64,
            )
        }

        fn submit(&mut self, frame: &RenderFrame) -> Result<(), BackendError> {
            self.sync_canvas_size();
            let offsets = self.stage_uniforms(&frame.calls)?;

            let surface_texture = self
                .surface
                .get_current_texture()
                .map_err(|e| device_error(format!("surface acquire failed: {e}")))?;
            let view = surface_texture
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());

            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("globe-frame-encoder"),
                });

            {
                let [r, g, b, a] = frame.clear_color;
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("globe-frame-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r: r as f64,
                                g: g as f64,
                                b: b as f64,
                                a: a as f64,
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(frame.clear_depth),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                for (call, offset) in frame.calls.iter().zip(offsets) {
                    let program = self
                        .programs
                        .get(call.program.index() as usize)
                        .ok_or(BackendError::UnknownHandle("program", call.program.index()))?;
                    let mesh = self
                        .meshes
                        .get(call.mesh.index() as usize)
                        .ok_or(BackendError::UnknownHandle("mesh", call.mesh.index()))?;

                    rpass.set_pipeline(&program.pipeline);
                    rpass.set_bind_group(0, &program.uniforms.bind_group, &[offset]);
                    if program.interface.samples_texture {
                        let texture = call
                            .texture
                            .and_then(|t| self.textures.get(t.index() as usize))
                            .ok_or(BackendError::UnknownHandle("texture", 0))?;
                        rpass.set_bind_group(1, &texture.bind_group, &[]);
                    }
                    for (slot, attribute) in program.interface.attributes.iter().enumerate() {
                        let stream = mesh.stream(*attribute).ok_or(BackendError::MissingAttribute {
                            program: program.interface.name,
                            attribute: attribute.name(),
                        })?;
                        rpass.set_vertex_buffer(slot as u32, stream.slice(..));
                    }
                    match (&mesh.indices, call.indexed) {
                        (Some(indices), true) => {
                            rpass.set_index_buffer(indices.slice(..), ::wgpu::IndexFormat::Uint32);
                            rpass.draw_indexed(0..call.count, 0, 0..1);
                        }
                        _ => rpass.draw(0..call.count, 0..1),
                    }
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use foundation::{LayoutHandle, MeshHandle, ProgramHandle, TextureHandle};
    use gpu::{BackendError, GraphicsBackend, MeshData, ProgramInterface, RenderFrame};
    use scene::Viewport;
    use wasm_bindgen::prelude::JsValue;

    #[derive(Debug, Default)]
    pub struct WgpuBackend;

    pub async fn init_wgpu_from_canvas_id(_canvas_id: &str) -> Result<WgpuBackend, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    fn unsupported() -> BackendError {
        BackendError::Unsupported("wgpu rendering is only available on wasm32 targets".to_string())
    }

    impl GraphicsBackend for WgpuBackend {
        fn create_program(&mut self, _: &ProgramInterface) -> Result<ProgramHandle, BackendError> {
            Err(unsupported())
        }

        fn create_mesh(&mut self, _: &MeshData) -> Result<MeshHandle, BackendError> {
            Err(unsupported())
        }

        fn create_vertex_layout(
            &mut self,
            _: ProgramHandle,
            _: MeshHandle,
        ) -> Result<LayoutHandle, BackendError> {
            Err(unsupported())
        }

        fn create_texture(&mut self, _: u32, _: u32, _: &[u8]) -> Result<TextureHandle, BackendError> {
            Err(unsupported())
        }

        fn replace_texture(
            &mut self,
            _: TextureHandle,
            _: u32,
            _: u32,
            _: &[u8],
        ) -> Result<(), BackendError> {
            Err(unsupported())
        }

        fn viewport(&self) -> Viewport {
            Viewport::default()
        }

        fn submit(&mut self, _: &RenderFrame) -> Result<(), BackendError> {
            Err(unsupported())
        }
    }
}

pub use imp::{WgpuBackend, init_wgpu_from_canvas_id};
