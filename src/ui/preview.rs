use crate::ff_interop::video_player::RgbaFrame;
use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

// USEFUL: https://github.com/fltk-rs/demos/tree/master/wgpu

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimpleVert {
    position: Vec3,
    tex_coords: Vec2,
}

impl SimpleVert {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SimpleVert>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

const QUAD_VERTS: &[SimpleVert] = &[
    // TL
    SimpleVert {
        position: Vec3::new(-1.0, 1.0, 0.0),
        tex_coords: Vec2::ZERO,
    },
    // BL
    SimpleVert {
        position: Vec3::new(-1.0, -1.0, 0.0),
        tex_coords: Vec2::Y,
    },
    // BR
    SimpleVert {
        position: Vec3::new(1.0, -1.0, 0.0),
        tex_coords: Vec2::ONE,
    },
    // TR
    SimpleVert {
        position: Vec3::new(1.0, 1.0, 0.0),
        tex_coords: Vec2::X,
    },
];

const QUAD_INDS: &[u16] = &[0, 1, 2, 0, 2, 3];

/// Largest `(x, y, w, h)` box with the frame's aspect ratio that fits the
/// surface, centered.
pub fn letterbox(surface: (u32, u32), frame: (u32, u32)) -> (f32, f32, f32, f32) {
    let (sw, sh) = (surface.0 as f32, surface.1 as f32);
    if frame.0 == 0 || frame.1 == 0 || sw <= 0.0 || sh <= 0.0 {
        return (0.0, 0.0, sw, sh);
    }
    let scale = (sw / frame.0 as f32).min(sh / frame.1 as f32);
    let (w, h) = (frame.0 as f32 * scale, frame.1 as f32 * scale);
    ((sw - w) / 2.0, (sh - h) / 2.0, w, h)
}

/// Draws the current video frame into the preview subwindow.
pub struct WgpuState<'a> {
    pub device: wgpu::Device,
    pub surface: wgpu::Surface<'a>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub queue: wgpu::Queue,
    pub render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    ind_count: u32,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_texture: wgpu::Texture,
    frame_size: (u32, u32),
    diffuse_bind_group: wgpu::BindGroup,
    has_frame: bool,
}

impl WgpuState<'_> {
    pub async fn new(win: fltk::window::Window) -> anyhow::Result<Self> {
        use fltk::prelude::*;

        let (width, height) = (win.pixel_w().max(1) as u32, win.pixel_h().max(1) as u32);
        // Instance, surface, adapter, device
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(win)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("failed to find an appropriate graphics adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;
        let swapchain_format = surface.get_capabilities(&adapter).formats[0];
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: swapchain_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            desired_maximum_frame_latency: 2,
            view_formats: vec![swapchain_format],
        };
        surface.configure(&device, &surface_config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let texture_bind_group_layout = Self::make_bind_group_layout(&device);

        // 1x1 black until the first frame arrives
        let frame_size = (1, 1);
        let frame_texture = Self::make_texture(&device, frame_size);
        let diffuse_bind_group =
            Self::make_bind_group(&device, &texture_bind_group_layout, &frame_texture, &sampler);

        // Pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SimpleVert::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(swapchain_format.into())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Mesh data
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(QUAD_INDS),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            device,
            surface,
            surface_config,
            queue,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            ind_count: QUAD_INDS.len() as u32,
            texture_bind_group_layout,
            sampler,
            frame_texture,
            frame_size,
            diffuse_bind_group,
            has_frame: false,
        })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        if self.valid_size() {
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    pub fn valid_size(&self) -> bool {
        self.surface_config.width > 0 && self.surface_config.height > 0
    }

    /// Replaces the displayed image. The texture is only reallocated when the
    /// frame size changes.
    pub fn upload_frame(&mut self, frame: &RgbaFrame) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        let size = (frame.width, frame.height);
        if size != self.frame_size {
            self.frame_texture = Self::make_texture(&self.device, size);
            self.diffuse_bind_group = Self::make_bind_group(
                &self.device,
                &self.texture_bind_group_layout,
                &self.frame_texture,
                &self.sampler,
            );
            self.frame_size = size;
        }
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * frame.width),
                rows_per_image: Some(frame.height),
            },
            Self::extent(size),
        );
        self.has_frame = true;
    }

    /// Back to a black surface, e.g. while a new folder loads.
    pub fn clear_frame(&mut self) {
        self.has_frame = false;
    }

    pub fn redraw(&self) {
        if !self.valid_size() {
            return;
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("failed to acquire next swap chain texture: {err}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("command_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if self.has_frame {
                let (x, y, w, h) = letterbox(
                    (self.surface_config.width, self.surface_config.height),
                    self.frame_size,
                );
                rpass.set_viewport(x, y, w.max(1.0), h.max(1.0), 0.0, 1.0);
                rpass.set_pipeline(&self.render_pipeline);
                rpass.set_bind_group(0, &self.diffuse_bind_group, &[]); // image
                rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..self.ind_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    fn extent((width, height): (u32, u32)) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    fn make_texture(device: &wgpu::Device, size: (u32, u32)) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            size: Self::extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // decoded video is sRGB
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            label: Some("frame_texture"),
            view_formats: &[],
        })
    }

    fn make_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    // This should match the filterable field of the
                    // corresponding Texture entry above.
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("texture_bind_group_layout"),
        })
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &wgpu::Texture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("diffuse_bind_group"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_wide_frame_in_tall_surface() {
        assert_eq!(letterbox((800, 800), (1600, 900)), (0.0, 175.0, 800.0, 450.0));
    }

    #[test]
    fn pillarbox_tall_frame() {
        assert_eq!(letterbox((1000, 500), (500, 500)), (250.0, 0.0, 500.0, 500.0));
    }

    #[test]
    fn degenerate_sizes_fill() {
        assert_eq!(letterbox((640, 480), (0, 0)), (0.0, 0.0, 640.0, 480.0));
    }
}
