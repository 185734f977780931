//! wgpu presentation: either the rust-gpu fragment shader drawn over the whole
//! surface, or a CPU-rendered frame uploaded and blitted.

use std::sync::Arc;

use shared::ShaderConstants;
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::Backend;
use crate::cpu;

const PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<ShaderConstants>() as u32;

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("failed to create a surface for the window")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no graphics adapter can present to this window")]
    NoAdapter,
    #[error("the adapter is missing required features {0:?}")]
    MissingFeatures(wgpu::Features),
    #[error("failed to open the graphics device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("the surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("this build does not include the SPIR-V shader")]
    SpirvUnavailable,
}

struct CpuFrame {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

enum Presenter {
    Shader {
        pipeline: wgpu::RenderPipeline,
    },
    Blit {
        pipeline: wgpu::RenderPipeline,
        layout: wgpu::BindGroupLayout,
        sampler: wgpu::Sampler,
        scale: f32,
        frame: Option<CpuFrame>,
    },
}

pub struct Graphics {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    presenter: Presenter,
}

impl Graphics {
    pub async fn new(
        window: Arc<Window>,
        backend: Backend,
        cpu_scale: f32,
    ) -> Result<Self, GraphicsError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(GraphicsError::NoAdapter)?;
        tracing::info!(adapter = ?adapter.get_info(), backend = backend.as_str(), "selected adapter");

        let mut required_limits =
            wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
        let required_features = match backend {
            Backend::Gpu => {
                required_limits.max_push_constant_size = PUSH_CONSTANT_SIZE;
                wgpu::Features::PUSH_CONSTANTS
            }
            Backend::Cpu => wgpu::Features::empty(),
        };
        let missing = required_features - adapter.features();
        if !missing.is_empty() {
            return Err(GraphicsError::MissingFeatures(missing));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("portal-cave device"),
                    required_features,
                    required_limits,
                },
                None,
            )
            .await?;
        // Invalid pipelines are reported, not fatal: draws just produce nothing.
        device.on_uncaptured_error(Box::new(|error| {
            tracing::error!(%error, "uncaptured wgpu error");
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(GraphicsError::NoSurfaceFormat)?;
        if !format.is_srgb() {
            tracing::warn!(?format, "surface is not sRGB, colors will be off");
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let presenter = match backend {
            Backend::Gpu => Presenter::Shader {
                pipeline: shader_pipeline(&device, format)?,
            },
            Backend::Cpu => blit_presenter(&device, format, cpu_scale),
        };
        if let Some(error) = device.pop_error_scope().await {
            tracing::error!(%error, "render pipeline failed validation");
        }

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            presenter,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self, constants: &ShaderConstants) -> Result<(), wgpu::SurfaceError> {
        if let Presenter::Blit {
            layout,
            sampler,
            scale,
            frame,
            ..
        } = &mut self.presenter
        {
            let scaled = cpu::scaled(constants, *scale);
            let stale = frame.as_ref().map_or(true, |frame| {
                (frame.width, frame.height) != (scaled.width, scaled.height)
            });
            if stale {
                *frame = Some(CpuFrame::new(
                    &self.device,
                    layout,
                    sampler,
                    scaled.width,
                    scaled.height,
                ));
            }
            if let Some(frame) = frame {
                frame.upload(&self.queue, &cpu::render(&scaled));
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("portal-cave frame"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("portal-cave pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            match &self.presenter {
                Presenter::Shader { pipeline } => {
                    rpass.set_pipeline(pipeline);
                    rpass.set_push_constants(
                        wgpu::ShaderStages::FRAGMENT,
                        0,
                        bytemuck::bytes_of(constants),
                    );
                    rpass.draw(0..3, 0..1);
                }
                Presenter::Blit {
                    pipeline,
                    frame: Some(frame),
                    ..
                } => {
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(0, &frame.bind_group, &[]);
                    rpass.draw(0..3, 0..1);
                }
                Presenter::Blit { frame: None, .. } => {}
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl CpuFrame {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        tracing::debug!(width, height, "allocating CPU frame texture");
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("portal-cave cpu frame"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Sampling decodes sRGB and the surface encodes it again, so the
            // CPU bytes reach the screen unchanged.
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("portal-cave cpu frame"),
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
        });
        Self {
            texture,
            bind_group,
            width,
            height,
        }
    }

    fn upload(&self, queue: &wgpu::Queue, image: &image::RgbaImage) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            extent(self.width, self.height),
        );
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

#[cfg(any(feature = "use-installed-tools", feature = "use-compiled-tools"))]
fn shader_module(device: &wgpu::Device) -> Result<wgpu::ShaderModule, GraphicsError> {
    Ok(device.create_shader_module(wgpu::include_spirv!(env!("portal_cave_shaders.spv"))))
}

#[cfg(not(any(feature = "use-installed-tools", feature = "use-compiled-tools")))]
fn shader_module(_device: &wgpu::Device) -> Result<wgpu::ShaderModule, GraphicsError> {
    Err(GraphicsError::SpirvUnavailable)
}

fn shader_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, GraphicsError> {
    let module = shader_module(device)?;
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("portal-cave shader"),
        bind_group_layouts: &[],
        push_constant_ranges: &[wgpu::PushConstantRange {
            stages: wgpu::ShaderStages::FRAGMENT,
            range: 0..PUSH_CONSTANT_SIZE,
        }],
    });
    Ok(full_screen_pipeline(
        device,
        "portal-cave shader",
        &layout,
        &module,
        ("main_vs", "main_fs"),
        format,
    ))
}

fn blit_presenter(device: &wgpu::Device, format: wgpu::TextureFormat, scale: f32) -> Presenter {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("portal-cave blit"),
        source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
    });
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("portal-cave blit"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("portal-cave blit"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });
    let pipeline = full_screen_pipeline(
        device,
        "portal-cave blit",
        &pipeline_layout,
        &module,
        ("vs_main", "fs_main"),
        format,
    );
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("portal-cave blit"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    Presenter::Blit {
        pipeline,
        layout,
        sampler,
        scale,
        frame: None,
    }
}

fn full_screen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    (vs_entry, fs_entry): (&str, &str),
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: vs_entry,
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: fs_entry,
            targets: &[Some(format.into())],
        }),
        multiview: None,
    })
}
