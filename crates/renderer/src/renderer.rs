//! Main renderer managing wgpu state and drawing one [`DrawList`] per frame.

use crate::{
    draw::DrawList,
    pipeline::{create_pixel_sampler, create_sprite_pipeline, create_texture_bind_group_layout},
    texture::{AssetStore, Texture},
    vertex::build_geometry,
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Lost or outdated surfaces recover with a `resize`.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    sprite_pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound for solid, glow, ring and fog batches.
    white_bind_group: wgpu::BindGroup,
    _white_texture: Texture,
    assets: AssetStore,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let texture_bind_group_layout = create_texture_bind_group_layout(&device);
        let sprite_pipeline = create_sprite_pipeline(&device, config.format, &texture_bind_group_layout);
        let sampler = create_pixel_sampler(&device);

        let white_texture = Texture::white(&device, &queue);
        let white_bind_group =
            make_bind_group(&device, &texture_bind_group_layout, &white_texture, &sampler, "White");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            sprite_pipeline,
            texture_bind_group_layout,
            sampler,
            white_bind_group,
            _white_texture: white_texture,
            assets: AssetStore::default(),
        })
    }

    /// Blocking constructor for the winit event loop.
    pub fn new_blocking(window: Arc<Window>, vsync: bool) -> Result<Self> {
        pollster::block_on(Self::new(window, vsync))
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Load every image in `dir`. Images that fail to decode are skipped.
    pub fn load_images(&mut self, dir: &Path) -> usize {
        let paths = match AssetStore::image_paths(dir) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("No images loaded: {e}");
                return 0;
            }
        };
        for (name, path) in paths {
            match Texture::from_file(&self.device, &self.queue, &path) {
                Ok(texture) => {
                    let bind_group = make_bind_group(
                        &self.device,
                        &self.texture_bind_group_layout,
                        &texture,
                        &self.sampler,
                        &name,
                    );
                    self.assets.insert(name, texture, bind_group);
                }
                Err(e) => log::warn!("Skipping image '{name}': {e}"),
            }
        }
        log::info!("Loaded {} images from {}", self.assets.len(), dir.display());
        self.assets.len()
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.assets.contains(name)
    }

    /// Draw a frame and present it.
    pub fn render(&self, list: &DrawList) -> Result<(), RenderError> {
        let geometry = build_geometry(list, &|name| self.has_image(name));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let buffers = (!geometry.indices.is_empty()).then(|| {
            let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Vertex Buffer"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        });

        {
            let [r, g, b, a] = list.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some((vertex_buffer, index_buffer)) = &buffers {
                pass.set_pipeline(&self.sprite_pipeline);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for batch in &geometry.batches {
                    let bind_group = batch
                        .texture
                        .and_then(|name| self.assets.bind_group(name))
                        .unwrap_or(&self.white_bind_group);
                    pass.set_bind_group(0, bind_group, &[]);
                    let start = batch.first_index;
                    pass.draw_indexed(start..start + batch.index_count, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn make_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
