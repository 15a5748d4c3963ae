//! Manages the WebGPU render pipelines and the per-frame render pass.
//!
//! Two pipelines share one shader module and one pipeline layout:
//!
//! - `block_pipeline`: opaque, depth-writing, draws every terrain block instance
//! - `highlight_pipeline`: alpha-blended, depth-tested but not depth-writing, draws the
//!   single pick highlight on top of the terrain
//!
//! The depth texture lives here too because it is the only render-target resource that has
//! to follow the surface size.

use log::error;
use wgpu::{BindGroupLayout, Device, RenderPipeline, SurfaceConfiguration, TextureFormat};

use super::{
    texture,
    vertex::{CubeVertex, InstanceRaw},
};

/// Bind group slot of the camera uniform.
pub const CAMERA_BIND_GROUP_INDEX: u32 = 0;
/// Bind group slot of the atlas texture and sampler.
pub const ATLAS_BIND_GROUP_INDEX: u32 = 1;

/// Shaders are compiled into the binary so both native and web builds run without assets.
const BLOCK_SHADER: &str = include_str!("shaders/block.wgsl");

/// GPU buffers and bind groups a frame draws from.
pub struct FrameResources<'a> {
    pub camera_bind_group: &'a wgpu::BindGroup,
    pub atlas_bind_group: &'a wgpu::BindGroup,
    pub vertex_buffer: &'a wgpu::Buffer,
    pub index_buffer: &'a wgpu::Buffer,
    pub num_indices: u32,
    pub instance_buffer: &'a wgpu::Buffer,
    pub num_instances: u32,
    pub highlight_buffer: &'a wgpu::Buffer,
    pub draw_highlight: bool,
}

/// Owns the render pipelines, their bind group layouts and the depth buffer.
pub struct PipelineManager {
    pub camera_bind_group_layout: BindGroupLayout,
    pub atlas_bind_group_layout: BindGroupLayout,
    block_pipeline: RenderPipeline,
    highlight_pipeline: RenderPipeline,
    depth_texture: texture::DepthTexture,
}

impl PipelineManager {
    pub fn new(device: &Device, config: &SurfaceConfiguration, texture_format: TextureFormat) -> Self {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let atlas_bind_group_layout =
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
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("atlas_bind_group_layout"),
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOCK_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Block Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &atlas_bind_group_layout],
            push_constant_ranges: &[],
        });

        let block_pipeline = Self::create_pipeline(
            device,
            &layout,
            &shader,
            texture_format,
            PipelineKind::Opaque,
        );
        let highlight_pipeline = Self::create_pipeline(
            device,
            &layout,
            &shader,
            texture_format,
            PipelineKind::Translucent,
        );

        let depth_texture = texture::DepthTexture::new(device, config, "DEPTH TEXTURE");

        Self {
            camera_bind_group_layout,
            atlas_bind_group_layout,
            block_pipeline,
            highlight_pipeline,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        texture_format: TextureFormat,
        kind: PipelineKind,
    ) -> RenderPipeline {
        let (label, fragment_entry, blend, depth_write_enabled) = match kind {
            PipelineKind::Opaque => ("Block Pipeline", "fs_main", wgpu::BlendState::REPLACE, true),
            PipelineKind::Translucent => (
                "Highlight Pipeline",
                "fs_highlight",
                wgpu::BlendState::ALPHA_BLENDING,
                false,
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[CubeVertex::desc(), InstanceRaw::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::DepthTexture::FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Renders one frame to `surface`.
    ///
    /// Returns `false` if no frame was drawn. A lost or outdated surface is reconfigured so the
    /// next frame can succeed; any other acquisition error is logged and the frame skipped.
    pub fn render(
        &self,
        surface: &wgpu::Surface,
        config: &SurfaceConfiguration,
        device: &Device,
        queue: &wgpu::Queue,
        resources: FrameResources<'_>,
    ) -> bool {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return false;
            }
            Err(err) => {
                error!("Error getting current frame: {:?}", err);
                return false;
            }
        };

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Terrain Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            rpass.set_bind_group(CAMERA_BIND_GROUP_INDEX, resources.camera_bind_group, &[]);
            rpass.set_bind_group(ATLAS_BIND_GROUP_INDEX, resources.atlas_bind_group, &[]);
            rpass.set_vertex_buffer(0, resources.vertex_buffer.slice(..));
            rpass.set_index_buffer(resources.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            if resources.num_instances > 0 {
                rpass.set_pipeline(&self.block_pipeline);
                rpass.set_vertex_buffer(1, resources.instance_buffer.slice(..));
                rpass.draw_indexed(0..resources.num_indices, 0, 0..resources.num_instances);
            }

            if resources.draw_highlight {
                rpass.set_pipeline(&self.highlight_pipeline);
                rpass.set_vertex_buffer(1, resources.highlight_buffer.slice(..));
                rpass.draw_indexed(0..resources.num_indices, 0, 0..1);
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        true
    }

    /// Recreates the depth texture for the new surface size.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        if self.depth_texture.fits(config) {
            return;
        }
        self.depth_texture = texture::DepthTexture::new(device, config, "DEPTH TEXTURE");
    }
}

/// Clear colour standing in for the sky.
const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.72,
    b: 0.9,
    a: 1.0,
};

#[derive(Clone, Copy)]
enum PipelineKind {
    Opaque,
    Translucent,
}
