//! Rendering system for the voxel viewer.
//!
//! [`RenderManager`] owns the wgpu surface, device and queue together with every GPU
//! resource the viewer draws from: the shared cube mesh, one instance per terrain block, the
//! highlight instance, the camera uniform and the atlas texture. It reads the world, never
//! writes it.

use log::debug;
use wgpu::{util::DeviceExt, Device, Queue, Surface, SurfaceConfiguration};

use crate::engine_state::{
    camera_state::camera::{Camera, CameraUniform, Projection},
    picking::Highlight,
    voxels::block::BlockCollection,
};

use atlas::{TextureAtlas, UvRect};
use pipeline_manager::{FrameResources, PipelineManager};
use vertex::{cube_mesh, InstanceRaw};

pub mod atlas;
mod pipeline_manager;
mod texture;
pub mod vertex;

/// Opacity of terrain block instances.
const OPAQUE: f32 = 1.0;

/// Manages the entire rendering pipeline for the viewer.
pub struct RenderManager {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    pipeline_manager: PipelineManager,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    instance_buffer: wgpu::Buffer,
    num_instances: u32,
    highlight_buffer: wgpu::Buffer,
}

impl RenderManager {
    /// Uploads the terrain and atlas and builds the pipelines.
    ///
    /// The instance buffer is written once here; the block collection never changes afterwards.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        blocks: &BlockCollection,
        atlas: &TextureAtlas,
        block_cell: [u32; 2],
    ) -> Self {
        let pipeline_manager = PipelineManager::new(&device, &surface_config, surface_config.format);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipeline_manager.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let atlas_texture = texture::Texture::from_atlas(&device, &queue, atlas);
        debug!(
            "Uploaded block atlas ({}x{})",
            atlas_texture.texture.width(),
            atlas_texture.texture.height()
        );
        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipeline_manager.atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas_texture.sampler),
                },
            ],
            label: Some("atlas_bind_group"),
        });

        let (vertices, indices) = cube_mesh(&UvRect::for_cell(block_cell[0], block_cell[1]));
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut instances: Vec<InstanceRaw> = blocks
            .iter()
            .map(|block| InstanceRaw::new(block.world_position, 1.0, OPAQUE))
            .collect();
        let num_instances = instances.len() as u32;
        if instances.is_empty() {
            // Keep the buffer non-empty; nothing is drawn from it.
            instances.push(bytemuck::Zeroable::zeroed());
        }
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Block Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let highlight_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Highlight Instance Buffer"),
            contents: bytemuck::cast_slice(&[<InstanceRaw as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            atlas_bind_group,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            instance_buffer,
            num_instances,
            highlight_buffer,
        }
    }

    /// Reconfigures the surface and depth buffer. A zero-sized window is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Draws the terrain from `camera`, plus `highlight` if there is one.
    ///
    /// Returns `false` when no surface texture could be acquired and the frame was skipped.
    pub fn render(
        &mut self,
        camera: &Camera,
        projection: &Projection,
        highlight: Option<&Highlight>,
    ) -> bool {
        self.camera_uniform.update_view_proj_and_pos(camera, projection);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));

        if let Some(highlight) = highlight {
            let instance = InstanceRaw::new(highlight.position, highlight.size, highlight.opacity);
            self.queue
                .write_buffer(&self.highlight_buffer, 0, bytemuck::cast_slice(&[instance]));
        }

        self.pipeline_manager.render(
            &self.surface,
            &self.surface_config,
            &self.device,
            &self.queue,
            FrameResources {
                camera_bind_group: &self.camera_bind_group,
                atlas_bind_group: &self.atlas_bind_group,
                vertex_buffer: &self.vertex_buffer,
                index_buffer: &self.index_buffer,
                num_indices: self.num_indices,
                instance_buffer: &self.instance_buffer,
                num_instances: self.num_instances,
                highlight_buffer: &self.highlight_buffer,
                draw_highlight: highlight.is_some(),
            },
        )
    }
}
