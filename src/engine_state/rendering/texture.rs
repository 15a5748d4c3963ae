//! Texture handling for the rendering pipeline.
//!
//! GPU-side textures: the depth buffer that is rebuilt whenever the surface size changes and
//! the block atlas uploaded once at start-up.

use super::atlas::TextureAtlas;

/// The depth buffer. It is only ever a render attachment, so it carries no sampler.
pub struct DepthTexture {
    texture: wgpu::Texture,
    /// View bound as the render pass depth attachment
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    /// The texture format used for depth buffers.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface size.
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, label: &str) -> Self {
        let (width, height) = Self::extent_of(config);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// Whether the buffer already has the size `config` asks for.
    pub fn fits(&self, config: &wgpu::SurfaceConfiguration) -> bool {
        (self.texture.width(), self.texture.height()) == Self::extent_of(config)
    }

    fn extent_of(config: &wgpu::SurfaceConfiguration) -> (u32, u32) {
        (config.width.max(1), config.height.max(1))
    }
}

/// A sampled GPU texture with its view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Uploads the block atlas as an sRGB texture sampled with nearest filtering.
    pub fn from_atlas(device: &wgpu::Device, queue: &wgpu::Queue, atlas: &TextureAtlas) -> Self {
        let size = wgpu::Extent3d {
            width: atlas.width(),
            height: atlas.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Block Atlas Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * atlas.width()),
                rows_per_image: Some(atlas.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Block Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        }
    }

    #[test]
    fn depth_extent_follows_the_surface() {
        assert_eq!(DepthTexture::extent_of(&surface_config(800, 600)), (800, 600));
    }

    #[test]
    fn minimised_surface_keeps_a_one_texel_depth_buffer() {
        assert_eq!(DepthTexture::extent_of(&surface_config(0, 0)), (1, 1));
        assert_eq!(DepthTexture::extent_of(&surface_config(640, 0)), (640, 1));
    }
}
