use crate::assets::DecodedImage;
use crate::config::FilterMode;
use crate::gpu::GpuContext;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    ///
    /// Edges clamp so that magnified sprites never bleed the opposite border.
    pub fn from_rgba(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        filter: FilterMode,
        label: &str,
    ) -> Self {
        Self::with_format(
            gpu,
            data,
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            filter,
            label,
        )
    }

    /// Create a single-channel coverage texture, as used for glyph atlases.
    pub fn from_coverage(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        Self::with_format(
            gpu,
            data,
            width,
            height,
            wgpu::TextureFormat::R8Unorm,
            FilterMode::Linear,
            label,
        )
    }

    /// Upload a decoded image.
    pub fn from_image(gpu: &GpuContext, image: &DecodedImage, filter: FilterMode) -> Self {
        let label = image.path.display().to_string();
        Self::from_rgba(gpu, &image.rgba, image.width, image.height, filter, &label)
    }

    fn with_format(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        filter: FilterMode,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let filter = filter.to_wgpu();
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
            width,
            height,
        }
    }
}
