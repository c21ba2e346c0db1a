//! Batched drawing of the scene graph.
//!
//! Every frame the surface manager clears the pass, queues the primary
//! sprite and the label, and renders everything in one render pass. Sprite
//! textures are registered once through [`SpritePass::upload_image`] and
//! addressed by [`TextureId`] afterwards.

use log::{debug, warn};

use crate::assets::DecodedImage;
use crate::config::FilterMode;
use crate::font::GlyphAtlas;
use crate::gpu::GpuContext;
use crate::scene::{Label, Sprite, TextureId, TextureRef};
use crate::texture::Texture;

/// Vertex for sprite and glyph quads.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2d {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SpriteUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

const MAX_VERTICES: usize = 16384;

enum BatchSource {
    Sprite(TextureId),
    Glyphs,
}

struct Batch {
    source: BatchSource,
    vertices: Vec<Vertex2d>,
}

struct GpuFont {
    atlas: GlyphAtlas,
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Immediate-mode renderer for the sprite and its label.
pub struct SpritePass {
    sprite_pipeline: wgpu::RenderPipeline,
    glyph_pipeline: wgpu::RenderPipeline,

    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,

    // Indexed by TextureId
    textures: Vec<(Texture, wgpu::BindGroup)>,
    font: Option<GpuFont>,

    filter: FilterMode,
    round_pixels: bool,
    scale_factor: f32,

    batches: Vec<Batch>,
}

impl SpritePass {
    pub fn new(gpu: &GpuContext, filter: FilterMode, round_pixels: bool) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Uniforms"),
            size: std::mem::size_of::<SpriteUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // group 0
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // group 1
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Texture Layout"),
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
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend_state = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let make_pipeline = |label: &str, fragment_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex2d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let sprite_pipeline = make_pipeline("Sprite Pipeline", "fs_sprite");
        let glyph_pipeline = make_pipeline("Glyph Pipeline", "fs_glyph");

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex2d>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            sprite_pipeline,
            glyph_pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
            textures: Vec::new(),
            font: None,
            filter,
            round_pixels,
            scale_factor: 1.0,
            batches: Vec::new(),
        }
    }

    fn bind_texture(&self, gpu: &GpuContext, texture: &Texture, label: &str) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Upload a decoded image and return a handle the scene can refer to.
    pub fn upload_image(&mut self, gpu: &GpuContext, image: &DecodedImage) -> TextureRef {
        let texture = Texture::from_image(gpu, image, self.filter);
        let bind_group = self.bind_texture(gpu, &texture, "Sprite Texture Bind Group");

        let id = TextureId::new(self.textures.len());
        self.textures.push((texture, bind_group));
        TextureRef::new(id, image.width, image.height)
    }

    /// Release every uploaded sprite texture.
    pub fn release_textures(&mut self) {
        let released = self.textures.len();
        self.textures.clear();
        debug!("released {} sprite texture(s)", released);
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Install the glyph atlas used for labels.
    pub fn set_font(&mut self, gpu: &GpuContext, atlas: GlyphAtlas) {
        let (width, height) = atlas.dimensions();
        let texture = Texture::from_coverage(gpu, atlas.bitmap(), width, height, "Glyph Atlas");
        let bind_group = self.bind_texture(gpu, &texture, "Glyph Atlas Bind Group");
        self.font = Some(GpuFont {
            atlas,
            _texture: texture,
            bind_group,
        });
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Device pixels per logical pixel for the frames that follow.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    /// Clear all draw calls for the new frame.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Queue the sprite's current texture.
    pub fn sprite(&mut self, sprite: &Sprite) {
        if sprite.alpha <= 0.0 {
            return;
        }
        let vertices = sprite_quad(sprite, self.scale_factor, self.round_pixels);
        self.batches.push(Batch {
            source: BatchSource::Sprite(sprite.texture().id),
            vertices: vertices.to_vec(),
        });
    }

    /// Queue a label. Nothing is drawn without a font.
    pub fn label(&mut self, label: &Label) {
        if label.alpha <= 0.0 {
            return;
        }
        let Some(font) = &self.font else {
            return;
        };
        let vertices = label_quads(&font.atlas, label, self.scale_factor);
        if !vertices.is_empty() {
            self.batches.push(Batch {
                source: BatchSource::Glyphs,
                vertices,
            });
        }
    }

    /// Render all batched draw calls.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass) {
        let uniforms = SpriteUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            _padding: [0.0, 0.0],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let mut offset = 0usize;
        for batch in &self.batches {
            if offset + batch.vertices.len() > MAX_VERTICES {
                warn!("vertex buffer full, dropping remaining batches");
                break;
            }

            let (pipeline, bind_group) = match batch.source {
                BatchSource::Sprite(id) => {
                    let Some((_, bind_group)) = self.textures.get(id.index()) else {
                        continue;
                    };
                    (&self.sprite_pipeline, bind_group)
                }
                BatchSource::Glyphs => {
                    let Some(font) = &self.font else {
                        continue;
                    };
                    (&self.glyph_pipeline, &font.bind_group)
                }
            };

            gpu.queue.write_buffer(
                &self.vertex_buffer,
                (offset * std::mem::size_of::<Vertex2d>()) as u64,
                bytemuck::cast_slice(&batch.vertices),
            );

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, bind_group, &[]);
            render_pass.draw(offset as u32..(offset + batch.vertices.len()) as u32, 0..1);

            offset += batch.vertices.len();
        }
    }
}

fn quad(
    min: [f32; 2],
    max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
) -> [Vertex2d; 6] {
    let [x0, y0] = min;
    let [x1, y1] = max;
    let [u0, v0] = uv_min;
    let [u1, v1] = uv_max;
    let v = |x, y, s, t| Vertex2d {
        position: [x, y],
        uv: [s, t],
        color,
    };
    [
        v(x0, y0, u0, v0),
        v(x1, y0, u1, v0),
        v(x0, y1, u0, v1),
        v(x1, y0, u1, v0),
        v(x1, y1, u1, v1),
        v(x0, y1, u0, v1),
    ]
}

/// Quad for a sprite in device pixels.
fn sprite_quad(sprite: &Sprite, scale_factor: f32, round_pixels: bool) -> [Vertex2d; 6] {
    let (min, max) = sprite.bounds();
    let mut min = min * scale_factor;
    let mut max = max * scale_factor;
    if round_pixels {
        min = min.round();
        max = max.round();
    }
    quad(
        min.to_array(),
        max.to_array(),
        [0.0, 0.0],
        [1.0, 1.0],
        [1.0, 1.0, 1.0, sprite.alpha.clamp(0.0, 1.0)],
    )
}

/// Glyph quads for a label in device pixels, centered on its anchor.
fn label_quads(atlas: &GlyphAtlas, label: &Label, scale_factor: f32) -> Vec<Vertex2d> {
    let k = label.font_size * scale_factor / atlas.size() * label.scale.x;
    let ky = label.font_size * scale_factor / atlas.size() * label.scale.y;
    let width = atlas.measure(&label.text) * k;
    let height = atlas.line_height() * ky;

    let origin = label.position * scale_factor;
    let mut cursor_x = origin.x - label.anchor.x * width;
    let top = origin.y - label.anchor.y * height;
    let baseline = top + atlas.ascent() * ky;

    let color = label.color.with_alpha(label.color.a * label.alpha.clamp(0.0, 1.0));
    let mut vertices = Vec::with_capacity(label.text.len() * 6);

    for ch in label.text.chars() {
        let Some(glyph) = atlas.glyph(ch) else {
            cursor_x += atlas.size() * 0.5 * k;
            continue;
        };

        if glyph.width > 0 && glyph.height > 0 {
            let gx = cursor_x + glyph.offset_x * k;
            let gy = baseline - (glyph.offset_y + glyph.height as f32) * ky;
            let gw = glyph.width as f32 * k;
            let gh = glyph.height as f32 * ky;

            vertices.extend_from_slice(&quad(
                [gx, gy],
                [gx + gw, gy + gh],
                [glyph.uv[0], glyph.uv[1]],
                [glyph.uv[0] + glyph.uv[2], glyph.uv[1] + glyph.uv[3]],
                color.to_array(),
            ));
        }

        cursor_x += glyph.advance * k;
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sprite(scale: f32) -> Sprite {
        let mut sprite = Sprite::still(TextureRef::new(TextureId::new(0), 3, 3));
        sprite.position = Vec2::new(10.0, 10.0);
        sprite.scale = Vec2::splat(scale);
        sprite.alpha = 0.5;
        sprite
    }

    #[test]
    fn sprite_quad_covers_bounds() {
        let vertices = sprite_quad(&sprite(2.0), 1.0, false);
        assert_eq!(vertices[0].position, [7.0, 7.0]);
        assert_eq!(vertices[4].position, [13.0, 13.0]);
        assert_eq!(vertices[4].uv, [1.0, 1.0]);
        assert_eq!(vertices[0].color, [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn sprite_quad_scales_to_device_pixels() {
        let vertices = sprite_quad(&sprite(2.0), 2.0, false);
        assert_eq!(vertices[0].position, [14.0, 14.0]);
        assert_eq!(vertices[4].position, [26.0, 26.0]);
    }

    #[test]
    fn round_pixels_snaps_edges() {
        // 3 * 1.5 = 4.5 wide around 10: edges at 7.75 and 12.25
        let vertices = sprite_quad(&sprite(1.5), 1.0, true);
        assert_eq!(vertices[0].position, [8.0, 8.0]);
        assert_eq!(vertices[4].position, [12.0, 12.0]);

        let unsnapped = sprite_quad(&sprite(1.5), 1.0, false);
        assert_eq!(unsnapped[0].position, [7.75, 7.75]);
    }
}
