//! Sprite vertices and CPU batching of draw lists.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::draw::{DrawCmd, DrawList};
use engine_core::Rect;

/// Fragment shading modes (must match `SPRITE_SHADER`).
pub const MODE_SOLID: f32 = 0.0;
pub const MODE_TEXTURE: f32 = 1.0;
pub const MODE_GLOW: f32 = 2.0;
pub const MODE_FOG: f32 = 3.0;
pub const MODE_RING: f32 = 4.0;

/// Image name of the bitmap font atlas.
pub const FONT_IMAGE: &str = "font";

/// Font atlas layout: 16 columns x 6 rows of 6x8 pixel glyphs, covering ASCII 32..127.
const FONT_COLS: f32 = 16.0;
const FONT_ROWS: f32 = 6.0;
pub const GLYPH_PX_W: f32 = 6.0;
pub const GLYPH_PX_H: f32 = 8.0;

/// Vertex for every 2D quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// Texture UV, or local -1..1 coordinates for procedural modes.
    pub tex_coords: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
    /// x = mode, y = mode parameter (fog inner ratio, ring thickness ratio).
    pub params: [f32; 2],
}

impl SpriteVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A run of indices drawn with one texture (`None` = plain white).
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub texture: Option<&'static str>,
    pub first_index: u32,
    pub index_count: u32,
}

/// Geometry for one frame.
#[derive(Debug, Default)]
pub struct FrameGeometry {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub batches: Vec<Batch>,
}

/// Builds [`FrameGeometry`] from a [`DrawList`].
struct Builder<'a, F: Fn(&str) -> bool> {
    geometry: FrameGeometry,
    has_image: &'a F,
    origin: Vec2,
    size: Vec2,
}

impl<'a, F: Fn(&str) -> bool> Builder<'a, F> {
    /// Convert view coords to NDC.
    fn to_ndc(&self, p: Vec2) -> [f32; 2] {
        let local = p - self.origin;
        [
            (local.x / self.size.x) * 2.0 - 1.0,
            1.0 - (local.y / self.size.y) * 2.0,
        ]
    }

    fn quad(
        &mut self,
        rect: Rect,
        texture: Option<&'static str>,
        uv: [f32; 4],
        color: [f32; 4],
        params: [f32; 2],
    ) {
        let tl = self.to_ndc(rect.position());
        let br = self.to_ndc(Vec2::new(rect.right(), rect.bottom()));
        let [u0, v0, u1, v1] = uv;
        let base = self.geometry.vertices.len() as u32;
        let corners = [
            ([tl[0], tl[1]], [u0, v0]),
            ([br[0], tl[1]], [u1, v0]),
            ([br[0], br[1]], [u1, v1]),
            ([tl[0], br[1]], [u0, v1]),
        ];
        for (position, tex_coords) in corners {
            self.geometry.vertices.push(SpriteVertex {
                position,
                tex_coords,
                color,
                params,
            });
        }

        let first_index = self.geometry.indices.len() as u32;
        self.geometry
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        match self.geometry.batches.last_mut() {
            Some(batch) if batch.texture == texture => batch.index_count += 6,
            _ => self.geometry.batches.push(Batch {
                texture,
                first_index,
                index_count: 6,
            }),
        }
    }

    fn command(&mut self, cmd: &DrawCmd) {
        const LOCAL: [f32; 4] = [-1.0, -1.0, 1.0, 1.0];
        match cmd {
            DrawCmd::Rect { rect, color } => self.quad(*rect, None, LOCAL, *color, [MODE_SOLID, 0.0]),
            DrawCmd::Image {
                name,
                rect,
                uv,
                tint,
                flip_x,
                flip_y,
                fallback,
            } => {
                if (self.has_image)(*name) {
                    let mut uv = *uv;
                    if *flip_x {
                        uv.swap(0, 2);
                    }
                    if *flip_y {
                        uv.swap(1, 3);
                    }
                    self.quad(*rect, Some(*name), uv, *tint, [MODE_TEXTURE, 0.0]);
                } else {
                    self.quad(*rect, None, LOCAL, *fallback, [MODE_SOLID, 0.0]);
                }
            }
            DrawCmd::Glow { center, radius, color } => {
                let rect = Rect::from_center(*center, Vec2::splat(radius * 2.0));
                self.quad(rect, None, LOCAL, *color, [MODE_GLOW, 0.0]);
            }
            DrawCmd::Ring {
                center,
                radius,
                thickness,
                color,
            } => {
                let rect = Rect::from_center(*center, Vec2::splat(radius * 2.0));
                let ratio = (thickness / radius.max(f32::EPSILON)).clamp(0.0, 1.0);
                self.quad(rect, None, LOCAL, *color, [MODE_RING, ratio]);
            }
            DrawCmd::Fog {
                area,
                center,
                inner,
                outer,
                color,
            } => {
                // Local coords are distances from `center` in units of `outer`.
                let outer = outer.max(f32::EPSILON);
                let uv = [
                    (area.left() - center.x) / outer,
                    (area.top() - center.y) / outer,
                    (area.right() - center.x) / outer,
                    (area.bottom() - center.y) / outer,
                ];
                self.quad(*area, None, uv, *color, [MODE_FOG, (inner / outer).clamp(0.0, 0.99)]);
            }
            DrawCmd::Text {
                text,
                position,
                scale,
                color,
            } => {
                if (self.has_image)(FONT_IMAGE) {
                    self.text(text, *position, *scale, *color);
                }
            }
        }
    }

    fn text(&mut self, text: &str, position: Vec2, scale: f32, color: [f32; 4]) {
        let gw = GLYPH_PX_W * scale;
        let gh = GLYPH_PX_H * scale;
        let mut cx = position.x;
        for ch in text.chars() {
            let code = ch as u32;
            if !(32..128).contains(&code) {
                cx += gw;
                continue;
            }
            let idx = code - 32;
            let col = (idx % 16) as f32;
            let row = (idx / 16) as f32;
            let uv = [
                col / FONT_COLS,
                row / FONT_ROWS,
                (col + 1.0) / FONT_COLS,
                (row + 1.0) / FONT_ROWS,
            ];
            self.quad(
                Rect::new(cx, position.y, gw, gh),
                Some(FONT_IMAGE),
                uv,
                color,
                [MODE_TEXTURE, 0.0],
            );
            cx += gw;
        }
    }
}

/// Pixel width of `text` at `scale`.
pub fn text_width(text: &str, scale: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_PX_W * scale
}

/// Turn a draw list into batched quads. `has_image` reports whether a named
/// image is loaded; unloaded images fall back to their solid colour.
pub fn build_geometry<F: Fn(&str) -> bool>(list: &DrawList, has_image: &F) -> FrameGeometry {
    let size = Vec2::new(list.view_size.x.max(1.0), list.view_size.y.max(1.0));
    let mut builder = Builder {
        geometry: FrameGeometry::default(),
        has_image,
        origin: list.view_origin,
        size,
    };
    for cmd in &list.world {
        builder.command(cmd);
    }
    builder.origin = Vec2::ZERO;
    for cmd in &list.overlay {
        builder.command(cmd);
    }
    builder.geometry
}
