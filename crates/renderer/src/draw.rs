//! CPU-side draw commands.
//!
//! The game fills a [`DrawList`] each frame; the renderer turns it into quads.
//! Nothing here touches the GPU, so scene building is testable headless.

use engine_core::Rect;
use glam::Vec2;

/// Texture coordinates covering a whole image.
pub const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Solid rectangle.
    Rect { rect: Rect, color: [f32; 4] },
    /// Named image. Drawn as `fallback` when the image is not loaded.
    Image {
        name: &'static str,
        rect: Rect,
        /// u0, v0, u1, v1
        uv: [f32; 4],
        tint: [f32; 4],
        flip_x: bool,
        flip_y: bool,
        fallback: [f32; 4],
    },
    /// Soft radial light.
    Glow {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    /// Outline circle.
    Ring {
        center: Vec2,
        radius: f32,
        thickness: f32,
        color: [f32; 4],
    },
    /// Darkness outside `inner`, fully opaque beyond `outer`, covering `area`.
    Fog {
        area: Rect,
        center: Vec2,
        inner: f32,
        outer: f32,
        color: [f32; 4],
    },
    /// Bitmap text; skipped when no font is loaded.
    Text {
        text: String,
        position: Vec2,
        scale: f32,
        color: [f32; 4],
    },
}

/// Commands for one frame, in painter's order.
#[derive(Debug, Clone)]
pub struct DrawList {
    pub clear_color: [f32; 4],
    /// World position of the viewport's top-left corner (shake included).
    pub view_origin: Vec2,
    /// Viewport size in world units and in pixels.
    pub view_size: Vec2,
    /// Drawn in world space.
    pub world: Vec<DrawCmd>,
    /// Drawn in screen pixels on top of the world.
    pub overlay: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(view_size: Vec2) -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            view_origin: Vec2::ZERO,
            view_size,
            world: Vec::new(),
            overlay: Vec::new(),
        }
    }

    /// Reset for a new frame, keeping allocations.
    pub fn clear(&mut self) {
        self.world.clear();
        self.overlay.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty() && self.overlay.is_empty()
    }

    /// World rectangle currently visible.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(self.view_origin.x, self.view_origin.y, self.view_size.x, self.view_size.y)
    }

    pub fn rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.world.push(DrawCmd::Rect { rect, color });
    }

    pub fn image(&mut self, name: &'static str, rect: Rect, fallback: [f32; 4]) -> &mut DrawCmd {
        self.world.push(DrawCmd::Image {
            name,
            rect,
            uv: FULL_UV,
            tint: [1.0; 4],
            flip_x: false,
            flip_y: false,
            fallback,
        });
        let last = self.world.len() - 1;
        &mut self.world[last]
    }

    pub fn glow(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.world.push(DrawCmd::Glow { center, radius, color });
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]) {
        self.world.push(DrawCmd::Ring {
            center,
            radius,
            thickness,
            color,
        });
    }

    /// Darken `area` outside a soft circle around `center`.
    pub fn fog(&mut self, area: Rect, center: Vec2, inner: f32, outer: f32, color: [f32; 4]) {
        self.world.push(DrawCmd::Fog {
            area,
            center,
            inner,
            outer,
            color,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, position: Vec2, scale: f32, color: [f32; 4]) {
        self.world.push(DrawCmd::Text {
            text: text.into(),
            position,
            scale,
            color,
        });
    }

    pub fn overlay_rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.overlay.push(DrawCmd::Rect { rect, color });
    }

    pub fn overlay_text(&mut self, text: impl Into<String>, position: Vec2, scale: f32, color: [f32; 4]) {
        self.overlay.push(DrawCmd::Text {
            text: text.into(),
            position,
            scale,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_builder_can_be_adjusted() {
        let mut list = DrawList::new(Vec2::new(960.0, 540.0));
        if let DrawCmd::Image { flip_x, .. } =
            list.image("player", Rect::new(0.0, 0.0, 14.0, 26.0), [1.0; 4])
        {
            *flip_x = true;
        }
        assert!(matches!(list.world[0], DrawCmd::Image { flip_x: true, .. }));
    }

    #[test]
    fn visible_rect_follows_origin() {
        let mut list = DrawList::new(Vec2::new(100.0, 50.0));
        list.view_origin = Vec2::new(30.0, 40.0);
        assert_eq!(list.visible_rect(), Rect::new(30.0, 40.0, 100.0, 50.0));
    }
}
