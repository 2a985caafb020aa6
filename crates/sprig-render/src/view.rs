//! Pan / zoom view transform between screen space and layout space.
//!
//! `screen = layout * scale + translate`. The host applies the same matrix
//! to its drawing surface; pointer positions arriving in screen space are
//! mapped back with [`ViewTransform::to_layout`] before hit testing.

use kurbo::{Affine, Point, Size, Vec2};
use serde::Serialize;
use sprig_core::{Extent, TreeConfig};

/// Smallest and largest accepted zoom factors.
pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Centre the extent in the viewport at a fixed scale.
    pub fn centered(extent: &Extent, viewport: Size, scale: f64) -> Self {
        let (cx, cy) = extent.center();
        Self {
            translate_x: viewport.width / 2.0 - cx * scale,
            translate_y: viewport.height / 2.0 - cy * scale,
            scale,
        }
    }

    /// Zoom to fit: node boxes plus padding on every side, never enlarged
    /// beyond 1:1 and never below `MIN_SCALE`.
    pub fn fit(extent: &Extent, viewport: Size, config: &TreeConfig) -> Self {
        let content_w = extent.width() + config.node_width + config.fit_padding * 2.0;
        let content_h = extent.height() + config.node_height + config.fit_padding * 2.0;
        let scale = (viewport.width / content_w)
            .min(viewport.height / content_h)
            .clamp(MIN_SCALE, 1.0);
        Self::centered(extent, viewport, scale)
    }

    pub fn affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.translate_x, self.translate_y))
            * Affine::scale(self.scale)
    }

    pub fn to_screen(&self, layout: Point) -> Point {
        self.affine() * layout
    }

    pub fn to_layout(&self, screen: Point) -> Point {
        self.affine().inverse() * screen
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Multiply the scale by `factor`, keeping the layout point under
    /// `anchor` (screen space) fixed. Non-positive factors are ignored.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            log::debug!("zoom_at: ignoring factor {factor}");
            return;
        }
        let pinned = self.to_layout(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translate_x = anchor.x - pinned.x * self.scale;
        self.translate_y = anchor.y - pinned.y * self.scale;
    }
}
