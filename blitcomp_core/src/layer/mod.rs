// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame layer description.
//!
//! A *layer* is one entry of the back-to-front stack handed to the
//! compositor each frame. Each layer has:
//!
//! - **Content**: either a [`Buffer`] to sample from, or a solid color that
//!   the compositor renders from its own dim buffer.
//! - **Geometry**: a source crop in buffer space, a display frame in target
//!   space, and the visible region of the frame left uncovered by layers
//!   above it.
//! - **Appearance**: [`Transform`], [`BlendMode`] and plane alpha.
//!
//! Layers are supplied by the caller and only read by the compositor.

mod blend;
mod transform;

pub use blend::BlendMode;
pub use transform::Transform;

use crate::buffer::Buffer;
use crate::geometry::{Rect, Region};

/// What a layer shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerContent {
    /// Content sampled from a buffer. `None` means the producer has not
    /// attached one yet; such a layer composes nothing.
    Buffer(Option<Buffer>),
    /// A solid ARGB color with no backing buffer.
    SolidColor(u32),
}

/// One layer of the composition stack.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// What the layer shows.
    pub content: LayerContent,
    /// Source crop in buffer pixels. Fractional crops are rounded to the
    /// nearest pixel edge.
    pub source_crop: kurbo::Rect,
    /// Destination rectangle on the render target.
    pub display_frame: Rect,
    /// Parts of the display frame that are visible on screen.
    pub visible_region: Region,
    /// Orientation applied to the source.
    pub transform: Transform,
    /// Blend mode.
    pub blend_mode: BlendMode,
    /// Per-layer opacity (255 = opaque).
    pub plane_alpha: u8,
    /// Whether the producer marked the layer as ready for composition.
    pub valid: bool,
}

impl Layer {
    /// Creates an opaque layer showing the whole of `buffer` in
    /// `display_frame`, fully visible.
    #[must_use]
    pub fn with_buffer(buffer: Buffer, display_frame: Rect) -> Self {
        let full = Rect::from_size(buffer.width, buffer.height);
        Self {
            content: LayerContent::Buffer(Some(buffer)),
            source_crop: full.into(),
            display_frame,
            visible_region: Region::from_rect(display_frame),
            transform: Transform::IDENTITY,
            blend_mode: BlendMode::None,
            plane_alpha: 0xff,
            valid: true,
        }
    }

    /// Creates a fully visible solid-color layer covering `display_frame`.
    #[must_use]
    pub fn solid_color(argb: u32, display_frame: Rect) -> Self {
        Self {
            content: LayerContent::SolidColor(argb),
            source_crop: kurbo::Rect::ZERO,
            display_frame,
            visible_region: Region::from_rect(display_frame),
            transform: Transform::IDENTITY,
            blend_mode: BlendMode::Dim,
            plane_alpha: 0xff,
            valid: true,
        }
    }

    /// Replaces the transform.
    #[must_use]
    pub fn transformed(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Replaces the blend mode.
    #[must_use]
    pub fn blended(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Replaces the visible region.
    #[must_use]
    pub fn visible(mut self, region: Region) -> Self {
        self.visible_region = region;
        self
    }

    /// Returns `true` for solid-color layers.
    #[inline]
    #[must_use]
    pub const fn is_solid_color(&self) -> bool {
        matches!(self.content, LayerContent::SolidColor(_))
    }

    /// The attached buffer, if any.
    #[must_use]
    pub fn buffer(&self) -> Option<&Buffer> {
        match &self.content {
            LayerContent::Buffer(buffer) => buffer.as_ref(),
            LayerContent::SolidColor(_) => None,
        }
    }

    /// The solid ARGB color, if this is a solid-color layer.
    #[must_use]
    pub const fn color(&self) -> Option<u32> {
        match self.content {
            LayerContent::SolidColor(argb) => Some(argb),
            LayerContent::Buffer(_) => None,
        }
    }

    /// The source crop rounded to whole pixels.
    #[must_use]
    pub fn source_rect(&self) -> Rect {
        Rect::from_kurbo(self.source_crop)
    }
}
