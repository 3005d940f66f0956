// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware surface descriptor and engine enumerations.

use crate::geometry::Rect;

/// Pixel formats understood by the 2D engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HwFormat {
    /// 16-bit RGB 5:6:5.
    Rgb565,
    /// 32-bit RGBA.
    #[default]
    Rgba8888,
    /// 32-bit RGB, alpha ignored.
    Rgbx8888,
    /// 32-bit BGRA.
    Bgra8888,
    /// 32-bit BGR, alpha ignored.
    Bgrx8888,
    /// 32-bit ARGB.
    Argb8888,
    /// 32-bit ABGR.
    Abgr8888,
    /// Semi-planar 4:2:0, U/V.
    Nv12,
    /// Semi-planar 4:2:0, V/U.
    Nv21,
    /// Semi-planar 4:2:2, U/V.
    Nv16,
    /// Semi-planar 4:2:2, V/U.
    Nv61,
    /// Planar 4:2:0, Y then U then V.
    I420,
    /// Planar 4:2:0, Y then V then U.
    Yv12,
    /// Packed 4:2:2, Y0 U Y1 V.
    Yuyv,
    /// Packed 4:2:2, U Y0 V Y1.
    Uyvy,
}

/// Rotation or mirroring applied by the engine to one side of a blit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// No change.
    #[default]
    Rot0,
    /// 90 degrees clockwise.
    Rot90,
    /// 180 degrees.
    Rot180,
    /// 270 degrees clockwise.
    Rot270,
    /// Horizontal mirror.
    FlipH,
    /// Vertical mirror.
    FlipV,
}

impl Rotation {
    /// Returns `true` for the rotations that swap width and height.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Rot90 | Self::Rot270)
    }
}

/// Blend factor applied to one side of a blit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendFunc {
    /// Factor 0.
    #[default]
    Zero,
    /// Factor 1.
    One,
    /// Source alpha.
    SrcAlpha,
    /// One minus source alpha.
    OneMinusSrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// One minus destination alpha.
    OneMinusDstAlpha,
}

/// Memory tiling of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tiling {
    /// Row-major, untiled.
    #[default]
    Linear,
    /// 4×4 GPU tiling.
    Tiled,
    /// 64×64 super tiling.
    SuperTiled,
    /// Video decoder tiling.
    AmphionTiled,
    /// Video decoder interlaced tiling.
    AmphionInterlaced,
}

/// Engine state toggled through `enable`/`disable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Alpha blending.
    Blend,
    /// Dithering.
    Dither,
    /// Global (per-surface) alpha.
    GlobalAlpha,
}

/// Optional hardware features that can be queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Scaled blits.
    Scaling,
    /// Rotated blits.
    Rotation,
    /// YUV source surfaces.
    SrcYuv,
    /// YUV destination surfaces.
    DstYuv,
    /// Multiple sources in one blit.
    MultiSourceBlit,
    /// Hardware fast clear.
    FastClear,
}

/// Everything the engine needs to know about one side of a blit or clear.
///
/// Rebuilt from a buffer for every operation; never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    /// Hardware pixel format.
    pub format: HwFormat,
    /// Physical plane addresses. Unused planes are 0.
    pub planes: [u64; 3],
    /// Left edge of the operated rectangle.
    pub left: i32,
    /// Top edge of the operated rectangle.
    pub top: i32,
    /// Right edge of the operated rectangle.
    pub right: i32,
    /// Bottom edge of the operated rectangle.
    pub bottom: i32,
    /// Row pitch in pixels.
    pub stride: u32,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Blend factor for this side.
    pub blend_func: BlendFunc,
    /// Global alpha (255 = opaque).
    pub global_alpha: u8,
    /// ARGB fill color for clears.
    pub clear_color: u32,
    /// Rotation or flip for this side.
    pub rotation: Rotation,
    /// Memory tiling.
    pub tiling: Tiling,
}

impl Surface {
    /// The operated rectangle.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }

    /// Replaces the operated rectangle.
    #[inline]
    pub fn set_rect(&mut self, rect: Rect) {
        self.left = rect.left;
        self.top = rect.top;
        self.right = rect.right;
        self.bottom = rect.bottom;
    }
}
