// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer orientation bits.

use bitflags::bitflags;

bitflags! {
    /// Orientation applied to a layer's source before it reaches the display.
    ///
    /// Bit values follow the HAL convention: flips are applied first, then the
    /// 90-degree rotation. The 180 and 270 degree rotations are the named
    /// combinations [`ROT_180`](Self::ROT_180) and [`ROT_270`](Self::ROT_270).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Transform: u32 {
        /// Mirror horizontally.
        const FLIP_H = 0x01;
        /// Mirror vertically.
        const FLIP_V = 0x02;
        /// Rotate 90 degrees clockwise.
        const ROT_90 = 0x04;
        /// Rotate 180 degrees.
        const ROT_180 = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        /// Rotate 270 degrees clockwise.
        const ROT_270 = Self::ROT_180.bits() | Self::ROT_90.bits();
    }
}

impl Transform {
    /// No orientation change.
    pub const IDENTITY: Self = Self::empty();

    /// Wraps a raw HAL transform value, keeping unknown bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }

    /// Returns `true` if the transform swaps width and height.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        self.contains(Self::ROT_90)
    }
}
