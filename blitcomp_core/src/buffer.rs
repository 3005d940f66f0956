// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graphics buffer descriptors and the allocator contract.
//!
//! A [`Buffer`] describes physically contiguous pixel memory owned by the
//! platform allocator. The compositor reads buffers it is handed (layer
//! content, render target) and owns only the scratch buffers it obtains from
//! a [`MemoryManager`], which it hands back by value on release.

use core::fmt;

use bitflags::bitflags;

use crate::error::NativeError;

/// Opaque identity of an allocated buffer.
///
/// Assigned by the allocator; the compositor never interprets the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BufferId(pub u64);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.0)
    }
}

/// Platform-level pixel format of a buffer.
///
/// This is the allocator's abstract format, independent of any particular
/// engine's format enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit RGBA, 8 bits per channel.
    Rgba8888,
    /// 32-bit RGB with an ignored alpha byte.
    Rgbx8888,
    /// 16-bit RGB 5:6:5.
    Rgb565,
    /// 32-bit BGRA, 8 bits per channel.
    Bgra8888,
    /// Semi-planar 4:2:0, interleaved V/U chroma plane.
    Nv21,
    /// Semi-planar 4:2:0, interleaved U/V chroma plane.
    Nv12,
    /// Fully planar 4:2:0, U plane before V plane.
    I420,
    /// Fully planar 4:2:0, V plane before U plane.
    Yv12,
    /// Semi-planar 4:2:2, interleaved U/V chroma plane.
    Nv16,
    /// Packed 4:2:2, Y0 U Y1 V.
    Yuyv,
    /// A format code the compositor has no mapping for.
    Other(u32),
}

impl PixelFormat {
    /// Returns `true` for the YUV family of formats.
    #[must_use]
    pub const fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Nv21 | Self::Nv12 | Self::I420 | Self::Yv12 | Self::Nv16 | Self::Yuyv
        )
    }
}

bitflags! {
    /// Intended uses of a buffer, as requested from the allocator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Usage: u32 {
        /// CPU reads.
        const SW_READ = 1 << 0;
        /// CPU writes.
        const SW_WRITE = 1 << 1;
        /// Sampled as a GPU texture.
        const TEXTURE = 1 << 2;
        /// Rendered into by the GPU.
        const RENDER = 1 << 3;
        /// Accessed by the 2D blit engine.
        const HW_2D = 1 << 4;
        /// Used by the hardware composer.
        const COMPOSER = 1 << 5;
        /// Scanned out by the display controller.
        const SCANOUT = 1 << 6;
    }
}

impl Usage {
    /// Usage of every scratch buffer the compositor allocates.
    pub const COMPOSITION: Self = Self::COMPOSER.union(Self::HW_2D).union(Self::RENDER);
}

/// Descriptor of an allocated graphics buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    /// Allocator-assigned identity.
    pub id: BufferId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row pitch in pixels.
    pub stride: u32,
    /// Abstract pixel format.
    pub format: PixelFormat,
    /// Native (HAL) format code, passed through to allocations untouched.
    pub native_format: u32,
    /// Physical base address of the first plane.
    pub phys: u64,
    /// Usage the buffer was allocated with.
    pub usage: Usage,
}

/// Allocation request passed to [`MemoryManager::allocate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryDesc {
    /// Requested width in pixels.
    pub width: u32,
    /// Requested height in pixels.
    pub height: u32,
    /// Abstract pixel format.
    pub format: PixelFormat,
    /// Native (HAL) format code.
    pub native_format: u32,
    /// Intended usage.
    pub usage: Usage,
}

impl MemoryDesc {
    /// Describes a `width` × `height` buffer in the same formats as
    /// `template`.
    #[must_use]
    pub fn matching(template: &Buffer, width: u32, height: u32, usage: Usage) -> Self {
        Self {
            width,
            height,
            format: template.format,
            native_format: template.native_format,
            usage,
        }
    }
}

/// Platform buffer allocator.
///
/// Implementations must tolerate being called from the compositor's thread;
/// the compositor never has more than one call in flight.
pub trait MemoryManager {
    /// Allocates a buffer matching `desc`.
    ///
    /// The allocator chooses stride and physical placement.
    fn allocate(&mut self, desc: &MemoryDesc) -> Result<Buffer, NativeError>;

    /// Returns a buffer previously obtained from [`allocate`](Self::allocate).
    fn release(&mut self, buffer: Buffer);
}
