// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the compositor and the vendor 2D libraries.
//!
//! The vendor stack ships two libraries, either of which may be missing or
//! incomplete on a given device:
//!
//! - a **helper** library answering buffer metadata queries (alignment,
//!   tiling, flip offset, format adjustment, locking), modelled by
//!   [`GpuHelper`];
//! - an **engine** library with the blit primitives, modelled by
//!   [`BlitEngine`].
//!
//! A platform loader resolves the symbols once and reports what it found via
//! [`entry_points`](BlitEngine::entry_points). The compositor never calls an
//! entry point that is reported absent; every default method body returns
//! [`NativeError::UNSUPPORTED`] so an implementation only needs to provide
//! what it resolved. [`Unavailable`] stands in for a library that did not
//! load at all.

mod surface;

pub use surface::{BlendFunc, Capability, Feature, HwFormat, Rotation, Surface, Tiling};

use bitflags::bitflags;

use crate::buffer::Buffer;
use crate::error::NativeError;
use crate::geometry::Rect;

bitflags! {
    /// Entry points a loader managed to resolve.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EntryPoints: u32 {
        /// Helper: aligned buffer size query.
        const ALIGNED_SIZE = 1 << 0;
        /// Helper: flip offset query.
        const FLIP_OFFSET = 1 << 1;
        /// Helper: tiling query.
        const TILING = 1 << 2;
        /// Helper: format adjustment hook.
        const ALTER_FORMAT = 1 << 3;
        /// Helper: buffer lock.
        const LOCK = 1 << 4;
        /// Helper: buffer unlock.
        const UNLOCK = 1 << 5;

        /// Engine: open a handle.
        const OPEN = 1 << 8;
        /// Engine: close the handle.
        const CLOSE = 1 << 9;
        /// Engine: fill a surface rectangle.
        const CLEAR = 1 << 10;
        /// Engine: enable a capability.
        const ENABLE = 1 << 11;
        /// Engine: disable a capability.
        const DISABLE = 1 << 12;
        /// Engine: wait for queued work.
        const FINISH = 1 << 13;
        /// Engine: feature query.
        const QUERY_FEATURE = 1 << 14;
        /// Engine: set the clip rectangle.
        const SET_CLIPPING = 1 << 15;
        /// Engine: blit between surfaces.
        const BLIT = 1 << 16;
    }
}

impl EntryPoints {
    /// Every helper entry point.
    pub const HELPER: Self = Self::ALIGNED_SIZE
        .union(Self::FLIP_OFFSET)
        .union(Self::TILING)
        .union(Self::ALTER_FORMAT)
        .union(Self::LOCK)
        .union(Self::UNLOCK);

    /// Every engine entry point.
    pub const ENGINE: Self = Self::OPEN
        .union(Self::CLOSE)
        .union(Self::CLEAR)
        .union(Self::ENABLE)
        .union(Self::DISABLE)
        .union(Self::FINISH)
        .union(Self::QUERY_FEATURE)
        .union(Self::SET_CLIPPING)
        .union(Self::BLIT);
}

/// Buffer metadata queries from the vendor helper library.
pub trait GpuHelper {
    /// Which helper entry points are available.
    fn entry_points(&self) -> EntryPoints;

    /// Returns the allocation-aligned `(width, height)` of a buffer.
    fn aligned_size(&mut self, buffer: &Buffer) -> Result<(u32, u32), NativeError> {
        _ = buffer;
        Err(NativeError::UNSUPPORTED)
    }

    /// Returns the byte offset of the currently displayed page in a
    /// multi-page buffer.
    fn flip_offset(&mut self, buffer: &Buffer) -> Result<u64, NativeError> {
        _ = buffer;
        Err(NativeError::UNSUPPORTED)
    }

    /// Returns the memory tiling of a buffer.
    fn tiling(&mut self, buffer: &Buffer) -> Result<Tiling, NativeError> {
        _ = buffer;
        Err(NativeError::UNSUPPORTED)
    }

    /// Lets the platform substitute a hardware format for a buffer.
    fn alter_format(&mut self, buffer: &Buffer, format: HwFormat) -> HwFormat {
        _ = buffer;
        format
    }

    /// Locks a buffer for engine access.
    fn lock(&mut self, buffer: &Buffer) -> Result<(), NativeError> {
        _ = buffer;
        Err(NativeError::UNSUPPORTED)
    }

    /// Releases a lock taken with [`lock`](Self::lock).
    fn unlock(&mut self, buffer: &Buffer) -> Result<(), NativeError> {
        _ = buffer;
        Err(NativeError::UNSUPPORTED)
    }
}

/// Blit primitives from the vendor engine library.
///
/// Calls are synchronous from the caller's point of view: each is complete
/// or queued when it returns, and [`finish`](Self::finish) drains the queue.
pub trait BlitEngine {
    /// Which engine entry points are available.
    fn entry_points(&self) -> EntryPoints;

    /// Opens the engine handle.
    fn open(&mut self) -> Result<(), NativeError> {
        Err(NativeError::UNSUPPORTED)
    }

    /// Closes the engine handle.
    fn close(&mut self) -> Result<(), NativeError> {
        Err(NativeError::UNSUPPORTED)
    }

    /// Fills the surface's rectangle with its clear color.
    fn clear(&mut self, area: &Surface) -> Result<(), NativeError> {
        _ = area;
        Err(NativeError::UNSUPPORTED)
    }

    /// Turns on a capability.
    fn enable(&mut self, cap: Capability) -> Result<(), NativeError> {
        _ = cap;
        Err(NativeError::UNSUPPORTED)
    }

    /// Turns off a capability.
    fn disable(&mut self, cap: Capability) -> Result<(), NativeError> {
        _ = cap;
        Err(NativeError::UNSUPPORTED)
    }

    /// Blocks until all queued operations complete.
    fn finish(&mut self) -> Result<(), NativeError> {
        Err(NativeError::UNSUPPORTED)
    }

    /// Reports whether a feature is supported.
    fn query_feature(&mut self, feature: Feature) -> Result<bool, NativeError> {
        _ = feature;
        Err(NativeError::UNSUPPORTED)
    }

    /// Restricts subsequent blits to `clip` on the destination.
    fn set_clipping(&mut self, clip: Rect) -> Result<(), NativeError> {
        _ = clip;
        Err(NativeError::UNSUPPORTED)
    }

    /// Copies (and optionally rotates and blends) `src` onto `dst`.
    fn blit(&mut self, src: &Surface, dst: &Surface) -> Result<(), NativeError> {
        _ = (src, dst);
        Err(NativeError::UNSUPPORTED)
    }
}

/// A library that failed to load. Reports no entry points.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

impl GpuHelper for Unavailable {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::empty()
    }
}

impl BlitEngine for Unavailable {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::empty()
    }
}
