// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording doubles for the compositor's collaborators.
//!
//! Every double appends what it was asked to do to a shared [`CallLog`], so a
//! test can hand the doubles to a compositor by value and still inspect the
//! exact engine and allocator traffic afterwards, including after the
//! compositor is dropped.
//!
//! - [`RecordingEngine`]: a [`BlitEngine`] with configurable entry points,
//!   feature answers and failure injection.
//! - [`RecordingHelper`]: a [`GpuHelper`] with configurable alignment, flip
//!   offset, tiling and format override.
//! - [`RecordingMemory`]: a [`MemoryManager`] that hands out sequential
//!   physical addresses and tracks live buffers.
//! - [`RecordingSink`]: a [`CompositeSink`] collecting trace events.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use blitcomp_core::buffer::{Buffer, BufferId, MemoryDesc, MemoryManager, PixelFormat, Usage};
use blitcomp_core::engine::{
    BlitEngine, Capability, EntryPoints, Feature, GpuHelper, HwFormat, Surface, Tiling,
};
use blitcomp_core::error::NativeError;
use blitcomp_core::geometry::Rect;
use blitcomp_core::trace::{
    BlitEvent, ClearEvent, CompositeSink, PassStats, RotationBufferEvent,
};

/// First id handed out by [`RecordingMemory`]; ids below are free for
/// hand-built buffers.
pub const FIRST_ALLOCATED_ID: u64 = 1000;

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `GpuHelper::aligned_size`.
    AlignedSize(BufferId),
    /// `GpuHelper::flip_offset`.
    FlipOffset(BufferId),
    /// `GpuHelper::tiling`.
    Tiling(BufferId),
    /// `GpuHelper::alter_format`.
    AlterFormat(BufferId, HwFormat),
    /// `GpuHelper::lock`.
    Lock(BufferId),
    /// `GpuHelper::unlock`.
    Unlock(BufferId),
    /// `BlitEngine::open`.
    Open,
    /// `BlitEngine::close`.
    Close,
    /// `BlitEngine::clear`.
    Clear(Surface),
    /// `BlitEngine::enable`.
    Enable(Capability),
    /// `BlitEngine::disable`.
    Disable(Capability),
    /// `BlitEngine::finish`.
    Finish,
    /// `BlitEngine::query_feature`.
    QueryFeature(Feature),
    /// `BlitEngine::set_clipping`.
    SetClipping(Rect),
    /// `BlitEngine::blit`.
    Blit {
        /// Source surface.
        src: Surface,
        /// Destination surface.
        dst: Surface,
    },
    /// `MemoryManager::allocate`, recorded whether or not it succeeded.
    Allocate(MemoryDesc),
    /// `MemoryManager::release`.
    Release(BufferId),
}

/// Shared, append-only call record.
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Copies out every call recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Forgets every recorded call.
    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Engine-side calls only, in order, with helper and allocator traffic
    /// filtered out.
    #[must_use]
    pub fn engine_calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::Open
                        | Call::Close
                        | Call::Clear(_)
                        | Call::Enable(_)
                        | Call::Disable(_)
                        | Call::Finish
                        | Call::QueryFeature(_)
                        | Call::SetClipping(_)
                        | Call::Blit { .. }
                )
            })
            .cloned()
            .collect()
    }

    /// Every blit as `(src, dst)`.
    #[must_use]
    pub fn blits(&self) -> Vec<(Surface, Surface)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Blit { src, dst } => Some((*src, *dst)),
                _ => None,
            })
            .collect()
    }

    /// Every cleared surface.
    #[must_use]
    pub fn clears(&self) -> Vec<Surface> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Clear(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Every allocation request.
    #[must_use]
    pub fn allocations(&self) -> Vec<MemoryDesc> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Allocate(desc) => Some(*desc),
                _ => None,
            })
            .collect()
    }

    /// Every released buffer id.
    #[must_use]
    pub fn releases(&self) -> Vec<BufferId> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Release(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Number of `enable` plus `disable` calls.
    #[must_use]
    pub fn toggles(&self) -> usize {
        self.count(|c| matches!(c, Call::Enable(_) | Call::Disable(_)))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A [`BlitEngine`] that records every call.
#[derive(Debug)]
pub struct RecordingEngine {
    log: CallLog,
    entry_points: EntryPoints,
    features: Vec<Feature>,
    open_status: Result<(), NativeError>,
    blit_status: Result<(), NativeError>,
}

impl RecordingEngine {
    /// Creates an engine with every entry point resolved.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            entry_points: EntryPoints::ENGINE,
            features: Vec::new(),
            open_status: Ok(()),
            blit_status: Ok(()),
        }
    }

    /// Reports only `entry_points` (engine bits) as resolved.
    #[must_use]
    pub fn with_entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.entry_points = entry_points.intersection(EntryPoints::ENGINE);
        self
    }

    /// Reports `missing` as unresolved.
    #[must_use]
    pub fn without(mut self, missing: EntryPoints) -> Self {
        self.entry_points.remove(missing);
        self
    }

    /// Answers `true` to [`BlitEngine::query_feature`] for these features.
    #[must_use]
    pub fn with_features(mut self, features: &[Feature]) -> Self {
        self.features = features.to_vec();
        self
    }

    /// Makes [`BlitEngine::open`] fail.
    #[must_use]
    pub fn failing_open(mut self, err: NativeError) -> Self {
        self.open_status = Err(err);
        self
    }

    /// Makes every [`BlitEngine::blit`] fail (the call is still recorded).
    #[must_use]
    pub fn failing_blits(mut self, err: NativeError) -> Self {
        self.blit_status = Err(err);
        self
    }
}

impl BlitEngine for RecordingEngine {
    fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    fn open(&mut self) -> Result<(), NativeError> {
        self.log.push(Call::Open);
        self.open_status
    }

    fn close(&mut self) -> Result<(), NativeError> {
        self.log.push(Call::Close);
        Ok(())
    }

    fn clear(&mut self, area: &Surface) -> Result<(), NativeError> {
        self.log.push(Call::Clear(*area));
        Ok(())
    }

    fn enable(&mut self, cap: Capability) -> Result<(), NativeError> {
        self.log.push(Call::Enable(cap));
        Ok(())
    }

    fn disable(&mut self, cap: Capability) -> Result<(), NativeError> {
        self.log.push(Call::Disable(cap));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), NativeError> {
        self.log.push(Call::Finish);
        Ok(())
    }

    fn query_feature(&mut self, feature: Feature) -> Result<bool, NativeError> {
        self.log.push(Call::QueryFeature(feature));
        Ok(self.features.contains(&feature))
    }

    fn set_clipping(&mut self, clip: Rect) -> Result<(), NativeError> {
        self.log.push(Call::SetClipping(clip));
        Ok(())
    }

    fn blit(&mut self, src: &Surface, dst: &Surface) -> Result<(), NativeError> {
        self.log.push(Call::Blit {
            src: *src,
            dst: *dst,
        });
        self.blit_status
    }
}

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

/// A [`GpuHelper`] that records every call.
///
/// By default it reports the buffer's own stride and height as the aligned
/// size, a zero flip offset, linear tiling and no format override.
#[derive(Debug)]
pub struct RecordingHelper {
    log: CallLog,
    entry_points: EntryPoints,
    aligned_height: Option<u32>,
    flip_offset: u64,
    tiling: Tiling,
    format_override: Option<HwFormat>,
}

impl RecordingHelper {
    /// Creates a helper with every entry point resolved.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            entry_points: EntryPoints::HELPER,
            aligned_height: None,
            flip_offset: 0,
            tiling: Tiling::Linear,
            format_override: None,
        }
    }

    /// Reports only `entry_points` (helper bits) as resolved.
    #[must_use]
    pub fn with_entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.entry_points = entry_points.intersection(EntryPoints::HELPER);
        self
    }

    /// Reports this height from [`GpuHelper::aligned_size`].
    #[must_use]
    pub fn with_aligned_height(mut self, height: u32) -> Self {
        self.aligned_height = Some(height);
        self
    }

    /// Reports this offset from [`GpuHelper::flip_offset`].
    #[must_use]
    pub fn with_flip_offset(mut self, offset: u64) -> Self {
        self.flip_offset = offset;
        self
    }

    /// Reports this tiling from [`GpuHelper::tiling`].
    #[must_use]
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Substitutes `format` in [`GpuHelper::alter_format`].
    #[must_use]
    pub fn with_format_override(mut self, format: HwFormat) -> Self {
        self.format_override = Some(format);
        self
    }
}

impl GpuHelper for RecordingHelper {
    fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    fn aligned_size(&mut self, buffer: &Buffer) -> Result<(u32, u32), NativeError> {
        self.log.push(Call::AlignedSize(buffer.id));
        Ok((
            buffer.stride,
            self.aligned_height.unwrap_or(buffer.height),
        ))
    }

    fn flip_offset(&mut self, buffer: &Buffer) -> Result<u64, NativeError> {
        self.log.push(Call::FlipOffset(buffer.id));
        Ok(self.flip_offset)
    }

    fn tiling(&mut self, buffer: &Buffer) -> Result<Tiling, NativeError> {
        self.log.push(Call::Tiling(buffer.id));
        Ok(self.tiling)
    }

    fn alter_format(&mut self, buffer: &Buffer, format: HwFormat) -> HwFormat {
        self.log.push(Call::AlterFormat(buffer.id, format));
        self.format_override.unwrap_or(format)
    }

    fn lock(&mut self, buffer: &Buffer) -> Result<(), NativeError> {
        self.log.push(Call::Lock(buffer.id));
        Ok(())
    }

    fn unlock(&mut self, buffer: &Buffer) -> Result<(), NativeError> {
        self.log.push(Call::Unlock(buffer.id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Allocator
// ---------------------------------------------------------------------------

/// A [`MemoryManager`] handing out fake physically contiguous buffers.
///
/// Strides are rounded up to 16 pixels; physical addresses advance by the
/// page-rounded size of each allocation (4 bytes per pixel).
#[derive(Debug)]
pub struct RecordingMemory {
    log: CallLog,
    next_id: u64,
    next_phys: u64,
    fail_next: Option<NativeError>,
    live: Vec<BufferId>,
}

impl RecordingMemory {
    /// Base physical address of the first allocation.
    pub const BASE_PHYS: u64 = 0x8000_0000;

    /// Creates an allocator recording into `log`.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            next_id: FIRST_ALLOCATED_ID,
            next_phys: Self::BASE_PHYS,
            fail_next: None,
            live: Vec::new(),
        }
    }

    /// Makes the next allocation fail with `err`.
    pub fn fail_next(&mut self, err: NativeError) {
        self.fail_next = Some(err);
    }

    /// Number of buffers allocated and not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl MemoryManager for RecordingMemory {
    fn allocate(&mut self, desc: &MemoryDesc) -> Result<Buffer, NativeError> {
        self.log.push(Call::Allocate(*desc));
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        let stride = desc.width.next_multiple_of(16);
        let size = (u64::from(stride) * u64::from(desc.height) * 4).next_multiple_of(4096);
        let buffer = Buffer {
            id: BufferId(self.next_id),
            width: desc.width,
            height: desc.height,
            stride,
            format: desc.format,
            native_format: desc.native_format,
            phys: self.next_phys,
            usage: desc.usage,
        };
        self.next_id += 1;
        self.next_phys += size;
        self.live.push(buffer.id);
        Ok(buffer)
    }

    fn release(&mut self, buffer: Buffer) {
        self.log.push(Call::Release(buffer.id));
        self.live.retain(|id| *id != buffer.id);
    }
}

// ---------------------------------------------------------------------------
// Trace sink
// ---------------------------------------------------------------------------

/// One trace event captured by [`RecordingSink`].
#[derive(Clone, Copy, Debug)]
pub enum TraceRecord {
    /// [`CompositeSink::on_blit`].
    Blit(BlitEvent),
    /// [`CompositeSink::on_clear`].
    Clear(ClearEvent),
    /// [`CompositeSink::on_rotation_buffer`].
    RotationBuffer(RotationBufferEvent),
    /// [`CompositeSink::on_pass_finished`].
    PassFinished(PassStats),
}

/// A [`CompositeSink`] storing events in a shared list.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    records: Rc<RefCell<Vec<TraceRecord>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out the recorded events.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.borrow().clone()
    }
}

impl CompositeSink for RecordingSink {
    fn on_blit(&mut self, e: &BlitEvent) {
        self.records.borrow_mut().push(TraceRecord::Blit(*e));
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        self.records.borrow_mut().push(TraceRecord::Clear(*e));
    }

    fn on_rotation_buffer(&mut self, e: &RotationBufferEvent) {
        self.records.borrow_mut().push(TraceRecord::RotationBuffer(*e));
    }

    fn on_pass_finished(&mut self, stats: &PassStats) {
        self.records.borrow_mut().push(TraceRecord::PassFinished(*stats));
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A hand-built buffer descriptor with `stride == width`.
///
/// `id` should stay below [`FIRST_ALLOCATED_ID`].
#[must_use]
pub fn buffer(id: u64, width: u32, height: u32, format: PixelFormat) -> Buffer {
    Buffer {
        id: BufferId(id),
        width,
        height,
        stride: width,
        format,
        native_format: 0,
        phys: 0x1000_0000 * (id + 1),
        usage: Usage::TEXTURE | Usage::HW_2D,
    }
}

/// An RGBA framebuffer suitable as a render target.
#[must_use]
pub fn framebuffer(width: u32, height: u32) -> Buffer {
    Buffer {
        usage: Usage::SCANOUT | Usage::COMPOSER | Usage::HW_2D,
        ..buffer(0, width, height, PixelFormat::Rgba8888)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_tracks_live_buffers() {
        let log = CallLog::new();
        let mut memory = RecordingMemory::new(&log);
        let desc = MemoryDesc {
            width: 100,
            height: 10,
            format: PixelFormat::Rgba8888,
            native_format: 1,
            usage: Usage::COMPOSITION,
        };
        let a = memory.allocate(&desc).unwrap();
        let b = memory.allocate(&desc).unwrap();
        assert_eq!(a.stride, 112);
        assert_ne!(a.phys, b.phys);
        assert_eq!(memory.live(), 2);
        memory.release(a);
        assert_eq!(memory.live(), 1);
        assert_eq!(log.releases(), [BufferId(FIRST_ALLOCATED_ID)]);
    }

    #[test]
    fn injected_allocation_failure_is_one_shot() {
        let log = CallLog::new();
        let mut memory = RecordingMemory::new(&log);
        let desc = MemoryDesc {
            width: 8,
            height: 8,
            format: PixelFormat::Rgb565,
            native_format: 4,
            usage: Usage::COMPOSITION,
        };
        memory.fail_next(NativeError::NO_MEMORY);
        assert_eq!(memory.allocate(&desc), Err(NativeError::NO_MEMORY));
        assert!(memory.allocate(&desc).is_ok());
        assert_eq!(log.allocations().len(), 2);
    }

    #[test]
    fn engine_entry_points_are_masked() {
        let log = CallLog::new();
        let engine = RecordingEngine::new(&log).with_entry_points(EntryPoints::all());
        assert_eq!(engine.entry_points(), EntryPoints::ENGINE);
        let engine = engine.without(EntryPoints::BLIT);
        assert!(!engine.entry_points().contains(EntryPoints::BLIT));
    }

    #[test]
    fn log_clones_share_storage() {
        let log = CallLog::new();
        let other = log.clone();
        other.push(Call::Finish);
        assert_eq!(log.snapshot(), [Call::Finish]);
        log.reset();
        assert!(other.snapshot().is_empty());
    }
}
