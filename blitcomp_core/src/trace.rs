// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation for composite passes.
//!
//! This module provides a [`CompositeSink`] trait with per-event methods that
//! the compositor calls as it issues engine work. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`PassStats`] counters are maintained regardless of the feature and are
//! handed to [`CompositeSink::on_pass_finished`] at the end of each pass.

use alloc::boxed::Box;

use crate::geometry::Rect;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which stage of layer composition issued a blit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlitKind {
    /// Straight source → target blit.
    Direct,
    /// Rotate-only copy of the source into a rotation buffer.
    RotateToScratch,
    /// Blend of a rotation buffer onto the target.
    FromScratch,
}

/// Why a rectangle was filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClearReason {
    /// Target area no opaque layer covers.
    WormHole,
    /// Initial fill of a freshly allocated dim buffer.
    DimBuffer,
}

/// Result of a rotation-buffer request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationOutcome {
    /// An existing pool slot was large enough.
    Reused {
        /// Index of the reused slot.
        slot: usize,
    },
    /// A new buffer was allocated and appended.
    Allocated {
        /// Index of the new slot.
        slot: usize,
    },
    /// Nothing matched and the pool is full.
    Exhausted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every blit handed to the engine.
#[derive(Clone, Copy, Debug)]
pub struct BlitEvent {
    /// Composition stage.
    pub kind: BlitKind,
    /// Destination clip rectangle in effect.
    pub clip: Rect,
    /// Whether blending was enabled for this blit.
    pub blended: bool,
}

/// Emitted for every clear handed to the engine.
#[derive(Clone, Copy, Debug)]
pub struct ClearEvent {
    /// Why the fill happened.
    pub reason: ClearReason,
    /// Rectangle filled.
    pub rect: Rect,
}

/// Emitted for every rotation-buffer request.
#[derive(Clone, Copy, Debug)]
pub struct RotationBufferEvent {
    /// Requested width, after any axis swap.
    pub width: u32,
    /// Requested height, after any axis swap.
    pub height: u32,
    /// What the pool did.
    pub outcome: RotationOutcome,
}

/// Counters for one composite pass, reset by `finish_composite`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Monotonic pass counter.
    pub frame_index: u64,
    /// Layers that reached per-rectangle composition.
    pub layers: u32,
    /// Blits issued, rotate-only copies included.
    pub blits: u32,
    /// Clears issued.
    pub clears: u32,
    /// Rotation buffers allocated.
    pub rotation_allocations: u32,
    /// Rotation requests satisfied by an existing slot.
    pub rotation_reuses: u32,
    /// Visible rectangles dropped (no buffer, pool exhausted, engine error).
    pub skipped_rects: u32,
    /// Rotation buffers released at the end of the pass.
    pub released_rotation_buffers: u32,
}

// ---------------------------------------------------------------------------
// CompositeSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the compositor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait CompositeSink {
    /// Called after a blit is handed to the engine.
    fn on_blit(&mut self, e: &BlitEvent) {
        _ = e;
    }

    /// Called after a clear is handed to the engine.
    fn on_clear(&mut self, e: &ClearEvent) {
        _ = e;
    }

    /// Called after every rotation-buffer request.
    fn on_rotation_buffer(&mut self, e: &RotationBufferEvent) {
        _ = e;
    }

    /// Called once per pass from `finish_composite`.
    fn on_pass_finished(&mut self, stats: &PassStats) {
        _ = stats;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`CompositeSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl CompositeSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`CompositeSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// installed sinks are dropped immediately. When **on**, each method checks
/// the inner `Option` (one branch) before dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn CompositeSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn CompositeSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`BlitEvent`].
    #[inline]
    pub fn blit(&mut self, e: &BlitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_blit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClearEvent`].
    #[inline]
    pub fn clear(&mut self, e: &ClearEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clear(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RotationBufferEvent`].
    #[inline]
    pub fn rotation_buffer(&mut self, e: &RotationBufferEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rotation_buffer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the end-of-pass [`PassStats`].
    #[inline]
    pub fn pass_finished(&mut self, stats: &PassStats) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_finished(stats);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = stats;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    struct CountingSink {
        blits: Rc<Cell<u32>>,
    }

    impl CompositeSink for CountingSink {
        fn on_blit(&mut self, _: &BlitEvent) {
            self.blits.set(self.blits.get() + 1);
        }
    }

    fn sample_blit() -> BlitEvent {
        BlitEvent {
            kind: BlitKind::Direct,
            clip: Rect::new(0, 0, 16, 16),
            blended: false,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_blit(&sample_blit());
        sink.on_clear(&ClearEvent {
            reason: ClearReason::WormHole,
            rect: Rect::new(0, 0, 1, 1),
        });
        sink.on_rotation_buffer(&RotationBufferEvent {
            width: 1,
            height: 1,
            outcome: RotationOutcome::Exhausted,
        });
        sink.on_pass_finished(&PassStats::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.blit(&sample_blit());
        tracer.pass_finished(&PassStats::default());
    }

    #[test]
    fn tracer_dispatch_follows_feature() {
        let blits = Rc::new(Cell::new(0));
        let mut tracer = Tracer::new(Box::new(CountingSink {
            blits: Rc::clone(&blits),
        }));
        tracer.blit(&sample_blit());
        tracer.blit(&sample_blit());
        let expected = if cfg!(feature = "trace") { 2 } else { 0 };
        assert_eq!(blits.get(), expected);
        assert_eq!(tracer.is_active(), cfg!(feature = "trace"));
    }
}
