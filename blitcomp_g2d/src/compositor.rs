// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer compositor.

use alloc::boxed::Box;
use core::fmt;

use blitcomp_core::buffer::{Buffer, MemoryDesc, MemoryManager, Usage};
use blitcomp_core::engine::{
    BlendFunc, BlitEngine, Capability, EntryPoints, Feature, GpuHelper, Rotation, Surface,
};
use blitcomp_core::error::CompositeError;
use blitcomp_core::geometry::{Rect, Region};
use blitcomp_core::layer::{BlendMode, Layer, LayerContent};
use blitcomp_core::trace::{
    BlitEvent, BlitKind, ClearEvent, ClearReason, CompositeSink, PassStats, RotationBufferEvent,
    RotationOutcome, Tracer,
};

use crate::config::CompositorConfig;
use crate::mapping::{map_blend, map_transform};
use crate::pool::RotationPool;
use crate::surface::derive_surface;

/// Returns the union of the visible regions of the layers treated as opaque
/// for worm-hole purposes.
///
/// A layer counts when its blend mode is [`BlendMode::None`], when it is the
/// first entry of the stack and blends premultiplied, or when it is a dim
/// layer above the first entry with full alpha. Invalid layers never count.
#[must_use]
pub fn opaque_region(layers: &[Layer]) -> Region {
    let mut opaque = Region::new();
    for (index, layer) in layers.iter().enumerate() {
        if !layer.valid {
            log::warn!("layer {index} is not valid, ignoring it for worm-hole clearing");
            continue;
        }
        let opaque_dim = index != 0
            && layer.blend_mode == BlendMode::Dim
            && layer.color().is_some_and(|argb| argb >> 24 == 0xff);
        let premultiplied_bottom = index == 0 && layer.blend_mode == BlendMode::Premultiplied;
        if layer.blend_mode == BlendMode::None || premultiplied_bottom || opaque_dim {
            opaque.union(&layer.visible_region);
        }
    }
    opaque
}

/// Composites layer stacks onto a render target with a 2D blit engine.
///
/// Owns the engine handle, the dim buffer used for solid-color layers and the
/// per-pass rotation pool. All three are released when the compositor is
/// dropped.
///
/// A frame looks like:
///
/// ```text
/// set_render_target(Some(fb))
/// clear_worm_hole(&layers)
/// compose_layer(layer, bypass)   // once per layer, back to front
/// finish_composite()
/// ```
pub struct Compositor<H: GpuHelper, E: BlitEngine, M: MemoryManager> {
    helper: H,
    engine: E,
    memory: M,
    config: CompositorConfig,
    opened: bool,
    target: Option<Buffer>,
    dim: Option<Buffer>,
    pool: RotationPool,
    stats: PassStats,
    tracer: Tracer,
}

impl<H: GpuHelper, E: BlitEngine, M: MemoryManager> fmt::Debug for Compositor<H, E, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .field("opened", &self.opened)
            .field("target", &self.target)
            .field("dim", &self.dim)
            .field("pool", &self.pool)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<H: GpuHelper, E: BlitEngine, M: MemoryManager> Compositor<H, E, M> {
    /// Creates a compositor and opens the engine if it can.
    ///
    /// Never fails; a missing or unopenable engine leaves the compositor in a
    /// degraded state reported by [`is_valid`](Self::is_valid).
    pub fn new(helper: H, mut engine: E, memory: M, config: CompositorConfig) -> Self {
        let opened = if engine.entry_points().contains(EntryPoints::OPEN) {
            match engine.open() {
                Ok(()) => true,
                Err(err) => {
                    log::error!("failed to open 2D engine: {err}");
                    false
                }
            }
        } else {
            log::info!("2D engine library not available");
            false
        };
        Self {
            helper,
            engine,
            memory,
            pool: RotationPool::new(config.rotation_pool_capacity),
            config,
            opened,
            target: None,
            dim: None,
            stats: PassStats::default(),
            tracer: Tracer::none(),
        }
    }

    /// Returns `true` if the engine is open and can blit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.opened && self.engine.entry_points().contains(EntryPoints::BLIT)
    }

    /// Installs a sink for trace events.
    ///
    /// Without the `trace` feature the sink is dropped immediately.
    pub fn set_trace_sink(&mut self, sink: Box<dyn CompositeSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Replaces the render target. `None` detaches it.
    pub fn set_render_target(&mut self, target: Option<Buffer>) {
        self.target = target;
    }

    /// The current render target.
    #[must_use]
    pub fn render_target(&self) -> Option<&Buffer> {
        self.target.as_ref()
    }

    /// The dim buffer, if one has been allocated.
    #[must_use]
    pub fn dim_buffer(&self) -> Option<&Buffer> {
        self.dim.as_ref()
    }

    /// The rotation buffer chosen by the last
    /// [`acquire_rotation_buffer`](Self::acquire_rotation_buffer).
    #[must_use]
    pub fn rotation_buffer(&self) -> Option<&Buffer> {
        self.pool.current()
    }

    /// The rotation pool of the current pass.
    #[must_use]
    pub fn rotation_pool(&self) -> &RotationPool {
        &self.pool
    }

    /// Counters of the pass in progress.
    #[must_use]
    pub fn pass_stats(&self) -> &PassStats {
        &self.stats
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The helper.
    #[must_use]
    pub fn helper(&self) -> &H {
        &self.helper
    }

    /// The allocator.
    #[must_use]
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// The allocator, mutably.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Makes sure a dim buffer matching the render target exists.
    ///
    /// A dim buffer whose size or format no longer matches the target is
    /// released and replaced. Fresh buffers are filled with the clear color.
    /// Does nothing without a render target.
    pub fn ensure_dim_buffer(&mut self) -> Result<(), CompositeError> {
        let Some(target) = self.target.as_ref() else {
            return Ok(());
        };
        if let Some(dim) = &self.dim
            && dim.width == target.width
            && dim.height == target.height
            && dim.format == target.format
        {
            return Ok(());
        }

        let desc = MemoryDesc::matching(target, target.width, target.height, Usage::COMPOSITION);
        if let Some(stale) = self.dim.take() {
            log::debug!("render target changed, replacing dim buffer {:?}", stale.id);
            self.memory.release(stale);
        }
        let dim = self
            .memory
            .allocate(&desc)
            .map_err(CompositeError::Allocation)?;

        let full = Rect::from_size(dim.width, dim.height);
        if let Err(err) = self.clear_rect(&dim, full, ClearReason::DimBuffer) {
            log::warn!("could not clear new dim buffer: {err}");
        }
        self.dim = Some(dim);
        Ok(())
    }

    /// Selects a rotation buffer able to hold a `width` × `height` source,
    /// swapping the axes when `transposed`.
    ///
    /// Reuses the first pooled buffer that is large enough and in the
    /// target's format, else allocates one. When the pool is full the call
    /// succeeds and [`rotation_buffer`](Self::rotation_buffer) returns
    /// `None`. Does nothing without a render target.
    pub fn acquire_rotation_buffer(
        &mut self,
        width: u32,
        height: u32,
        transposed: bool,
    ) -> Result<(), CompositeError> {
        let Some(target) = self.target.as_ref() else {
            return Ok(());
        };
        let (width, height) = if transposed {
            (height, width)
        } else {
            (width, height)
        };

        let outcome = self.pool.acquire(&mut self.memory, target, width, height)?;
        match outcome {
            RotationOutcome::Reused { .. } => self.stats.rotation_reuses += 1,
            RotationOutcome::Allocated { slot } => {
                log::debug!("allocated rotation buffer {slot} ({width}x{height})");
                self.stats.rotation_allocations += 1;
            }
            RotationOutcome::Exhausted => {
                log::warn!(
                    "rotation pool full ({} buffers), {width}x{height} request unserved",
                    self.pool.capacity()
                );
            }
        }
        self.tracer.rotation_buffer(&RotationBufferEvent {
            width,
            height,
            outcome,
        });
        Ok(())
    }

    /// Clears every part of the render target no opaque layer covers.
    ///
    /// See [`opaque_region`] for which layers count as opaque. Returns
    /// [`CompositeError::Unsupported`] when the engine cannot clear.
    pub fn clear_worm_hole(&mut self, layers: &[Layer]) -> Result<(), CompositeError> {
        let Some(target) = self.target.clone() else {
            log::error!("clear_worm_hole: no render target");
            return Err(CompositeError::NoRenderTarget);
        };

        let mut hole = Region::from_rect(Rect::from_size(target.width, target.height));
        hole.subtract(&opaque_region(layers));

        if !self.engine.entry_points().contains(EntryPoints::CLEAR) {
            log::debug!("engine cannot clear, leaving worm hole of {} px", hole.area());
            return Err(CompositeError::Unsupported);
        }

        for rect in &hole {
            log::trace!("clearing worm hole {rect:?}");
            if let Err(err) = self.clear_rect(&target, *rect, ClearReason::WormHole) {
                log::error!("worm-hole clear of {rect:?} failed: {err}");
            }
        }
        Ok(())
    }

    /// Composites one layer onto the render target.
    ///
    /// `bypass_blend` skips solid-color layers entirely and composites buffer
    /// layers as opaque copies. Problems with individual visible rectangles
    /// are logged and the rectangle is skipped.
    pub fn compose_layer(&mut self, layer: &Layer, bypass_blend: bool) -> Result<(), CompositeError> {
        let Some(target) = self.target.clone() else {
            log::error!("compose_layer: no render target");
            return Err(CompositeError::NoRenderTarget);
        };
        if !self.is_valid() {
            log::debug!("compose_layer: engine unavailable");
            return Err(CompositeError::Unsupported);
        }
        if bypass_blend && layer.is_solid_color() {
            log::trace!("solid-color layer bypassed");
            return Ok(());
        }

        let frame = layer.display_frame;
        let crop = layer.source_rect();
        if frame.is_empty() || (crop.is_empty() && !layer.is_solid_color()) {
            log::debug!("compose_layer: empty source crop {crop:?} or display frame {frame:?}");
            return Ok(());
        }

        if layer.is_solid_color()
            && let Err(err) = self.ensure_dim_buffer()
        {
            log::error!("dim buffer unavailable: {err}");
        }

        self.stats.layers += 1;
        let (src_rotation, dst_rotation) = map_transform(layer.transform);

        for visible in &layer.visible_region {
            let clip = visible.intersect(frame);
            if clip.is_empty() {
                continue;
            }

            if self.engine.entry_points().contains(EntryPoints::SET_CLIPPING)
                && let Err(err) = self.engine.set_clipping(clip)
            {
                log::warn!("set_clipping({clip:?}) failed: {err}");
            }

            let (source, source_rect) = match &layer.content {
                LayerContent::Buffer(Some(buffer)) => (buffer.clone(), crop),
                LayerContent::Buffer(None) => {
                    log::debug!("layer has no buffer, skipping {clip:?}");
                    self.stats.skipped_rects += 1;
                    continue;
                }
                LayerContent::SolidColor(_) => match &self.dim {
                    Some(dim) => (dim.clone(), frame),
                    None => {
                        self.stats.skipped_rects += 1;
                        continue;
                    }
                },
            };

            let mut src = derive_surface(&mut self.helper, &source, source_rect);
            let mut dst = derive_surface(&mut self.helper, &target, frame);
            src.rotation = src_rotation;
            dst.rotation = dst_rotation;
            log::trace!(
                "compose {clip:?}: src {source_rect:?} {src_rotation:?} -> dst {frame:?} {dst_rotation:?}"
            );

            let result = if dst_rotation == Rotation::Rot0 {
                self.blend_blit(layer, bypass_blend, src, dst, clip, BlitKind::Direct)
            } else {
                self.rotated_blit(layer, bypass_blend, &source, src, dst, clip)
            };
            if let Err(err) = result {
                log::error!("composing {clip:?} failed: {err}");
                self.stats.skipped_rects += 1;
            }
        }
        Ok(())
    }

    /// Ends the composite pass.
    ///
    /// Waits for the engine, releases every rotation buffer and returns the
    /// pass counters. The next pass starts with fresh counters.
    pub fn finish_composite(&mut self) -> PassStats {
        if self.engine.entry_points().contains(EntryPoints::FINISH)
            && let Err(err) = self.engine.finish()
        {
            log::warn!("engine finish failed: {err}");
        }

        self.stats.released_rotation_buffers = self.pool.release_all(&mut self.memory);
        let stats = self.stats;
        self.tracer.pass_finished(&stats);
        log::trace!(
            "pass {}: {} layers, {} blits, {} clears, {} rotation buffers",
            stats.frame_index,
            stats.layers,
            stats.blits,
            stats.clears,
            stats.released_rotation_buffers
        );

        self.stats = PassStats {
            frame_index: stats.frame_index + 1,
            ..PassStats::default()
        };
        stats
    }

    /// Locks `buffer` for engine access through the helper.
    pub fn lock_buffer(&mut self, buffer: &Buffer) -> Result<(), CompositeError> {
        if !self.helper.entry_points().contains(EntryPoints::LOCK) {
            return Err(CompositeError::Unsupported);
        }
        self.helper.lock(buffer).map_err(CompositeError::Engine)
    }

    /// Releases a lock taken with [`lock_buffer`](Self::lock_buffer).
    pub fn unlock_buffer(&mut self, buffer: &Buffer) -> Result<(), CompositeError> {
        if !self.helper.entry_points().contains(EntryPoints::UNLOCK) {
            return Err(CompositeError::Unsupported);
        }
        self.helper.unlock(buffer).map_err(CompositeError::Engine)
    }

    /// Asks the engine whether it supports `feature`.
    ///
    /// `false` when the query is unavailable or fails.
    pub fn is_feature_supported(&mut self, feature: Feature) -> bool {
        if !self.engine.entry_points().contains(EntryPoints::QUERY_FEATURE) {
            return false;
        }
        self.engine.query_feature(feature).unwrap_or_else(|err| {
            log::warn!("query_feature({feature:?}) failed: {err}");
            false
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Rotates the source into a scratch buffer, then blends the scratch
    /// buffer onto the target.
    ///
    /// The engine cannot rotate and blend in one pass, so the first blit
    /// carries only the rotation and the flip moves to the destination of the
    /// second.
    fn rotated_blit(
        &mut self,
        layer: &Layer,
        bypass_blend: bool,
        source: &Buffer,
        mut src: Surface,
        mut dst: Surface,
        clip: Rect,
    ) -> Result<(), CompositeError> {
        let transposed = dst.rotation.swaps_axes();
        self.acquire_rotation_buffer(source.width, source.height, transposed)?;
        let Some(scratch_buffer) = self.pool.current().cloned() else {
            log::error!("no rotation buffer for {clip:?}");
            self.stats.skipped_rects += 1;
            return Ok(());
        };

        let scratch_rect = if transposed {
            src.rect().transposed()
        } else {
            src.rect()
        };
        let mut scratch = derive_surface(&mut self.helper, &scratch_buffer, scratch_rect);
        scratch.rotation = dst.rotation;
        scratch.blend_func = BlendFunc::Zero;
        dst.rotation = src.rotation;
        src.rotation = Rotation::Rot0;
        src.blend_func = BlendFunc::One;
        src.global_alpha = layer.plane_alpha;

        self.blit(&src, &scratch, clip, BlitKind::RotateToScratch, false)?;

        scratch.rotation = Rotation::Rot0;
        self.blend_blit(layer, bypass_blend, scratch, dst, clip, BlitKind::FromScratch)
    }

    /// Issues `src` → `dst` with the layer's blending applied.
    fn blend_blit(
        &mut self,
        layer: &Layer,
        bypass_blend: bool,
        mut src: Surface,
        mut dst: Surface,
        clip: Rect,
        kind: BlitKind,
    ) -> Result<(), CompositeError> {
        if !bypass_blend {
            (src.blend_func, dst.blend_func) = map_blend(layer.blend_mode);
        }
        src.global_alpha = layer.plane_alpha;

        let blended = !bypass_blend && layer.blend_mode != BlendMode::None && self.can_toggle();
        if blended {
            self.set_capability(Capability::GlobalAlpha, true);
            self.set_capability(Capability::Blend, true);
        }
        let result = self.blit(&src, &dst, clip, kind, blended);
        if blended {
            self.set_capability(Capability::Blend, false);
            self.set_capability(Capability::GlobalAlpha, false);
        }
        result
    }

    fn blit(
        &mut self,
        src: &Surface,
        dst: &Surface,
        clip: Rect,
        kind: BlitKind,
        blended: bool,
    ) -> Result<(), CompositeError> {
        if !self.engine.entry_points().contains(EntryPoints::BLIT) {
            return Err(CompositeError::Unsupported);
        }
        self.engine.blit(src, dst).map_err(CompositeError::Engine)?;
        self.stats.blits += 1;
        self.tracer.blit(&BlitEvent {
            kind,
            clip,
            blended,
        });
        Ok(())
    }

    /// Fills `rect` of `buffer` with the configured clear color.
    fn clear_rect(
        &mut self,
        buffer: &Buffer,
        rect: Rect,
        reason: ClearReason,
    ) -> Result<(), CompositeError> {
        if rect.is_empty() {
            return Ok(());
        }
        if !self.engine.entry_points().contains(EntryPoints::CLEAR) {
            return Err(CompositeError::Unsupported);
        }
        let mut surface = derive_surface(&mut self.helper, buffer, rect);
        surface.clear_color = self.config.clear_color;
        self.engine.clear(&surface).map_err(CompositeError::Engine)?;
        self.stats.clears += 1;
        self.tracer.clear(&ClearEvent { reason, rect });
        Ok(())
    }

    fn can_toggle(&self) -> bool {
        self.engine
            .entry_points()
            .contains(EntryPoints::ENABLE | EntryPoints::DISABLE)
    }

    fn set_capability(&mut self, cap: Capability, on: bool) {
        let result = if on {
            self.engine.enable(cap)
        } else {
            self.engine.disable(cap)
        };
        if let Err(err) = result {
            log::warn!("toggling {cap:?} to {on} failed: {err}");
        }
    }
}

impl<H: GpuHelper, E: BlitEngine, M: MemoryManager> Drop for Compositor<H, E, M> {
    fn drop(&mut self) {
        if let Some(dim) = self.dim.take() {
            self.memory.release(dim);
        }
        self.pool.release_all(&mut self.memory);
        if self.opened
            && self.engine.entry_points().contains(EntryPoints::CLOSE)
            && let Err(err) = self.engine.close()
        {
            log::warn!("failed to close 2D engine: {err}");
        }
    }
}
