// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded pool of rotation scratch buffers.
//!
//! Buffers live for one composite pass. Requests are served first-fit in
//! allocation order: the first slot at least as large as the request, in the
//! render target's format, is reused. Otherwise a new slot is allocated until
//! the pool reaches its capacity, after which requests go unserved.

use alloc::vec::Vec;

use blitcomp_core::buffer::{Buffer, MemoryDesc, MemoryManager, Usage};
use blitcomp_core::error::CompositeError;
use blitcomp_core::trace::RotationOutcome;

/// Rotation scratch buffers owned by the compositor.
#[derive(Debug)]
pub struct RotationPool {
    slots: Vec<Buffer>,
    capacity: usize,
    current: Option<usize>,
}

impl RotationPool {
    /// Creates an empty pool holding at most `capacity` buffers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
            current: None,
        }
    }

    /// Designates a buffer of at least `width` × `height` in `target`'s
    /// format as current.
    ///
    /// On [`RotationOutcome::Exhausted`] or an allocation error no buffer is
    /// current afterwards.
    pub fn acquire<M: MemoryManager + ?Sized>(
        &mut self,
        memory: &mut M,
        target: &Buffer,
        width: u32,
        height: u32,
    ) -> Result<RotationOutcome, CompositeError> {
        self.current = None;

        let fit = self.slots.iter().position(|slot| {
            width <= slot.width && height <= slot.height && slot.format == target.format
        });
        if let Some(slot) = fit {
            self.current = Some(slot);
            return Ok(RotationOutcome::Reused { slot });
        }

        if self.slots.len() >= self.capacity {
            return Ok(RotationOutcome::Exhausted);
        }

        let desc = MemoryDesc::matching(target, width, height, Usage::COMPOSITION);
        let buffer = memory.allocate(&desc).map_err(CompositeError::Allocation)?;
        let slot = self.slots.len();
        self.slots.push(buffer);
        self.current = Some(slot);
        Ok(RotationOutcome::Allocated { slot })
    }

    /// The buffer chosen by the last [`acquire`](Self::acquire), if any.
    #[must_use]
    pub fn current(&self) -> Option<&Buffer> {
        self.current.and_then(|slot| self.slots.get(slot))
    }

    /// Hands every buffer back to `memory` and empties the pool.
    ///
    /// Returns the number of buffers released.
    pub fn release_all<M: MemoryManager + ?Sized>(&mut self, memory: &mut M) -> u32 {
        self.current = None;
        let mut released = 0_u32;
        for buffer in self.slots.drain(..) {
            memory.release(buffer);
            released += 1;
        }
        released
    }

    /// Buffers currently held, in allocation order.
    #[must_use]
    pub fn slots(&self) -> &[Buffer] {
        &self.slots
    }

    /// Number of buffers currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no buffers are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of buffers held at once.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
