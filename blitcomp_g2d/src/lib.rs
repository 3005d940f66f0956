// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer compositor for i.MX-class G2D blit engines.
//!
//! [`Compositor`] drives a [`BlitEngine`](blitcomp_core::engine::BlitEngine)
//! through one composite pass per frame:
//!
//! 1. [`set_render_target`](Compositor::set_render_target) selects the
//!    framebuffer.
//! 2. [`clear_worm_hole`](Compositor::clear_worm_hole) clears whatever no
//!    opaque layer covers.
//! 3. [`compose_layer`](Compositor::compose_layer) is called once per layer,
//!    back to front. Each visible rectangle becomes one blit, or two when the
//!    layer is rotated: the engine's rotation unit cannot blend, so the
//!    source is first rotated into a pooled scratch buffer and then blended
//!    from there.
//! 4. [`finish_composite`](Compositor::finish_composite) drains the engine
//!    and returns the pool's buffers to the allocator.
//!
//! Solid-color layers are rendered from a dim buffer the compositor keeps in
//! the target's size and format.
//!
//! Engine entry points that the platform could not resolve are never called;
//! the operations that need them return
//! [`CompositeError::Unsupported`](blitcomp_core::error::CompositeError::Unsupported)
//! or skip the work, as documented on each method.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Forwards engine activity to a
//!   [`CompositeSink`](blitcomp_core::trace::CompositeSink) installed with
//!   [`Compositor::set_trace_sink`].

#![no_std]

extern crate alloc;

mod compositor;
mod config;
mod mapping;
mod pool;
mod surface;

pub use compositor::{Compositor, opaque_region};
pub use config::CompositorConfig;
pub use mapping::{map_blend, map_transform};
pub use pool::RotationPool;
pub use surface::{CHROMA_STRIDE_ALIGN, chroma_stride, derive_surface, hardware_format};
