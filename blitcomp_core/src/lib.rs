// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for compositing display layers on a fixed-function 2D engine.
//!
//! `blitcomp_core` is the vocabulary shared by the compositor, engine
//! backends, and test doubles. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Layer stack (back-to-front)
//!       │
//!       ▼
//!   Compositor ──► GpuHelper   (alignment, tiling, flip offset, format hooks)
//!       │     ──► BlitEngine  (clip, blend, clear, blit, finish)
//!       │     ──► MemoryManager (dim and rotation scratch buffers)
//!       ▼
//!   Render target buffer
//! ```
//!
//! **[`geometry`]**: Integer [`Rect`](geometry::Rect) and disjoint-rectangle
//! [`Region`](geometry::Region) with union and subtraction.
//!
//! **[`layer`]**: The per-frame [`Layer`](layer::Layer) description:
//! crop, frame, visible region, transform, blend mode, plane alpha.
//!
//! **[`buffer`]**: [`Buffer`](buffer::Buffer) descriptors, abstract pixel
//! formats and the [`MemoryManager`](buffer::MemoryManager) contract.
//!
//! **[`engine`]**: The hardware surface descriptor and the capability
//! traits resolved from the vendor libraries.
//!
//! **[`error`]**: Native status codes and [`CompositeError`](error::CompositeError).
//!
//! **[`trace`]**: [`CompositeSink`](trace::CompositeSink) instrumentation
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod buffer;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod trace;
