// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor tuning.

/// Configuration for the [`Compositor`](crate::Compositor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Maximum number of rotation buffers held during one composite pass.
    pub rotation_pool_capacity: usize,
    /// ARGB color used for worm-hole clears and fresh dim buffers.
    pub clear_color: u32,
}

impl CompositorConfig {
    /// Default configuration for i.MX 6/7/8 G2D engines.
    #[must_use]
    pub const fn imx() -> Self {
        Self {
            rotation_pool_capacity: 64,
            clear_color: 0xff00_0000,
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self::imx()
    }
}
