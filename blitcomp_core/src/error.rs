// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error and status types.
//!
//! Native entry points report negative errno-style status codes, carried as
//! [`NativeError`]. Compositor operations return [`CompositeError`], which
//! folds back into the same status convention through
//! [`CompositeError::status`].

use core::fmt;

/// `EINVAL`, the status native entry points use for bad or absent input.
pub const EINVAL: i32 = 22;

/// `ENOMEM`, the status allocators use when out of memory.
pub const ENOMEM: i32 = 12;

/// A negative status code returned by a native entry point or allocator.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeError(pub i32);

impl NativeError {
    /// Status for an entry point that is not available.
    pub const UNSUPPORTED: Self = Self(-EINVAL);

    /// Status for an allocator that ran out of memory.
    pub const NO_MEMORY: Self = Self(-ENOMEM);

    /// Returns the raw status code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeError({})", self.0)
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native call failed ({})", self.0)
    }
}

impl core::error::Error for NativeError {}

/// Errors from compositor operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeError {
    /// A required native entry point was not resolved.
    Unsupported,
    /// No render target has been set.
    NoRenderTarget,
    /// The allocator failed to provide a buffer.
    Allocation(NativeError),
    /// A native engine or helper call reported failure.
    Engine(NativeError),
}

impl CompositeError {
    /// Returns the negative errno-style status for HAL callers.
    #[must_use]
    pub const fn status(self) -> i32 {
        match self {
            Self::Unsupported | Self::NoRenderTarget => -EINVAL,
            Self::Allocation(err) | Self::Engine(err) => err.0,
        }
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "native entry point not available"),
            Self::NoRenderTarget => write!(f, "no render target set"),
            Self::Allocation(err) => write!(f, "buffer allocation failed ({})", err.0),
            Self::Engine(err) => write!(f, "engine call failed ({})", err.0),
        }
    }
}

impl core::error::Error for CompositeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Allocation(err) | Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_negative() {
        assert_eq!(CompositeError::Unsupported.status(), -22);
        assert_eq!(CompositeError::NoRenderTarget.status(), -22);
        assert_eq!(
            CompositeError::Allocation(NativeError::NO_MEMORY).status(),
            -12
        );
        assert_eq!(CompositeError::Engine(NativeError(-5)).status(), -5);
    }

    #[test]
    fn allocation_error_exposes_source() {
        use core::error::Error as _;
        let err = CompositeError::Allocation(NativeError::NO_MEMORY);
        assert!(err.source().is_some(), "allocation errors carry the native status");
        assert!(CompositeError::Unsupported.source().is_none());
    }
}
