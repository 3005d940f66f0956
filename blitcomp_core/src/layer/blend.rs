// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer blend modes.

/// How a layer combines with the pixels beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Opaque copy; the layer fully replaces what is beneath.
    #[default]
    None,
    /// Source-over with premultiplied alpha.
    Premultiplied,
    /// Source-over with non-premultiplied (coverage) alpha.
    Coverage,
    /// Solid dimming layer, premultiplied.
    Dim,
    /// A HAL blend code with no known meaning.
    Other(u32),
}

impl BlendMode {
    /// Decodes a raw HAL blending value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0x0100 => Self::None,
            0x0105 => Self::Premultiplied,
            0x0405 => Self::Coverage,
            0x0805 => Self::Dim,
            other => Self::Other(other),
        }
    }

    /// Returns the raw HAL blending value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::None => 0x0100,
            Self::Premultiplied => 0x0105,
            Self::Coverage => 0x0405,
            Self::Dim => 0x0805,
            Self::Other(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_round_trip() {
        for mode in [
            BlendMode::None,
            BlendMode::Premultiplied,
            BlendMode::Coverage,
            BlendMode::Dim,
        ] {
            assert_eq!(BlendMode::from_raw(mode.raw()), mode);
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        assert_eq!(BlendMode::from_raw(0x0999), BlendMode::Other(0x0999));
        assert_eq!(BlendMode::Other(0x0999).raw(), 0x0999);
    }
}
