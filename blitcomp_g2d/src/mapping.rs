// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer transform and blend mode to engine parameters.

use blitcomp_core::engine::{BlendFunc, Rotation};
use blitcomp_core::layer::{BlendMode, Transform};

/// Splits a layer transform into `(source, destination)` engine rotations.
///
/// Pure flips go on the source; rotations go on the destination. A 90 degree
/// rotation combined with one flip uses both. Combinations the engine cannot
/// express map to no rotation at all.
#[must_use]
pub const fn map_transform(transform: Transform) -> (Rotation, Rotation) {
    const ROT_90: u32 = Transform::ROT_90.bits();
    const ROT_180: u32 = Transform::ROT_180.bits();
    const ROT_270: u32 = Transform::ROT_270.bits();
    const FLIP_H: u32 = Transform::FLIP_H.bits();
    const FLIP_V: u32 = Transform::FLIP_V.bits();
    const FLIP_H_ROT_90: u32 = FLIP_H | ROT_90;
    const FLIP_V_ROT_90: u32 = FLIP_V | ROT_90;

    match transform.bits() {
        ROT_90 => (Rotation::Rot0, Rotation::Rot90),
        ROT_180 => (Rotation::Rot0, Rotation::Rot180),
        ROT_270 => (Rotation::Rot0, Rotation::Rot270),
        FLIP_H => (Rotation::FlipH, Rotation::Rot0),
        FLIP_V => (Rotation::FlipV, Rotation::Rot0),
        FLIP_H_ROT_90 => (Rotation::FlipH, Rotation::Rot90),
        FLIP_V_ROT_90 => (Rotation::FlipV, Rotation::Rot90),
        _ => (Rotation::Rot0, Rotation::Rot0),
    }
}

/// Returns the `(source, destination)` blend factors for a blend mode.
///
/// Every mode, including [`BlendMode::None`] and unknown codes, gets a
/// source-over pair; whether blending is actually enabled is decided by the
/// caller.
#[must_use]
pub const fn map_blend(mode: BlendMode) -> (BlendFunc, BlendFunc) {
    match mode {
        BlendMode::Coverage => (BlendFunc::SrcAlpha, BlendFunc::OneMinusSrcAlpha),
        BlendMode::Premultiplied | BlendMode::Dim | BlendMode::None | BlendMode::Other(_) => {
            (BlendFunc::One, BlendFunc::OneMinusSrcAlpha)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_table() {
        let cases = [
            (Transform::IDENTITY, Rotation::Rot0, Rotation::Rot0),
            (Transform::ROT_90, Rotation::Rot0, Rotation::Rot90),
            (Transform::ROT_180, Rotation::Rot0, Rotation::Rot180),
            (Transform::ROT_270, Rotation::Rot0, Rotation::Rot270),
            (Transform::FLIP_H, Rotation::FlipH, Rotation::Rot0),
            (Transform::FLIP_V, Rotation::FlipV, Rotation::Rot0),
            (
                Transform::FLIP_H | Transform::ROT_90,
                Rotation::FlipH,
                Rotation::Rot90,
            ),
            (
                Transform::FLIP_V | Transform::ROT_90,
                Rotation::FlipV,
                Rotation::Rot90,
            ),
        ];
        for (transform, src, dst) in cases {
            assert_eq!(map_transform(transform), (src, dst), "{transform:?}");
        }
    }

    #[test]
    fn unknown_transform_bits_are_ignored() {
        assert_eq!(
            map_transform(Transform::from_raw(0x08)),
            (Rotation::Rot0, Rotation::Rot0)
        );
        assert_eq!(
            map_transform(Transform::from_raw(0x0c)),
            (Rotation::Rot0, Rotation::Rot0),
            "ROT_90 plus an unknown bit is not a 90 degree rotation"
        );
    }

    #[test]
    fn blend_table() {
        let premult = (BlendFunc::One, BlendFunc::OneMinusSrcAlpha);
        assert_eq!(map_blend(BlendMode::Premultiplied), premult);
        assert_eq!(map_blend(BlendMode::Dim), premult);
        assert_eq!(map_blend(BlendMode::None), premult);
        assert_eq!(map_blend(BlendMode::Other(0x42)), premult);
        assert_eq!(
            map_blend(BlendMode::Coverage),
            (BlendFunc::SrcAlpha, BlendFunc::OneMinusSrcAlpha)
        );
    }
}
