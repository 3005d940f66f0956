// Copyright 2026 the Blitcomp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles and rectangle sets in buffer pixel space.
//!
//! The 2D engine addresses pixels with inclusive-exclusive integer edges, so
//! these types use `i32` edges rather than [`kurbo`]'s floating-point
//! rectangles. Conversions to and from [`kurbo::Rect`] are provided for
//! fractional source crops.

use alloc::vec::Vec;
use core::fmt;

/// An axis-aligned rectangle with `left <= x < right`, `top <= y < bottom`.
///
/// A rectangle whose right edge is not past its left edge (or bottom not past
/// top) is empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its four edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle at the origin with the given size.
    ///
    /// Sizes beyond `i32::MAX` saturate.
    #[inline]
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Rounds a fractional rectangle to the nearest pixel edges.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "crop edges are pixel coordinates well inside the i32 range"
    )]
    pub fn from_kurbo(rect: kurbo::Rect) -> Self {
        let rect = rect.round();
        Self::new(
            rect.x0 as i32,
            rect.y0 as i32,
            rect.x1 as i32,
            rect.y1 as i32,
        )
    }

    /// Width in pixels (0 when empty, `i32::MAX` at most).
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        if self.right > self.left {
            self.right.saturating_sub(self.left)
        } else {
            0
        }
    }

    /// Height in pixels (0 when empty).
    #[inline]
    #[must_use]
    pub const fn height(self) -> i32 {
        if self.bottom > self.top {
            self.bottom.saturating_sub(self.top)
        } else {
            0
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Returns the overlap of two rectangles, or [`Rect::EMPTY`].
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let r = Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Swaps the horizontal and vertical axes.
    ///
    /// Used to describe a source rectangle in the coordinate space of a
    /// buffer that holds it rotated by 90 or 270 degrees.
    #[inline]
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self::new(self.top, self.left, self.bottom, self.right)
    }

    /// Returns the parts of `self` not covered by `other`.
    ///
    /// Produces at most four disjoint, non-empty pieces: a full-width band
    /// above and below the overlap, and the strips left and right of it.
    pub fn difference(self, other: Self) -> impl Iterator<Item = Self> {
        let overlap = self.intersect(other);
        let pieces = if overlap.is_empty() {
            [self, Self::EMPTY, Self::EMPTY, Self::EMPTY]
        } else {
            [
                Self::new(self.left, self.top, self.right, overlap.top),
                Self::new(self.left, overlap.bottom, self.right, self.bottom),
                Self::new(self.left, overlap.top, overlap.left, overlap.bottom),
                Self::new(overlap.right, overlap.top, self.right, overlap.bottom),
            ]
        };
        pieces.into_iter().filter(|r| !r.is_empty())
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect(l:{},t:{},r:{},b:{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl From<Rect> for kurbo::Rect {
    fn from(r: Rect) -> Self {
        Self::new(
            f64::from(r.left),
            f64::from(r.top),
            f64::from(r.right),
            f64::from(r.bottom),
        )
    }
}

/// A set of pixels stored as disjoint, non-empty rectangles.
///
/// Rectangle order follows insertion order; operations never produce
/// overlapping rectangles, so iterating the set touches every pixel exactly
/// once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(rect);
        region
    }

    /// Returns `true` if the region covers no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The disjoint rectangles making up the region.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Iterates over the disjoint rectangles.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Rect> {
        self.rects.iter()
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    /// Smallest rectangle containing the region, or [`Rect::EMPTY`].
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let mut iter = self.rects.iter();
        let Some(first) = iter.next() else {
            return Rect::EMPTY;
        };
        iter.fold(*first, |acc, r| {
            Rect::new(
                acc.left.min(r.left),
                acc.top.min(r.top),
                acc.right.max(r.right),
                acc.bottom.max(r.bottom),
            )
        })
    }

    /// Adds a rectangle to the region.
    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut pieces = alloc::vec![rect];
        for existing in &self.rects {
            pieces = pieces
                .into_iter()
                .flat_map(|p| p.difference(*existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    /// Adds every pixel of `other` to the region.
    pub fn union(&mut self, other: &Self) {
        for rect in &other.rects {
            self.union_rect(*rect);
        }
    }

    /// Removes a rectangle from the region.
    pub fn subtract_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects = self
            .rects
            .iter()
            .flat_map(|r| r.difference(rect))
            .collect();
    }

    /// Removes every pixel of `other` from the region.
    pub fn subtract(&mut self, other: &Self) {
        for rect in &other.rects {
            if self.is_empty() {
                return;
            }
            self.subtract_rect(*rect);
        }
    }

    /// Returns the part of the region inside `rect`.
    #[must_use]
    pub fn intersect_rect(&self, rect: Rect) -> Self {
        Self {
            rects: self
                .rects
                .iter()
                .map(|r| r.intersect(rect))
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Self::new();
        for rect in iter {
            region.union_rect(rect);
        }
        region
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Rect;
    type IntoIter = core::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}
