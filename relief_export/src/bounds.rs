// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned rectangle helpers used to size and crop exports.

use kurbo::Rect;

/// Smallest rectangle containing every input rectangle.
///
/// Returns `None` for an empty iterator.
pub fn union_bounds(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|a, b| a.union(b))
}

/// Clips `rect` to `crop` on the integer pixel grid.
///
/// Both rectangles are treated as covering whole pixels: a rectangle at `x0`
/// with width `w` spans the pixels `x0..=x0 + w - 1`. The result keeps that
/// convention, and collapses to zero width or height where the pixel spans
/// do not overlap.
#[must_use]
pub fn crop(rect: Rect, crop: Rect) -> Rect {
    let (x0, x1) = crop_span(rect.x0, rect.width(), crop.x0, crop.width());
    let (y0, y1) = crop_span(rect.y0, rect.height(), crop.y0, crop.height());
    Rect::new(x0, y0, x1, y1)
}

fn crop_span(start: f64, len: f64, crop_start: f64, crop_len: f64) -> (f64, f64) {
    let first = start.max(crop_start);
    let mut last = start + len - 1.0;
    if last >= crop_start + crop_len {
        last = crop_start + crop_len - 1.0;
    }
    if first < last {
        (first, last + 1.0)
    } else {
        (first, first)
    }
}
