// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

/// Stops of the standard gradient, evenly spaced over `[0, 1]`.
///
/// The last stop is the end of the table: pure red is reached only at hue 1.0.
const STANDARD_STOPS: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

/// Maps a scalar hue in `[0, 1]` to a colour.
///
/// Hues outside the unit interval are clamped; NaN maps to the first stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorPalette {
    /// black → blue → cyan → green → yellow → red.
    #[default]
    Standard,
    /// black → white.
    Grayscale,
}

impl ColorPalette {
    /// RGB components in `[0, 1]` for `hue`.
    #[must_use]
    pub fn rgb(self, hue: f64) -> [f64; 3] {
        let hue = if hue.is_nan() { 0.0 } else { hue.clamp(0.0, 1.0) };
        match self {
            Self::Grayscale => [hue, hue, hue],
            Self::Standard => {
                let last = STANDARD_STOPS.len() - 1;
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "hue is clamped to [0, 1] so the product is a small non-negative index"
                )]
                let index = ((hue * last as f64) as usize).min(last - 1);
                let lambda = hue * last as f64 - index as f64;
                let (a, b) = (STANDARD_STOPS[index], STANDARD_STOPS[index + 1]);
                [
                    a[0] + (b[0] - a[0]) * lambda,
                    a[1] + (b[1] - a[1]) * lambda,
                    a[2] + (b[2] - a[2]) * lambda,
                ]
            }
        }
    }

    /// Colour for `hue` with the given opacity.
    #[must_use]
    pub fn color(self, hue: f64, alpha: f64) -> Color {
        let [r, g, b] = self.rgb(hue);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "colour components are stored as f32"
        )]
        Color::new([r as f32, g as f32, b as f32, alpha.clamp(0.0, 1.0) as f32])
    }
}
