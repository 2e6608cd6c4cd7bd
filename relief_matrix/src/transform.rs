// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;

use crate::Matrix;

bitflags! {
    /// Display transforms applied to a matrix before mesh generation.
    ///
    /// [`Matrix::apply_transforms`] runs the enabled passes in a fixed order:
    /// permute, alternate signs (honouring `SHIFT`), absolute value, signum,
    /// log scale. `SHIFT` has no effect without `ALTERNATE_SIGNS`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MatrixTransforms: u8 {
        /// Group even rows/columns before odd ones, see [`Matrix::permute`].
        const PERMUTE = 1 << 0;
        /// Multiply cells by `(-1)^(row + column)`.
        const ALTERNATE_SIGNS = 1 << 1;
        /// Flip the checkerboard used by `ALTERNATE_SIGNS`.
        const SHIFT = 1 << 2;
        /// Replace every value with its magnitude.
        const ABSOLUTE = 1 << 3;
        /// Replace every value with its sign.
        const SIGNUM = 1 << 4;
        /// Compress magnitudes logarithmically, see [`Matrix::log_scale`].
        const LOG_SCALE = 1 << 5;
    }
}

impl Matrix {
    /// Applies the enabled transforms in their fixed order.
    pub fn apply_transforms(&mut self, transforms: MatrixTransforms) {
        if transforms.contains(MatrixTransforms::PERMUTE) {
            self.permute();
        }
        if transforms.contains(MatrixTransforms::ALTERNATE_SIGNS) {
            self.alternate_signs(transforms.contains(MatrixTransforms::SHIFT));
        }
        if transforms.contains(MatrixTransforms::ABSOLUTE) {
            self.absolute();
        }
        if transforms.contains(MatrixTransforms::SIGNUM) {
            self.signum();
        }
        if transforms.contains(MatrixTransforms::LOG_SCALE) {
            self.log_scale();
        }
    }

    /// Reorders cells into the block layout
    ///
    /// ```text
    /// [ c(2i, 2j)   | c(2i, 2j+1)   ]
    /// [ c(2i+1, 2j) | c(2i+1, 2j+1) ]
    /// ```
    ///
    /// Even rows move to the top half and odd rows to the bottom half; columns
    /// are split the same way.
    pub fn permute(&mut self) {
        self.update_values(|rows, columns, values| {
            let source = values.to_vec();
            let row_offset = rows.div_ceil(2);
            let column_offset = columns.div_ceil(2);
            for row in 0..rows {
                let target_row = row / 2 + if row % 2 == 1 { row_offset } else { 0 };
                for column in 0..columns {
                    let target_column =
                        column / 2 + if column % 2 == 1 { column_offset } else { 0 };
                    values[target_row * columns + target_column] = source[row * columns + column];
                }
            }
        });
    }

    /// Negates every cell where `row + column` is odd, or even when `shift`
    /// is set.
    pub fn alternate_signs(&mut self, shift: bool) {
        let parity = usize::from(!shift);
        self.update_values(|_, columns, values| {
            for (i, value) in values.iter_mut().enumerate() {
                let (row, column) = (i / columns, i % columns);
                if (row + column) % 2 == parity {
                    *value = -*value;
                }
            }
        });
    }

    /// Maps every value to `sign(v) * ln(1 + |v|)`.
    ///
    /// The transform is odd and monotonic, so zero stays zero and ordering is
    /// preserved for data of either sign.
    pub fn log_scale(&mut self) {
        self.update_values(|_, _, values| {
            for value in values.iter_mut() {
                *value = value.signum() * value.abs().ln_1p();
            }
        });
    }

    /// Replaces every value with its magnitude.
    pub fn absolute(&mut self) {
        self.update_values(|_, _, values| {
            for value in values.iter_mut() {
                *value = value.abs();
            }
        });
    }

    /// Replaces every value with `-1`, `0` or `1`.
    pub fn signum(&mut self) {
        self.update_values(|_, _, values| {
            for value in values.iter_mut() {
                *value = if *value == 0.0 { 0.0 } else { value.signum() };
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, columns: usize) -> Matrix {
        Matrix::from_fn(rows, columns, |r, c| (r * 10 + c) as f64)
    }

    #[test]
    fn permute_groups_even_before_odd() {
        let mut m = grid(3, 4);
        m.permute();
        assert_eq!(m.row(0), Some(&[0.0, 2.0, 1.0, 3.0][..]));
        assert_eq!(m.row(1), Some(&[20.0, 22.0, 21.0, 23.0][..]));
        assert_eq!(m.row(2), Some(&[10.0, 12.0, 11.0, 13.0][..]));
    }

    #[test]
    fn alternate_signs_follows_checkerboard() {
        let mut m = Matrix::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        m.alternate_signs(false);
        assert_eq!(m.values(), &[1.0, -1.0, -1.0, 1.0]);

        let mut shifted = Matrix::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        shifted.alternate_signs(true);
        assert_eq!(shifted.values(), &[-1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn log_scale_of_one_is_ln_two() {
        let mut m = Matrix::from_vec(1, 3, vec![1.0, 0.0, -1.0]).unwrap();
        m.log_scale();
        let ln2 = 2.0_f64.ln();
        assert!((m.values()[0] - ln2).abs() < 1e-12);
        assert_eq!(m.values()[1], 0.0);
        assert!((m.values()[2] + ln2).abs() < 1e-12);
    }

    #[test]
    fn absolute_and_signum() {
        let mut m = Matrix::from_vec(1, 3, vec![-2.5, 0.0, 4.0]).unwrap();
        m.absolute();
        assert_eq!(m.values(), &[2.5, 0.0, 4.0]);

        let mut s = Matrix::from_vec(1, 3, vec![-2.5, 0.0, 4.0]).unwrap();
        s.signum();
        assert_eq!(s.values(), &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn transforms_run_in_fixed_order() {
        let mut m = Matrix::from_vec(1, 2, vec![1.0, 1.0]).unwrap();
        m.apply_transforms(MatrixTransforms::ALTERNATE_SIGNS | MatrixTransforms::ABSOLUTE);
        assert_eq!(m.values(), &[1.0, 1.0]);

        let mut shift_only = Matrix::from_vec(1, 2, vec![1.0, 2.0]).unwrap();
        let revision = shift_only.revision();
        shift_only.apply_transforms(MatrixTransforms::SHIFT);
        assert_eq!(shift_only.values(), &[1.0, 2.0]);
        assert_eq!(shift_only.revision(), revision);
    }

    #[test]
    fn end_to_end_parse_then_log_scale() {
        let mut m = crate::parse_matrices("1 2\n3 4\n").remove(0);
        m.apply_transforms(MatrixTransforms::LOG_SCALE);
        assert!((m.get(0, 0).unwrap() - 2.0_f64.ln()).abs() < 1e-12);
    }
}
