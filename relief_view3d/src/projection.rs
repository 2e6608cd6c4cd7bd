// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Homogeneous 4x4 matrices in row‑vector convention.
//!
//! A point is the row `[x y z 1]` and maps to `v * M`, so `A * B` applies `A`
//! first. Matrices are stored row‑major: element `(row, col)` lives at index
//! `row * 4 + col`, and the translation occupies row 3.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Three‑component vector used for world positions and directions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    #[must_use]
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        (len > f64::EPSILON).then(|| self * (1.0 / len))
    }

    /// Homogeneous point `[x y z 1]`.
    #[must_use]
    pub fn to_point4(self) -> [f64; 4] {
        [self.x, self.y, self.z, 1.0]
    }

    /// Homogeneous direction `[x y z 0]`, unaffected by translation.
    #[must_use]
    pub fn to_direction4(self) -> [f64; 4] {
        [self.x, self.y, self.z, 0.0]
    }

    /// Drops the fourth component of a homogeneous vector.
    #[must_use]
    pub fn from_xyz(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Rotation axis for [`Mat4::rotation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
    /// An arbitrary axis; normalized before use.
    Custom(Vec3),
}

impl Axis {
    fn direction(self) -> Option<Vec3> {
        match self {
            Self::X => Some(Vec3::new(1.0, 0.0, 0.0)),
            Self::Y => Some(Vec3::new(0.0, 1.0, 0.0)),
            Self::Z => Some(Vec3::new(0.0, 0.0, 1.0)),
            Self::Custom(v) => v.normalize(),
        }
    }
}

/// Orbit angles in degrees.
///
/// The rotation they describe is `Rz(azimuth) * Rx(elevation) * Rz(tilt)`:
/// spin the model about its vertical axis, tip it toward the viewer, then
/// roll the image in the screen plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerAngles {
    /// Rotation about the model z axis.
    pub azimuth: f64,
    /// Rotation about the screen x axis.
    pub elevation: f64,
    /// Rotation about the screen z axis.
    pub tilt: f64,
}

impl EulerAngles {
    /// Creates a new angle triple.
    #[must_use]
    pub const fn new(azimuth: f64, elevation: f64, tilt: f64) -> Self {
        Self {
            azimuth,
            elevation,
            tilt,
        }
    }
}

/// Below this `sin(elevation)` the azimuth and tilt axes coincide.
const GIMBAL_EPSILON: f64 = 1e-9;

/// 4x4 homogeneous matrix, row‑major, row‑vector convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    m: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Wraps 16 row‑major elements.
    #[must_use]
    pub const fn from_row_major(m: [f64; 16]) -> Self {
        Self { m }
    }

    /// The 16 row‑major elements.
    #[must_use]
    pub fn as_array(&self) -> &[f64; 16] {
        &self.m
    }

    /// Element at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    /// Pure translation by `v`.
    #[must_use]
    pub fn translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.translate(v);
        m
    }

    /// Pure diagonal scale.
    #[must_use]
    pub fn scaling(v: [f64; 4]) -> Self {
        let mut m = Self::IDENTITY;
        m.scale(v);
        m
    }

    /// Standard matrix product `a * b`.
    #[must_use]
    pub fn multiply(a: &Self, b: &Self) -> Self {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = (0..4).map(|k| a.m[row * 4 + k] * b.m[k * 4 + col]).sum();
            }
        }
        Self { m: out }
    }

    /// Returns the transposed matrix.
    #[must_use]
    pub fn transpose(mut self) -> Self {
        self.transpose_in_place();
        self
    }

    /// Transposes the matrix in place.
    pub fn transpose_in_place(&mut self) {
        for row in 0..4 {
            for col in row + 1..4 {
                self.m.swap(row * 4 + col, col * 4 + row);
            }
        }
    }

    /// Multiplies columns 0..=2 of every row by `v[0..=2]`.
    ///
    /// This is `self * diag(v0, v1, v2, 1)`: a scale applied after the
    /// existing transform. `v[3]` is ignored.
    pub fn scale(&mut self, v: [f64; 4]) {
        for row in 0..4 {
            for col in 0..3 {
                self.m[row * 4 + col] *= v[col];
            }
        }
    }

    /// Adds `column3 * v[i]` to column `i` of every row.
    ///
    /// This is `self * T(v)`: a translation applied after the existing
    /// transform.
    pub fn translate(&mut self, v: Vec3) {
        let v = [v.x, v.y, v.z];
        for row in 0..4 {
            let w = self.m[row * 4 + 3];
            for col in 0..3 {
                self.m[row * 4 + col] += w * v[col];
            }
        }
    }

    /// Rotation by `angle_degrees` about `axis` (Rodrigues' formula).
    ///
    /// Positive angles turn counter‑clockwise when looking down the axis
    /// toward the origin. A zero custom axis yields the identity.
    #[must_use]
    pub fn rotation(angle_degrees: f64, axis: Axis) -> Self {
        let Some(k) = axis.direction() else {
            return Self::IDENTITY;
        };
        let (s, c) = angle_degrees.to_radians().sin_cos();
        let t = 1.0 - c;
        let k = [k.x, k.y, k.z];
        // Row‑vector form, i.e. the transpose of the column‑vector rotation.
        let cross = [
            [0.0, -k[2], k[1]],
            [k[2], 0.0, -k[0]],
            [-k[1], k[0], 0.0],
        ];
        let mut m = Self::IDENTITY;
        for row in 0..3 {
            for col in 0..3 {
                let delta = if row == col { c } else { 0.0 };
                m.m[row * 4 + col] = delta + t * k[row] * k[col] - s * cross[row][col];
            }
        }
        m
    }

    /// Builds `Rz(azimuth) * Rx(elevation) * Rz(tilt)`.
    #[must_use]
    pub fn from_euler(angles: EulerAngles) -> Self {
        let a = Self::rotation(angles.azimuth, Axis::Z);
        let e = Self::rotation(angles.elevation, Axis::X);
        let t = Self::rotation(angles.tilt, Axis::Z);
        a * e * t
    }

    /// Recovers an angle triple that reproduces this rotation.
    ///
    /// The result has `elevation` in `[0, 180]`. When `sin(elevation)` is
    /// below `1e-9` the azimuth and tilt axes coincide; the whole spin is then
    /// reported as azimuth and `tilt` is `0`. The returned triple rebuilds the
    /// same matrix through [`Mat4::from_euler`], but need not equal the angles
    /// the matrix was made from.
    #[must_use]
    pub fn euler_angles(&self) -> EulerAngles {
        let m = |r, c| self.get(r, c);
        let cos_e = m(2, 2).clamp(-1.0, 1.0);
        let sin_e = m(0, 2).hypot(m(1, 2));
        let elevation = sin_e.atan2(cos_e);
        if sin_e > GIMBAL_EPSILON {
            let azimuth = m(0, 2).atan2(m(1, 2));
            let tilt = m(2, 0).atan2(-m(2, 1));
            EulerAngles::new(azimuth.to_degrees(), elevation.to_degrees(), tilt.to_degrees())
        } else {
            let sign = if cos_e < 0.0 { -1.0 } else { 1.0 };
            let azimuth = (m(0, 1) * sign).atan2(m(0, 0));
            EulerAngles::new(azimuth.to_degrees(), elevation.to_degrees(), 0.0)
        }
    }

    /// Row‑vector product `v * self`.
    #[must_use]
    pub fn transform_row(&self, v: [f64; 4]) -> [f64; 4] {
        vector_matrix_multiply(v, self)
    }

    /// Maps a point through the matrix, dropping `w`.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::from_xyz(self.transform_row(p.to_point4()))
    }

    /// Maps a direction through the matrix, ignoring translation.
    #[must_use]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        Vec3::from_xyz(self.transform_row(d.to_direction4()))
    }
}

impl Mul for Mat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::multiply(&self, &rhs)
    }
}

/// Row‑vector convention: returns `v * m`.
#[must_use]
pub fn vector_matrix_multiply(v: [f64; 4], m: &Mat4) -> [f64; 4] {
    let mut out = [0.0; 4];
    for (col, slot) in out.iter_mut().enumerate() {
        *slot = (0..4).map(|k| v[k] * m.get(k, col)).sum();
    }
    out
}

/// Column‑vector convention: returns `m * v`.
#[must_use]
pub fn matrix_vector_multiply(m: &Mat4, v: [f64; 4]) -> [f64; 4] {
    let mut out = [0.0; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = (0..4).map(|k| m.get(row, k) * v[k]).sum();
    }
    out
}
