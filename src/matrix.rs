/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::err::CmsError;
use crate::mlaf::mlaf;
use num_traits::AsPrimitive;
use std::ops::{Add, Div, Mul, Sub};

/// Tolerance shared by fuzzy vector and matrix comparison.
pub(crate) const COLOR_TOLERANCE: f32 = 1. / 2048.;

/// Matrices with a smaller absolute determinant are treated as singular.
pub(crate) const SINGULAR_DETERMINANT: f32 = 1e-5;

/// Vector math helper
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default)]
pub struct Vector3<T> {
    pub v: [T; 3],
}

/// Working color value flowing through every pipeline stage.
///
/// Holds `x, y, z` for RGB, XYZ or Lab data and uses the fourth lane for the
/// black channel of CMYK data.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default)]
pub struct Vector4<T> {
    pub v: [T; 4],
}

pub type Vector4f = Vector4<f32>;

pub type Vector3f = Vector3<f32>;

#[inline]
fn fuzzy_eq<T: AsPrimitive<f32>>(a: &[T], b: &[T]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&a, &b)| (a.as_() - b.as_()).abs() < COLOR_TOLERANCE)
}

impl<T> PartialEq<Self> for Vector3<T>
where
    T: AsPrimitive<f32>,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        fuzzy_eq(&self.v, &other.v)
    }
}

impl<T> PartialEq<Self> for Vector4<T>
where
    T: AsPrimitive<f32>,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        fuzzy_eq(&self.v, &other.v)
    }
}

impl Vector3f {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { v: [x, y, z] }
    }

    /// All components are finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.v.iter().all(|x| x.is_finite())
    }
}

impl Vector4f {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { v: [x, y, z, w] }
    }

    #[inline]
    pub const fn from_xyz(v: Vector3f) -> Self {
        Self {
            v: [v.v[0], v.v[1], v.v[2], 0.],
        }
    }

    #[inline]
    pub const fn xyz(&self) -> Vector3f {
        Vector3f {
            v: [self.v[0], self.v[1], self.v[2]],
        }
    }

    /// All components are finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.v.iter().all(|x| x.is_finite())
    }

    #[inline]
    pub(crate) fn clamp01(self) -> Self {
        Self {
            v: [
                self.v[0].max(0.).min(1.),
                self.v[1].max(0.).min(1.),
                self.v[2].max(0.).min(1.),
                self.v[3].max(0.).min(1.),
            ],
        }
    }
}

impl Vector4f {
    #[inline(always)]
    fn lanes(self, rhs: Self, op: impl Fn(f32, f32) -> f32) -> Self {
        Self {
            v: [
                op(self.v[0], rhs.v[0]),
                op(self.v[1], rhs.v[1]),
                op(self.v[2], rhs.v[2]),
                op(self.v[3], rhs.v[3]),
            ],
        }
    }
}

impl Mul for Vector4f {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.lanes(rhs, |a, b| a * b)
    }
}

impl Mul<f32> for Vector4f {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.lanes(Self::from(rhs), |a, b| a * b)
    }
}

impl Mul<f32> for Vector3f {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self {
            v: [self.v[0] * rhs, self.v[1] * rhs, self.v[2] * rhs],
        }
    }
}

impl Add for Vector4f {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.lanes(rhs, |a, b| a + b)
    }
}

impl Sub for Vector4f {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.lanes(rhs, |a, b| a - b)
    }
}

/// Splats a scalar over every lane.
impl From<f32> for Vector4f {
    fn from(value: f32) -> Self {
        Self { v: [value; 4] }
    }
}

impl From<f32> for Vector3f {
    fn from(value: f32) -> Self {
        Self { v: [value; 3] }
    }
}

/// 3x3 row-major matrix.
///
/// Matrices mapping RGB to XYZ keep the red, green and blue colorants in
/// columns 0, 1 and 2.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct Matrix3f {
    pub v: [[f32; 3]; 3],
}

impl PartialEq<Self> for Matrix3f {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.test_equality(*other)
    }
}

impl Matrix3f {
    pub const IDENTITY: Matrix3f = Matrix3f {
        v: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn from_columns(r: Vector3f, g: Vector3f, b: Vector3f) -> Self {
        Matrix3f {
            v: [
                [r.v[0], g.v[0], b.v[0]],
                [r.v[1], g.v[1], b.v[1]],
                [r.v[2], g.v[2], b.v[2]],
            ],
        }
    }

    #[inline]
    pub const fn from_scale(scale: Vector3f) -> Self {
        Matrix3f {
            v: [
                [scale.v[0], 0., 0.],
                [0., scale.v[1], 0.],
                [0., 0., scale.v[2]],
            ],
        }
    }

    #[inline]
    pub const fn column(&self, index: usize) -> Vector3f {
        Vector3f {
            v: [self.v[0][index], self.v[1][index], self.v[2][index]],
        }
    }

    #[inline]
    pub fn transpose(&self) -> Matrix3f {
        Matrix3f {
            v: [
                [self.v[0][0], self.v[1][0], self.v[2][0]],
                [self.v[0][1], self.v[1][1], self.v[2][1]],
                [self.v[0][2], self.v[1][2], self.v[2][2]],
            ],
        }
    }

    #[inline]
    pub fn test_equality(&self, other: Matrix3f) -> bool {
        self.v
            .iter()
            .flatten()
            .zip(other.v.iter().flatten())
            .all(|(&a, &b)| (a - b).abs() < COLOR_TOLERANCE)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.test_equality(Matrix3f::IDENTITY)
    }

    /// Determinant, or `None` if it is zero, subnormal or not finite.
    #[inline]
    pub fn determinant(&self) -> Option<f32> {
        let v = self.v;
        let a0 = v[0][0] * v[1][1] * v[2][2];
        let a1 = v[0][1] * v[1][2] * v[2][0];
        let a2 = v[0][2] * v[1][0] * v[2][1];

        let s0 = v[0][2] * v[1][1] * v[2][0];
        let s1 = v[0][1] * v[1][0] * v[2][2];
        let s2 = v[0][0] * v[1][2] * v[2][1];

        let j = a0 + a1 + a2 - s0 - s1 - s2;
        if !j.is_finite() || j.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        Some(j)
    }

    /// Matrix may be inverted.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.determinant().is_some()
    }

    #[inline]
    pub fn inverse(&self) -> Option<Self> {
        let v = self.v;
        let det = 1. / self.determinant()?;
        let a = v[0][0];
        let b = v[0][1];
        let c = v[0][2];
        let d = v[1][0];
        let e = v[1][1];
        let f = v[1][2];
        let g = v[2][0];
        let h = v[2][1];
        let i = v[2][2];

        Some(Matrix3f {
            v: [
                [
                    (e * i - f * h) * det,
                    (c * h - b * i) * det,
                    (b * f - c * e) * det,
                ],
                [
                    (f * g - d * i) * det,
                    (a * i - c * g) * det,
                    (c * d - a * f) * det,
                ],
                [
                    (d * h - e * g) * det,
                    (b * g - a * h) * det,
                    (a * e - b * d) * det,
                ],
            ],
        })
    }

    #[inline]
    pub fn mul_vector(&self, other: Vector3f) -> Vector3f {
        let x = mlaf(
            mlaf(self.v[0][0] * other.v[0], self.v[0][1], other.v[1]),
            self.v[0][2],
            other.v[2],
        );
        let y = mlaf(
            mlaf(self.v[1][0] * other.v[0], self.v[1][1], other.v[1]),
            self.v[1][2],
            other.v[2],
        );
        let z = mlaf(
            mlaf(self.v[2][0] * other.v[0], self.v[2][1], other.v[1]),
            self.v[2][2],
            other.v[2],
        );
        Vector3f { v: [x, y, z] }
    }

    /// Multiplies the first three lanes, the fourth passes through.
    #[inline]
    pub fn mul_vector4(&self, other: Vector4f) -> Vector4f {
        let r = self.mul_vector(other.xyz());
        Vector4f {
            v: [r.v[0], r.v[1], r.v[2], other.v[3]],
        }
    }

    #[inline]
    pub fn mat_mul(&self, other: Matrix3f) -> Self {
        let mut result = Matrix3f::default();

        for i in 0..3 {
            for j in 0..3 {
                result.v[i][j] = mlaf(
                    mlaf(self.v[i][0] * other.v[0][j], self.v[i][1], other.v[1][j]),
                    self.v[i][2],
                    other.v[2][j],
                );
            }
        }

        result
    }
}

/// Holds CIE XYZ representation
#[repr(C)]
#[derive(Clone, Debug, Copy, Default)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PartialEq<Self> for Xyz {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx < COLOR_TOLERANCE && dy < COLOR_TOLERANCE && dz < COLOR_TOLERANCE
    }
}

impl Xyz {
    /// ICC profile connection space illuminant.
    pub const D50: Xyz = Xyz {
        x: 0.9642,
        y: 1.0,
        z: 0.8249,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn to_vector(self) -> Vector3f {
        Vector3f {
            v: [self.x, self.y, self.z],
        }
    }

    #[inline]
    pub const fn from_vector(v: Vector3f) -> Self {
        Self {
            x: v.v[0],
            y: v.v[1],
            z: v.v[2],
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Mul<f32> for Xyz {
    type Output = Xyz;

    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Div<f32> for Xyz {
    type Output = Xyz;

    #[inline]
    fn div(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

/// Holds CIE XyY representation
#[derive(Clone, Debug, Copy, Default)]
pub struct XyY {
    pub x: f32,
    pub y: f32,
    pub yb: f32,
}

impl XyY {
    #[inline]
    pub const fn to_xyz(self) -> Xyz {
        Xyz {
            x: self.x / self.y * self.yb,
            y: self.yb,
            z: (1. - self.x - self.y) / self.y * self.yb,
        }
    }
}

/// CIE 1931 `(x, y)` chromaticity coordinate.
#[derive(Clone, Debug, Copy, Default, PartialEq)]
#[repr(C)]
pub struct Chromaticity {
    pub x: f32,
    pub y: f32,
}

impl Chromaticity {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// XYZ with unit luminance.
    #[inline]
    pub const fn to_xyz(&self) -> Xyz {
        Xyz {
            x: self.x / self.y,
            y: 1f32,
            z: (1f32 - self.x - self.y) / self.y,
        }
    }

    #[inline]
    pub const fn to_xyyb(&self) -> XyY {
        XyY {
            x: self.x,
            y: self.y,
            yb: 1f32,
        }
    }

    /// Lies inside the unit triangle of the chromaticity diagram.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x >= 0. && self.x <= 1. && self.y > 0. && self.y <= 1. && self.x + self.y <= 1.
    }

    pub const D65: Chromaticity = Chromaticity {
        x: 0.3127,
        y: 0.3290,
    };

    pub const D50: Chromaticity = Chromaticity {
        x: 0.34567,
        y: 0.35850,
    };
}

impl TryFrom<Xyz> for Chromaticity {
    type Error = CmsError;

    #[inline]
    fn try_from(xyz: Xyz) -> Result<Self, Self::Error> {
        let sum = xyz.x + xyz.y + xyz.z;

        if sum == 0.0 || !sum.is_finite() {
            return Err(CmsError::DivisionByZero);
        }
        let rec = 1f32 / sum;

        Ok(Chromaticity {
            x: xyz.x * rec,
            y: xyz.y * rec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_matrices_are_invalid() {
        assert!(!Matrix3f::default().is_valid());
        let twin_rows = Matrix3f {
            v: [[0.2, 0.5, 0.1], [0.2, 0.5, 0.1], [0.7, 0.1, 0.3]],
        };
        assert!(!twin_rows.is_valid());
        assert!(twin_rows.inverse().is_none());
        assert!(Matrix3f::IDENTITY.is_valid());
        let nearly_flat = Matrix3f::from_scale(Vector3f::new(1., 1., 1e-6));
        assert!(nearly_flat.determinant().is_none());
        let encoded = Matrix3f::from_scale(Vector3f::from(32768. / 65535.));
        assert!(encoded.is_valid());
    }

    #[test]
    fn test_scale_vector3() {
        let v = Vector3f::new(0.25, -1., 2.) * 2.;
        assert_eq!(v, Vector3f::new(0.5, -2., 4.));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Matrix3f {
            v: [
                [0.4361, 0.3851, 0.1431],
                [0.2225, 0.7169, 0.0606],
                [0.0139, 0.0971, 0.7141],
            ],
        };
        let inv = m.inverse().unwrap();
        assert!(m.mat_mul(inv).is_identity());
        assert!(inv.mat_mul(m).is_identity());
    }

    #[test]
    fn test_columns() {
        let m = Matrix3f::from_columns(
            Vector3f::new(1., 2., 3.),
            Vector3f::new(4., 5., 6.),
            Vector3f::new(7., 8., 9.),
        );
        assert_eq!(m.column(1), Vector3f::new(4., 5., 6.));
        assert_eq!(m.transpose().v[1], [4., 5., 6.]);
        let v = m.mul_vector4(Vector4f::new(1., 0., 0., 0.5));
        assert_eq!(v, Vector4f::new(1., 2., 3., 0.5));
    }

    #[test]
    fn test_vector_validity() {
        assert!(Vector4f::new(0., 1., 2., 3.).is_valid());
        assert!(!Vector4f::new(0., f32::NAN, 2., 3.).is_valid());
        assert!(!Vector3f::new(f32::INFINITY, 0., 0.).is_valid());
    }

    #[test]
    fn test_chromaticity_round_trip() {
        let xyz = Chromaticity::D65.to_xyz();
        let c = Chromaticity::try_from(xyz).unwrap();
        assert!((c.x - Chromaticity::D65.x).abs() < 1e-6);
        assert!((c.y - Chromaticity::D65.y).abs() < 1e-6);
        assert!(!Chromaticity::new(0.8, 0.5).is_valid());
        assert!(!Chromaticity::new(0.3, 0.).is_valid());
    }
}
