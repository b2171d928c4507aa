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
use crate::err::{CmsError, MalformedSize};
use crate::matrix::Vector4f;
use crate::safe_math::SafeMul;
use std::ops::{Add, Mul, Sub};

#[inline]
pub(crate) fn lerp<T: Mul<Output = T> + Sub<Output = T> + Add<Output = T> + From<f32> + Copy>(
    a: T,
    b: T,
    t: T,
) -> T {
    a * (T::from(1.0) - t) + b * t
}

/// Multidimensional color lookup table.
///
/// Holds one [Vector4f] per grid cell, the first input channel varies slowest
/// exactly as ICC stores CLUT data. Output channels beyond
/// [ColorClut::output_channels] are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorClut {
    grid: Vec<u8>,
    output_channels: usize,
    table: Vec<Vector4f>,
}

impl ColorClut {
    /// Builds a table from `grid` points per input axis.
    ///
    /// Requires between 1 and 4 input axes of at least 2 points each, 1 to 4
    /// output channels and exactly one entry per cell.
    pub fn new(
        grid: Vec<u8>,
        output_channels: usize,
        table: Vec<Vector4f>,
    ) -> Result<ColorClut, CmsError> {
        if grid.is_empty() || grid.len() > 4 {
            return Err(CmsError::InvalidChannelCount(grid.len() as u8));
        }
        if output_channels == 0 || output_channels > 4 {
            return Err(CmsError::InvalidChannelCount(output_channels as u8));
        }
        if grid.iter().any(|&g| g < 2) {
            return Err(CmsError::InvalidLutShape);
        }
        let expected = Self::cells(&grid)?;
        if table.len() != expected {
            return Err(CmsError::MalformedClut(MalformedSize {
                size: table.len(),
                expected,
            }));
        }
        Ok(ColorClut {
            grid,
            output_channels,
            table,
        })
    }

    /// Samples `f` at every grid point.
    pub fn from_fn(
        grid: Vec<u8>,
        output_channels: usize,
        f: impl Fn(&[f32]) -> Vector4f,
    ) -> Result<ColorClut, CmsError> {
        if grid.is_empty() || grid.len() > 4 || grid.iter().any(|&g| g < 2) {
            return Err(CmsError::InvalidLutShape);
        }
        let cells = Self::cells(&grid)?;
        let mut table = Vec::with_capacity(cells);
        let mut coordinates = vec![0f32; grid.len()];
        for cell in 0..cells {
            let mut rest = cell;
            for (axis, &points) in grid.iter().enumerate().rev() {
                let points = points as usize;
                coordinates[axis] = (rest % points) as f32 / (points - 1) as f32;
                rest /= points;
            }
            table.push(f(&coordinates));
        }
        ColorClut::new(grid, output_channels, table)
    }

    pub(crate) fn cells(grid: &[u8]) -> Result<usize, CmsError> {
        grid.iter()
            .try_fold(1usize, |acc, &g| acc.safe_mul(g as usize))
    }

    #[inline]
    pub fn grid(&self) -> &[u8] {
        &self.grid
    }

    #[inline]
    pub fn input_channels(&self) -> usize {
        self.grid.len()
    }

    #[inline]
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    #[inline]
    pub fn table(&self) -> &[Vector4f] {
        &self.table
    }

    /// Same number of points on every axis, as lut8 and lut16 require.
    pub fn is_uniform(&self) -> bool {
        self.grid.windows(2).all(|w| w[0] == w[1])
    }

    /// Multilinear interpolation, inputs are clamped to `[0, 1]`.
    pub fn apply(&self, v: Vector4f) -> Vector4f {
        match self.grid.len() {
            3 => self.trilinear(v.v[0], v.v[1], v.v[2]),
            4 => {
                let (w, w_n, w_d) = self.axis(3, v.v[3]);
                let c0 = self.trilinear_at(v.v[0], v.v[1], v.v[2], w, 4);
                if w_n == w {
                    return c0;
                }
                let c1 = self.trilinear_at(v.v[0], v.v[1], v.v[2], w_n, 4);
                lerp(c0, c1, Vector4f::from(w_d))
            }
            _ => self.multilinear(v),
        }
    }

    #[inline]
    fn axis(&self, axis: usize, value: f32) -> (usize, usize, f32) {
        let last = self.grid[axis] as usize - 1;
        let pos = value.max(0.).min(1.) * last as f32;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        (lo, hi, pos - lo as f32)
    }

    #[inline]
    fn trilinear(&self, x: f32, y: f32, z: f32) -> Vector4f {
        self.trilinear_at(x, y, z, 0, 3)
    }

    /// Trilinear interpolation over the first three axes with the fourth fixed at `w`.
    fn trilinear_at(&self, lin_x: f32, lin_y: f32, lin_z: f32, w: usize, dims: usize) -> Vector4f {
        let (x, x_n, x_d) = self.axis(0, lin_x);
        let (y, y_n, y_d) = self.axis(1, lin_y);
        let (z, z_n, z_d) = self.axis(2, lin_z);

        let gy = self.grid[1] as usize;
        let gz = self.grid[2] as usize;
        let gw = if dims == 4 { self.grid[3] as usize } else { 1 };
        let fetch = |x: usize, y: usize, z: usize| -> Vector4f {
            self.table[((x * gy + y) * gz + z) * gw + w]
        };

        let x_d = Vector4f::from(x_d);
        let y_d = Vector4f::from(y_d);
        let z_d = Vector4f::from(z_d);

        let c00 = lerp(fetch(x, y, z), fetch(x_n, y, z), x_d);
        let c10 = lerp(fetch(x, y_n, z), fetch(x_n, y_n, z), x_d);
        let c01 = lerp(fetch(x, y, z_n), fetch(x_n, y, z_n), x_d);
        let c11 = lerp(fetch(x, y_n, z_n), fetch(x_n, y_n, z_n), x_d);

        let c0 = lerp(c00, c10, y_d);
        let c1 = lerp(c01, c11, y_d);

        lerp(c0, c1, z_d)
    }

    /// Corner-weighted interpolation for one and two input axes.
    fn multilinear(&self, v: Vector4f) -> Vector4f {
        let dims = self.grid.len();
        let mut lo = [0usize; 4];
        let mut hi = [0usize; 4];
        let mut t = [0f32; 4];
        for axis in 0..dims {
            (lo[axis], hi[axis], t[axis]) = self.axis(axis, v.v[axis]);
        }
        let mut acc = Vector4f::default();
        for corner in 0..(1usize << dims) {
            let mut weight = 1f32;
            let mut index = 0usize;
            for axis in 0..dims {
                let (i, w) = if corner & (1 << axis) != 0 {
                    (hi[axis], t[axis])
                } else {
                    (lo[axis], 1. - t[axis])
                };
                weight *= w;
                index = index * self.grid[axis] as usize + i;
            }
            if weight != 0. {
                acc = acc + self.table[index] * weight;
            }
        }
        acc
    }
}
