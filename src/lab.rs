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
use crate::matrix::{Vector4f, Xyz};

const EPSILON: f32 = 216. / 24389.;
const KAPPA: f32 = 24389. / 27.;

/// CIE Lab relative to the D50 illuminant.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Lab {
    /// `l`: lightness component (0 to 100)
    pub l: f32,
    /// `a`: green (negative) and red (positive) component.
    pub a: f32,
    /// `b`: blue (negative) and yellow (positive) component
    pub b: f32,
}

#[inline]
fn f_forward(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.) / 116.
    }
}

#[inline]
fn f_inverse(t: f32) -> f32 {
    let t3 = t * t * t;
    if t3 > EPSILON {
        t3
    } else {
        (116. * t - 16.) / KAPPA
    }
}

impl Lab {
    #[inline]
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    pub fn from_xyz(xyz: Xyz) -> Self {
        let fx = f_forward(xyz.x / Xyz::D50.x);
        let fy = f_forward(xyz.y / Xyz::D50.y);
        let fz = f_forward(xyz.z / Xyz::D50.z);
        Lab {
            l: 116. * fy - 16.,
            a: 500. * (fx - fy),
            b: 200. * (fy - fz),
        }
    }

    pub fn to_xyz(&self) -> Xyz {
        let fy = (self.l + 16.) / 116.;
        let fx = fy + self.a / 500.;
        let fz = fy - self.b / 200.;
        let y = if self.l > KAPPA * EPSILON {
            fy * fy * fy
        } else {
            self.l / KAPPA
        };
        Xyz {
            x: f_inverse(fx) * Xyz::D50.x,
            y: y * Xyz::D50.y,
            z: f_inverse(fz) * Xyz::D50.z,
        }
    }

    /// Lab packed into `[0, 1]` the way ICC LUT tables carry it.
    #[inline]
    pub(crate) fn from_pcs_vector(v: Vector4f) -> Self {
        Lab {
            l: v.v[0] * 100.,
            a: v.v[1] * 255. - 128.,
            b: v.v[2] * 255. - 128.,
        }
    }

    #[inline]
    pub(crate) fn to_pcs_vector(self, w: f32) -> Vector4f {
        Vector4f {
            v: [
                self.l * (1. / 100.),
                (self.a + 128.) * (1. / 255.),
                (self.b + 128.) * (1. / 255.),
                w,
            ],
        }
    }
}
