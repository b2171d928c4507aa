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
use pxfm::f_powf;
use std::sync::atomic::{AtomicU8, Ordering};

const PARAMETER_TOLERANCE: f32 = 1. / 512.;

const HINT_CALCULATED: u8 = 1;
const HINT_GAMMA: u8 = 1 << 1;
const HINT_IDENTITY: u8 = 1 << 2;
const HINT_SRGB: u8 = 1 << 3;

/// ICC parametric curve of type 4.
///
/// ```text
/// f(x) = c * x + f            for x < d
/// f(x) = (a * x + b) ^ g + e  for x >= d
/// ```
///
/// Classification hints are computed on first use and cached.
#[derive(Debug, Default)]
pub struct TransferFunction {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    g: f32,
    hints: AtomicU8,
}

impl Clone for TransferFunction {
    fn clone(&self) -> Self {
        Self {
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            f: self.f,
            g: self.g,
            hints: AtomicU8::new(self.hints.load(Ordering::Relaxed)),
        }
    }
}

impl PartialEq for TransferFunction {
    fn eq(&self, other: &Self) -> bool {
        self.parameters()
            .iter()
            .zip(other.parameters().iter())
            .all(|(&a, &b)| (a - b).abs() <= PARAMETER_TOLERANCE)
    }
}

#[inline]
fn is_near(a: f32, b: f32) -> bool {
    (a - b).abs() <= PARAMETER_TOLERANCE
}

impl TransferFunction {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32, g: f32) -> Self {
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            g,
            hints: AtomicU8::new(0),
        }
    }

    pub const fn linear() -> Self {
        Self::new(1., 0., 0., 0., 0., 0., 1.)
    }

    pub const fn gamma(gamma: f32) -> Self {
        Self::new(1., 0., 0., 0., 0., 0., gamma)
    }

    pub const fn srgb() -> Self {
        Self::new(
            1. / 1.055,
            0.055 / 1.055,
            1. / 12.92,
            0.04045,
            0.,
            0.,
            2.4,
        )
    }

    pub const fn pro_photo_rgb() -> Self {
        Self::new(1., 0., 1. / 16., 16. / 512., 0., 0., 1.8)
    }

    pub const fn bt2020() -> Self {
        Self::new(
            1. / 1.0993,
            0.0993 / 1.0993,
            1. / 4.5,
            0.08145,
            0.,
            0.,
            1. / 0.45,
        )
    }

    /// Parameters in `a, b, c, d, e, f, g` order.
    #[inline]
    pub const fn parameters(&self) -> [f32; 7] {
        [self.a, self.b, self.c, self.d, self.e, self.f, self.g]
    }

    #[inline]
    pub fn gamma_value(&self) -> f32 {
        self.g
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.parameters().iter().all(|x| x.is_finite())
    }

    /// Converts ICC `para` subtypes 0 to 4 into the canonical form.
    pub fn from_parametric(kind: u16, params: &[f32]) -> Result<Self, CmsError> {
        const COUNT_TO_LENGTH: [usize; 5] = [1, 3, 4, 5, 7];
        let expected = *COUNT_TO_LENGTH
            .get(kind as usize)
            .ok_or(CmsError::InvalidTrcCurve)?;
        if params.len() < expected {
            return Err(CmsError::InvalidTrcCurve);
        }
        let f = match kind {
            0 => Self::gamma(params[0]),
            1 => {
                if params[1] == 0. {
                    return Err(CmsError::ParametricCurveZeroDivision);
                }
                Self::new(
                    params[1],
                    params[2],
                    0.,
                    -params[2] / params[1],
                    0.,
                    0.,
                    params[0],
                )
            }
            2 => {
                if params[1] == 0. {
                    return Err(CmsError::ParametricCurveZeroDivision);
                }
                Self::new(
                    params[1],
                    params[2],
                    0.,
                    -params[2] / params[1],
                    params[3],
                    params[3],
                    params[0],
                )
            }
            3 => Self::new(
                params[1], params[2], params[3], params[4], 0., 0., params[0],
            ),
            _ => Self::new(
                params[1], params[2], params[3], params[4], params[5], params[6], params[0],
            ),
        };
        if !f.is_valid() {
            return Err(CmsError::InvalidTrcCurve);
        }
        Ok(f)
    }

    /// Smallest ICC `para` subtype able to carry this curve, with its parameters.
    pub(crate) fn to_parametric(&self) -> (u16, Vec<f32>) {
        if self.is_gamma() {
            return (0, vec![self.g]);
        }
        if self.e == 0. && self.f == 0. {
            return (3, vec![self.g, self.a, self.b, self.c, self.d]);
        }
        (4, vec![self.g, self.a, self.b, self.c, self.d, self.e, self.f])
    }

    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        if x < self.d {
            mlaf(self.f, self.c, x)
        } else {
            f_powf(mlaf(self.b, self.a, x).max(0.), self.g) + self.e
        }
    }

    /// Closed form inverse, `None` when the curve cannot be inverted.
    ///
    /// A vanishing `a` or `g` collapses the power segment to a constant, such
    /// curves have no inverse.
    pub fn inverted(&self) -> Option<TransferFunction> {
        let d = mlaf(self.f, self.c, self.d);
        let (c, f) = if self.c.abs() > f32::EPSILON {
            (1. / self.c, -self.f / self.c)
        } else {
            (0., 0.)
        };
        if self.a.abs() <= f32::EPSILON || self.g.abs() <= f32::EPSILON {
            return None;
        }
        let a = f_powf(1. / self.a, self.g);
        let b = -a * self.e;
        let e = -self.b / self.a;
        let g = 1. / self.g;
        let inverted = TransferFunction::new(a, b, c, d, e, f, g);
        if !inverted.is_valid() {
            return None;
        }
        Some(inverted)
    }

    fn hints(&self) -> u8 {
        let hints = self.hints.load(Ordering::Relaxed);
        if hints & HINT_CALCULATED != 0 {
            return hints;
        }
        let mut hints = HINT_CALCULATED;
        let gamma = is_near(self.a, 1.)
            && is_near(self.b, 0.)
            && is_near(self.d, 0.)
            && is_near(self.e, 0.);
        if gamma {
            hints |= HINT_GAMMA;
        }
        let linear_segment_only =
            self.d >= 1. && is_near(self.c, 1.) && is_near(self.f, 0.);
        if (gamma && is_near(self.g, 1.)) || linear_segment_only {
            hints |= HINT_IDENTITY;
        }
        if *self == TransferFunction::srgb() {
            hints |= HINT_SRGB;
        }
        self.hints.store(hints, Ordering::Relaxed);
        hints
    }

    /// A plain power curve `x ^ g`.
    #[inline]
    pub fn is_gamma(&self) -> bool {
        self.hints() & HINT_GAMMA != 0
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.hints() & HINT_IDENTITY != 0
    }

    #[inline]
    pub fn is_srgb(&self) -> bool {
        self.hints() & HINT_SRGB != 0
    }
}
