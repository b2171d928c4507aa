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
use crate::trc::ToneCurve;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

/// Table entries per unit of input, 16 steps for every 8 bit code value.
pub(crate) const LUT_SCALE: usize = 255 * 16;
/// Entries past [LUT_SCALE] cover slight excursions above 1.0.
pub(crate) const LUT_SIZE: usize = 4352;
/// Stored value of 1.0.
const LUT_ONE: f32 = 255. * 256.;

/// Precomputed linearization of one tone curve.
pub(crate) struct TrcLut {
    to_linear: Box<[u16]>,
    from_linear: Box<[u16]>,
    /// Last entry of `to_linear` that is not saturated.
    to_linear_max: usize,
    /// Last entry of `from_linear` that is not saturated.
    from_linear_max: usize,
    curve: ToneCurve,
}

impl Debug for TrcLut {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrcLut")
            .field("to_linear_max", &self.to_linear_max)
            .field("from_linear_max", &self.from_linear_max)
            .finish()
    }
}

fn sample_table(evaluate: impl Fn(f32) -> f32) -> (Box<[u16]>, usize) {
    let mut table = vec![0u16; LUT_SIZE];
    let mut max = 0usize;
    let mut saturated = false;
    for (i, dst) in table.iter_mut().enumerate() {
        let v = evaluate(i as f32 / LUT_SCALE as f32) * LUT_ONE;
        if !saturated && v.is_finite() && v >= 0. && v <= u16::MAX as f32 {
            *dst = (v + 0.5) as u16;
            max = i;
        } else {
            saturated = true;
            *dst = if v.is_finite() && v > 0. { u16::MAX } else { 0 };
        }
    }
    (table.into_boxed_slice(), max)
}

impl TrcLut {
    pub(crate) fn new(curve: &ToneCurve) -> TrcLut {
        let (to_linear, to_linear_max) = sample_table(|x| curve.apply_extended(x));
        let (from_linear, from_linear_max) = sample_table(|x| curve.apply_inverse_extended(x));
        TrcLut {
            to_linear,
            from_linear,
            to_linear_max,
            from_linear_max,
            curve: curve.clone(),
        }
    }

    #[inline]
    fn lookup(table: &[u16], max: usize, x: f32) -> Option<f32> {
        let pos = x * LUT_SCALE as f32;
        if !(pos >= 0.) {
            return None;
        }
        let lo = pos as usize;
        if lo >= max {
            return if lo == max && pos == lo as f32 {
                Some(table[lo] as f32 * (1. / LUT_ONE))
            } else {
                None
            };
        }
        let t = pos - lo as f32;
        let a = table[lo] as f32;
        let b = table[lo + 1] as f32;
        Some((a + (b - a) * t) * (1. / LUT_ONE))
    }

    /// Device value to linear, exact curve evaluation past the table range.
    #[inline]
    pub(crate) fn to_linear(&self, x: f32) -> f32 {
        match Self::lookup(&self.to_linear, self.to_linear_max, x) {
            Some(v) => v,
            None => self.curve.apply_extended(x),
        }
    }

    #[inline]
    pub(crate) fn from_linear(&self, x: f32) -> f32 {
        match Self::lookup(&self.from_linear, self.from_linear_max, x) {
            Some(v) => v,
            None => self.curve.apply_inverse_extended(x),
        }
    }
}

/// Lazily built per-channel tables of one color space.
///
/// The first caller builds the tables, concurrent callers wait for it and
/// then share the published result.
#[derive(Default)]
pub(crate) struct LutCache {
    tables: OnceLock<Vec<Arc<TrcLut>>>,
}

impl Debug for LutCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LutCache")
            .field("generated", &self.tables.get().is_some())
            .finish()
    }
}

impl LutCache {
    /// One table per channel, sharing a single table when all curves are equal.
    pub(crate) fn tables(&self, curves: &[ToneCurve; 3]) -> &[Arc<TrcLut>] {
        self.tables.get_or_init(|| {
            let first = Arc::new(TrcLut::new(&curves[0]));
            if curves[0] == curves[1] && curves[0] == curves[2] {
                vec![first.clone(), first.clone(), first]
            } else {
                vec![
                    first,
                    Arc::new(TrcLut::new(&curves[1])),
                    Arc::new(TrcLut::new(&curves[2])),
                ]
            }
        })
    }
}
