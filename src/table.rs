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
use crate::parametric::TransferFunction;
use pxfm::f_logf;

/// Whether a table has to be invertible.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TableKind {
    /// Used inside element pipelines, may take any shape.
    #[default]
    OneWay,
    /// RGB or Gray tone curve, must be non-decreasing.
    TwoWay,
}

/// Raw samples of a [TransferTable].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableSamples {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

/// Sampled 1D curve over `[0, 1]` with linear interpolation between samples.
#[derive(Debug, Clone)]
pub struct TransferTable {
    samples: TableSamples,
    kind: TableKind,
}

const FIT_TOLERANCE: f32 = 1. / 512.;

impl PartialEq for TransferTable {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        (0..self.len()).all(|i| self.sample_u16(i) == other.sample_u16(i))
    }
}

impl TransferTable {
    pub fn from_u8(samples: Vec<u8>, kind: TableKind) -> Self {
        Self {
            samples: TableSamples::U8(samples),
            kind,
        }
    }

    pub fn from_u16(samples: Vec<u16>, kind: TableKind) -> Self {
        Self {
            samples: TableSamples::U16(samples),
            kind,
        }
    }

    /// Samples `curve` at `len` evenly spaced points into 16 bit entries.
    pub fn from_fn(len: usize, kind: TableKind, curve: impl Fn(f32) -> f32) -> Self {
        let scale = 1. / (len.max(2) - 1) as f32;
        let samples = (0..len)
            .map(|i| {
                let v = curve(i as f32 * scale);
                (v.max(0.).min(1.) * 65535. + 0.5) as u16
            })
            .collect();
        Self::from_u16(samples, kind)
    }

    #[inline]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    #[inline]
    pub fn samples(&self) -> &TableSamples {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.samples {
            TableSamples::U8(v) => v.len(),
            TableSamples::U16(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn sample_u16(&self, index: usize) -> u16 {
        match &self.samples {
            TableSamples::U8(v) => v[index] as u16 * 257,
            TableSamples::U16(v) => v[index],
        }
    }

    /// Sample `index` scaled into `[0, 1]`.
    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        match &self.samples {
            TableSamples::U8(v) => v[index] as f32 * (1. / 255.),
            TableSamples::U16(v) => v[index] as f32 * (1. / 65535.),
        }
    }

    pub(crate) fn to_u16(&self) -> Vec<u16> {
        (0..self.len()).map(|i| self.sample_u16(i)).collect()
    }

    /// At least two samples, non-decreasing when the table must be invertible.
    pub fn check_validity(&self) -> bool {
        if self.len() < 2 {
            return false;
        }
        if self.kind == TableKind::TwoWay {
            return match &self.samples {
                TableSamples::U8(v) => v.windows(2).all(|w| w[0] <= w[1]),
                TableSamples::U16(v) => v.windows(2).all(|w| w[0] <= w[1]),
            };
        }
        true
    }

    pub fn apply(&self, x: f32) -> f32 {
        let len = self.len();
        if len == 0 {
            return x;
        }
        if len == 1 {
            return self.sample(0);
        }
        let last = len - 1;
        let pos = x.max(0.).min(1.) * last as f32;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let t = pos - lo as f32;
        let a = self.sample(lo);
        let b = self.sample(hi);
        a + (b - a) * t
    }

    /// First index at or after `from` whose sample is not below `v`.
    fn lower_bound(&self, from: usize, v: f32) -> usize {
        match &self.samples {
            TableSamples::U8(s) => {
                let target = v * 255.;
                from + s[from..].partition_point(|&x| (x as f32) < target)
            }
            TableSamples::U16(s) => {
                let target = v * 65535.;
                from + s[from..].partition_point(|&x| (x as f32) < target)
            }
        }
    }

    /// Inverse lookup on a non-decreasing table.
    ///
    /// `result_larger_than` is a lower bound on the answer, typically the result
    /// of the previous call in a monotonic sweep, to shorten the search.
    pub fn apply_inverse(&self, y: f32, result_larger_than: f32) -> f32 {
        let len = self.len();
        if len < 2 {
            return y;
        }
        if y <= 0. {
            return 0.;
        }
        if y >= 1. {
            return 1.;
        }
        let last = len - 1;
        let mut start =
            ((result_larger_than.max(0.).min(1.) * last as f32).floor() as usize).min(last);
        if start > 0 && self.sample(start - 1) >= y {
            start = 0;
        }
        let i = self.lower_bound(start, y);
        if i == 0 {
            return 0.;
        }
        if i >= len {
            return 1.;
        }
        let y1 = self.sample(i - 1);
        let y2 = self.sample(i);
        let fraction = if y2 > y1 { (y - y1) / (y2 - y1) } else { 0. };
        (i as f32 - 1. + fraction) / last as f32
    }

    #[inline]
    fn end_slopes(&self) -> (f32, f32) {
        let len = self.len();
        let last = (len - 1) as f32;
        let head = (self.sample(1) - self.sample(0)) * last;
        let tail = (self.sample(len - 1) - self.sample(len - 2)) * last;
        (head, tail)
    }

    /// [Self::apply] continued linearly outside of `[0, 1]`.
    pub fn apply_extended(&self, x: f32) -> f32 {
        if self.len() < 2 || (0. ..=1.).contains(&x) {
            return self.apply(x);
        }
        let (head, tail) = self.end_slopes();
        if x < 0. {
            self.sample(0) + x * head
        } else {
            self.sample(self.len() - 1) + (x - 1.) * tail
        }
    }

    pub fn apply_inverse_extended(&self, y: f32) -> f32 {
        if self.len() < 2 || (0. ..=1.).contains(&y) {
            return self.apply_inverse(y, 0.);
        }
        let (head, tail) = self.end_slopes();
        if y < 0. {
            if head > 0. {
                (y - self.sample(0)) / head
            } else {
                0.
            }
        } else {
            let last = self.sample(self.len() - 1);
            if tail > 0. {
                1. + (y - last) / tail
            } else {
                1.
            }
        }
    }

    fn fits(&self, curve: impl Fn(f32) -> f32) -> bool {
        let scale = 1. / (self.len() - 1) as f32;
        (0..self.len()).all(|i| (self.sample(i) - curve(i as f32 * scale)).abs() <= FIT_TOLERANCE)
    }

    /// Straight line from 0 to 1 within 16 bit rounding.
    pub fn is_linear(&self) -> bool {
        if self.len() < 2 {
            return false;
        }
        let scale = 1. / (self.len() - 1) as f32;
        (0..self.len()).all(|i| (self.sample(i) - i as f32 * scale).abs() <= 1. / 4096.)
    }

    /// Tries to describe the table with a closed form curve.
    ///
    /// Recognizes identity, sRGB and plain power curves.
    pub fn as_transfer_function(&self) -> Option<TransferFunction> {
        if self.len() < 2 {
            return None;
        }
        if self.fits(|x| x) {
            return Some(TransferFunction::linear());
        }
        let srgb = TransferFunction::srgb();
        if self.fits(|x| srgb.apply(x)) {
            return Some(srgb);
        }
        let scale = 1. / (self.len() - 1) as f32;
        let mut min_gamma = f32::MAX;
        let mut max_gamma = f32::MIN;
        let mut sum = 0f32;
        let mut count = 0usize;
        for i in 1..self.len() - 1 {
            let x = i as f32 * scale;
            let y = self.sample(i);
            // Near the ends log ratios are too noisy.
            if !(0.05..=0.95).contains(&y) || x < 0.05 {
                continue;
            }
            let g = f_logf(y) / f_logf(x);
            if !g.is_finite() {
                return None;
            }
            min_gamma = min_gamma.min(g);
            max_gamma = max_gamma.max(g);
            sum += g;
            count += 1;
        }
        if count == 0 || max_gamma - min_gamma > 0.05 {
            return None;
        }
        let gamma = TransferFunction::gamma(sum / count as f32);
        if self.fits(|x| gamma.apply(x)) {
            return Some(gamma);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_monotonic_validity() {
        assert!(TransferTable::from_u16(vec![0, 65535], TableKind::TwoWay).check_validity());
        assert!(
            TransferTable::from_u16(vec![0, 10, 11, 4000, 65535], TableKind::TwoWay)
                .check_validity()
        );
        assert!(
            !TransferTable::from_u16(vec![0, 20, 10, 65535], TableKind::TwoWay).check_validity()
        );
        assert!(TransferTable::from_u16(vec![0, 20, 10, 65535], TableKind::OneWay).check_validity());
        assert!(!TransferTable::from_u8(vec![0], TableKind::OneWay).check_validity());
    }

    #[test]
    fn test_apply_interpolates() {
        let table = TransferTable::from_u8(vec![0, 100, 255], TableKind::TwoWay);
        assert!((table.apply(0.25) - 50. / 255.).abs() < 1e-6);
        assert!((table.apply(2.) - 1.).abs() < 1e-6);
        assert!(table.apply(-1.).abs() < 1e-6);
    }

    #[test]
    fn test_inverse() {
        let gamma = TransferFunction::gamma(2.2);
        let table = TransferTable::from_fn(1024, TableKind::TwoWay, |x| gamma.apply(x));
        let mut rng = rand::rng();
        let mut hint = 0.;
        let mut values: Vec<f32> = (0..100).map(|_| rng.random_range(0.05..1.0)).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        for x in values {
            let y = table.apply(x);
            let back = table.apply_inverse(y, hint);
            assert!((back - x).abs() < 1e-3, "{x} {back}");
            hint = back;
        }
        // a stale hint past the answer must not break the lookup
        let back = table.apply_inverse(table.apply(0.2), 0.9);
        assert!((back - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_extended() {
        let table = TransferTable::from_u16(vec![0, 32768, 65535], TableKind::TwoWay);
        let y = table.apply_extended(1.5);
        assert!(y > 1.);
        assert!((table.apply_inverse_extended(y) - 1.5).abs() < 1e-3);
        assert!(table.apply_extended(-0.5) < 0.);
    }

    #[test]
    fn test_curve_recognition() {
        let linear = TransferTable::from_u16(vec![0, 65535], TableKind::TwoWay);
        assert!(linear.as_transfer_function().unwrap().is_identity());
        let srgb = TransferFunction::srgb();
        let table = TransferTable::from_fn(1024, TableKind::TwoWay, |x| srgb.apply(x));
        assert!(table.as_transfer_function().unwrap().is_srgb());
        let gamma = TransferFunction::gamma(1.8);
        let table = TransferTable::from_fn(256, TableKind::TwoWay, |x| gamma.apply(x));
        let recognized = table.as_transfer_function().unwrap();
        assert!(recognized.is_gamma());
        assert!((recognized.gamma_value() - 1.8).abs() < 0.01);
        let odd = TransferTable::from_u16(vec![0, 60000, 61000, 65535], TableKind::TwoWay);
        assert!(odd.as_transfer_function().is_none());
    }

    #[test]
    fn test_equality_across_depths() {
        let a = TransferTable::from_u8(vec![0, 128, 255], TableKind::TwoWay);
        let b = TransferTable::from_u16(vec![0, 128 * 257, 65535], TableKind::TwoWay);
        assert_eq!(a, b);
    }
}
