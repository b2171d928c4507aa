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
use crate::mlaf::mlaf;
use crate::parametric::TransferFunction;
use crate::table::{TableKind, TransferTable};
use pxfm::{f_expf, f_powf};

/// Samples used when a curve without a closed form is stored as a table.
pub(crate) const CURVE_TABLE_SIZE: usize = 4096;

/// Tone reproduction curve of one channel.
#[derive(Debug, Clone, Default)]
pub enum ToneCurve {
    #[default]
    Uninitialized,
    Function(TransferFunction),
    Table(TransferTable),
}

impl PartialEq for ToneCurve {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ToneCurve::Uninitialized, ToneCurve::Uninitialized) => true,
            (ToneCurve::Function(a), ToneCurve::Function(b)) => a == b,
            (ToneCurve::Table(a), ToneCurve::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl From<TransferFunction> for ToneCurve {
    fn from(value: TransferFunction) -> Self {
        ToneCurve::Function(value)
    }
}

impl From<TransferTable> for ToneCurve {
    fn from(value: TransferTable) -> Self {
        ToneCurve::Table(value)
    }
}

#[inline]
/// Linear transfer function for PQ
pub(crate) fn pq_to_linearf(gamma: f32) -> f32 {
    if gamma > 0.0 {
        let pow_gamma = f_powf(gamma, 1.0 / 78.84375);
        let num = (pow_gamma - 0.8359375).max(0.);
        let den = mlaf(18.8515625, -18.6875, pow_gamma).max(f32::MIN_POSITIVE);
        f_powf(num / den, 1.0 / 0.1593017578125)
    } else {
        0.0
    }
}

#[inline]
/// Linear transfer function for HLG
pub(crate) fn hlg_to_linearf(gamma: f32) -> f32 {
    if gamma < 0.0 {
        return 0.0;
    }
    if gamma <= 0.5 {
        f_powf((gamma * gamma) * (1.0 / 3.0), 1.2)
    } else {
        f_powf(
            (f_expf((gamma - 0.55991073) / 0.17883277) + 0.28466892) / 12.0,
            1.2,
        )
    }
}

impl ToneCurve {
    pub fn linear() -> Self {
        ToneCurve::Function(TransferFunction::linear())
    }

    /// SMPTE ST 2084 with 1.0 standing for 10000 nits.
    pub fn pq() -> Self {
        ToneCurve::Table(TransferTable::from_fn(
            CURVE_TABLE_SIZE,
            TableKind::TwoWay,
            pq_to_linearf,
        ))
    }

    /// ARIB STD-B67 including the reference OOTF.
    pub fn hlg() -> Self {
        ToneCurve::Table(TransferTable::from_fn(
            CURVE_TABLE_SIZE,
            TableKind::TwoWay,
            hlg_to_linearf,
        ))
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !matches!(self, ToneCurve::Uninitialized)
    }

    pub fn is_valid(&self) -> bool {
        match self {
            ToneCurve::Uninitialized => false,
            ToneCurve::Function(f) => f.is_valid(),
            ToneCurve::Table(t) => t.check_validity(),
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            ToneCurve::Uninitialized => false,
            ToneCurve::Function(f) => f.is_identity(),
            ToneCurve::Table(t) => t.is_linear(),
        }
    }

    #[inline]
    pub fn function(&self) -> Option<&TransferFunction> {
        match self {
            ToneCurve::Function(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn table(&self) -> Option<&TransferTable> {
        match self {
            ToneCurve::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Device value to linear light, input clamped to `[0, 1]` for tables.
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ToneCurve::Uninitialized => x,
            ToneCurve::Function(f) => f.apply(x),
            ToneCurve::Table(t) => t.apply(x),
        }
    }

    /// Linear light to device value.
    ///
    /// Functions without an inverse pass values through unchanged.
    pub fn apply_inverse(&self, x: f32) -> f32 {
        match self {
            ToneCurve::Uninitialized => x,
            ToneCurve::Function(f) => match f.inverted() {
                Some(inverse) => inverse.apply(x),
                None => x,
            },
            ToneCurve::Table(t) => t.apply_inverse(x, 0.),
        }
    }

    /// [Self::apply] accepting values outside of `[0, 1]`.
    ///
    /// Functions are mirrored around zero, tables continue with their end slopes.
    pub fn apply_extended(&self, x: f32) -> f32 {
        if (0. ..=1.).contains(&x) {
            return self.apply(x);
        }
        match self {
            ToneCurve::Uninitialized => x,
            ToneCurve::Function(f) => f.apply(x.abs()).copysign(x),
            ToneCurve::Table(t) => t.apply_extended(x),
        }
    }

    pub fn apply_inverse_extended(&self, x: f32) -> f32 {
        if (0. ..=1.).contains(&x) {
            return self.apply_inverse(x);
        }
        match self {
            ToneCurve::Uninitialized => x,
            ToneCurve::Function(f) => match f.inverted() {
                Some(inverse) => inverse.apply(x.abs()).copysign(x),
                None => x,
            },
            ToneCurve::Table(t) => t.apply_inverse_extended(x),
        }
    }
}
