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
use crate::color_space::TransferCurveKind;
use crate::primaries::Primaries;

/// See [Rec. ITU-T H.273 (12/2016)](https://www.itu.int/rec/T-REC-H.273-201612-I/en) Table 2
///
/// Only the code points with a matching [Primaries] value are named.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CicpColorPrimaries {
    /// Rec. ITU-R BT.709-6, IEC 61966-2-1 sRGB
    Bt709,
    /// Rec. ITU-R BT.2020-2, Rec. ITU-R BT.2100-0
    Bt2020,
    /// SMPTE EG 432-1 (2010), Display P3
    Smpte432,
    Other(u8),
}

impl From<u8> for CicpColorPrimaries {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Bt709,
            9 => Self::Bt2020,
            12 => Self::Smpte432,
            v => Self::Other(v),
        }
    }
}

impl From<CicpColorPrimaries> for u8 {
    fn from(value: CicpColorPrimaries) -> Self {
        match value {
            CicpColorPrimaries::Bt709 => 1,
            CicpColorPrimaries::Bt2020 => 9,
            CicpColorPrimaries::Smpte432 => 12,
            CicpColorPrimaries::Other(v) => v,
        }
    }
}

impl CicpColorPrimaries {
    pub fn primaries(self) -> Option<Primaries> {
        match self {
            Self::Bt709 => Some(Primaries::SRgb),
            Self::Bt2020 => Some(Primaries::Bt2020),
            Self::Smpte432 => Some(Primaries::DciP3D65),
            Self::Other(_) => None,
        }
    }

    pub fn from_primaries(primaries: Primaries) -> Option<Self> {
        match primaries {
            Primaries::SRgb => Some(Self::Bt709),
            Primaries::Bt2020 => Some(Self::Bt2020),
            Primaries::DciP3D65 => Some(Self::Smpte432),
            _ => None,
        }
    }
}

/// See [Rec. ITU-T H.273 (12/2016)](https://www.itu.int/rec/T-REC-H.273-201612-I/en) Table 3
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CicpTransferCharacteristics {
    /// Rec. ITU-R BT.709-6
    /// (functionally the same as the values 6, 14 and 15)
    Bt709,
    /// Rec. ITU-R BT.470-6 System M, gamma 2.2
    Bt470M,
    /// Rec. ITU-R BT.470-6 System B, G, gamma 2.8
    Bt470Bg,
    /// Rec. ITU-R BT.601-7 525 or 625
    Bt601,
    Linear,
    /// IEC 61966-2-1 sRGB or sYCC
    Srgb,
    /// Rec. ITU-R BT.2020-2 (10-bit system)
    Bt202010bit,
    /// Rec. ITU-R BT.2020-2 (12-bit system)
    Bt202012bit,
    /// SMPTE ST 2084, Rec. ITU-R BT.2100-0 PQ
    Smpte2084,
    /// ARIB STD-B67, Rec. ITU-R BT.2100-0 HLG
    Hlg,
    Other(u8),
}

impl From<u8> for CicpTransferCharacteristics {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Bt709,
            4 => Self::Bt470M,
            5 => Self::Bt470Bg,
            6 => Self::Bt601,
            8 => Self::Linear,
            13 => Self::Srgb,
            14 => Self::Bt202010bit,
            15 => Self::Bt202012bit,
            16 => Self::Smpte2084,
            18 => Self::Hlg,
            v => Self::Other(v),
        }
    }
}

impl From<CicpTransferCharacteristics> for u8 {
    fn from(value: CicpTransferCharacteristics) -> Self {
        match value {
            CicpTransferCharacteristics::Bt709 => 1,
            CicpTransferCharacteristics::Bt470M => 4,
            CicpTransferCharacteristics::Bt470Bg => 5,
            CicpTransferCharacteristics::Bt601 => 6,
            CicpTransferCharacteristics::Linear => 8,
            CicpTransferCharacteristics::Srgb => 13,
            CicpTransferCharacteristics::Bt202010bit => 14,
            CicpTransferCharacteristics::Bt202012bit => 15,
            CicpTransferCharacteristics::Smpte2084 => 16,
            CicpTransferCharacteristics::Hlg => 18,
            CicpTransferCharacteristics::Other(v) => v,
        }
    }
}

impl CicpTransferCharacteristics {
    /// Transfer curve kind and its gamma value.
    pub fn transfer(self) -> Option<(TransferCurveKind, f32)> {
        match self {
            Self::Srgb => Some((TransferCurveKind::SRgb, 2.31)),
            Self::Linear => Some((TransferCurveKind::Linear, 1.)),
            Self::Bt470M => Some((TransferCurveKind::Gamma, 2.2)),
            Self::Bt470Bg => Some((TransferCurveKind::Gamma, 2.8)),
            Self::Bt709 | Self::Bt601 | Self::Bt202010bit | Self::Bt202012bit => {
                Some((TransferCurveKind::Bt2020, 2.1))
            }
            Self::Smpte2084 => Some((TransferCurveKind::St2084, 0.)),
            Self::Hlg => Some((TransferCurveKind::Hlg, 0.)),
            Self::Other(_) => None,
        }
    }

    pub fn from_transfer(kind: TransferCurveKind, gamma: f32) -> Option<Self> {
        match kind {
            TransferCurveKind::SRgb => Some(Self::Srgb),
            TransferCurveKind::Linear => Some(Self::Linear),
            TransferCurveKind::Gamma if (gamma - 2.2).abs() < 1. / 512. => Some(Self::Bt470M),
            TransferCurveKind::Gamma if (gamma - 2.8).abs() < 1. / 512. => Some(Self::Bt470Bg),
            TransferCurveKind::Bt2020 => Some(Self::Bt202010bit),
            TransferCurveKind::St2084 => Some(Self::Smpte2084),
            TransferCurveKind::Hlg => Some(Self::Hlg),
            _ => None,
        }
    }
}

/// Payload of the ICC `cicp` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CicpProfile {
    pub color_primaries: CicpColorPrimaries,
    pub transfer_characteristics: CicpTransferCharacteristics,
    pub matrix_coefficients: u8,
    pub full_range: bool,
}

impl CicpProfile {
    /// Named primaries and transfer when both code points are understood and
    /// the signal is RGB.
    pub fn recognized(&self) -> Option<(Primaries, TransferCurveKind, f32)> {
        if self.matrix_coefficients != 0 {
            return None;
        }
        let primaries = self.color_primaries.primaries()?;
        let (transfer, gamma) = self.transfer_characteristics.transfer()?;
        Some((primaries, transfer, gamma))
    }
}
