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
use crate::chad::adapt_to_d50;
use crate::matrix::{Chromaticity, Matrix3f};

/// Well known sets of primaries.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Primaries {
    #[default]
    Custom = 0,
    SRgb = 1,
    AdobeRgb = 2,
    DciP3D65 = 3,
    ProPhotoRgb = 4,
    Bt2020 = 5,
}

/// Chromaticities of the red, green and blue primaries plus the white point.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ColorSpacePrimaries {
    pub white: Chromaticity,
    pub red: Chromaticity,
    pub green: Chromaticity,
    pub blue: Chromaticity,
}

impl ColorSpacePrimaries {
    pub const SRGB: ColorSpacePrimaries = ColorSpacePrimaries {
        white: Chromaticity::D65,
        red: Chromaticity::new(0.64, 0.33),
        green: Chromaticity::new(0.30, 0.60),
        blue: Chromaticity::new(0.15, 0.06),
    };

    pub const ADOBE_RGB: ColorSpacePrimaries = ColorSpacePrimaries {
        white: Chromaticity::D65,
        red: Chromaticity::new(0.64, 0.33),
        green: Chromaticity::new(0.21, 0.71),
        blue: Chromaticity::new(0.15, 0.06),
    };

    pub const DCI_P3_D65: ColorSpacePrimaries = ColorSpacePrimaries {
        white: Chromaticity::D65,
        red: Chromaticity::new(0.680, 0.320),
        green: Chromaticity::new(0.265, 0.690),
        blue: Chromaticity::new(0.150, 0.060),
    };

    pub const PRO_PHOTO_RGB: ColorSpacePrimaries = ColorSpacePrimaries {
        white: Chromaticity::new(0.3457, 0.3585),
        red: Chromaticity::new(0.7347, 0.2653),
        green: Chromaticity::new(0.1596, 0.8404),
        blue: Chromaticity::new(0.0366, 0.0001),
    };

    pub const BT2020: ColorSpacePrimaries = ColorSpacePrimaries {
        white: Chromaticity::D65,
        red: Chromaticity::new(0.708, 0.292),
        green: Chromaticity::new(0.170, 0.797),
        blue: Chromaticity::new(0.131, 0.046),
    };

    pub const fn new(
        white: Chromaticity,
        red: Chromaticity,
        green: Chromaticity,
        blue: Chromaticity,
    ) -> Self {
        Self {
            white,
            red,
            green,
            blue,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.white.is_valid() && self.red.is_valid() && self.green.is_valid() && self.blue.is_valid()
    }

    /// Builds the RGB to XYZ matrix adapted to D50.
    ///
    /// Returns `None` when the points are invalid or the primaries are collinear.
    pub fn to_xyz_matrix(&self) -> Option<Matrix3f> {
        if !self.is_valid() {
            return None;
        }
        let r = self.red.to_xyz().to_vector();
        let g = self.green.to_xyz().to_vector();
        let b = self.blue.to_xyz().to_vector();
        let unscaled = Matrix3f::from_columns(r, g, b);
        let white = self.white.to_xyz();
        let scale = unscaled.inverse()?.mul_vector(white.to_vector());
        let to_xyz = Matrix3f::from_columns(r * scale.v[0], g * scale.v[1], b * scale.v[2]);
        let chad = adapt_to_d50(white)?;
        let adapted = chad.mat_mul(to_xyz);
        if !adapted.is_valid() {
            return None;
        }
        Some(adapted)
    }
}

impl Primaries {
    pub const fn points(self) -> Option<ColorSpacePrimaries> {
        match self {
            Primaries::Custom => None,
            Primaries::SRgb => Some(ColorSpacePrimaries::SRGB),
            Primaries::AdobeRgb => Some(ColorSpacePrimaries::ADOBE_RGB),
            Primaries::DciP3D65 => Some(ColorSpacePrimaries::DCI_P3_D65),
            Primaries::ProPhotoRgb => Some(ColorSpacePrimaries::PRO_PHOTO_RGB),
            Primaries::Bt2020 => Some(ColorSpacePrimaries::BT2020),
        }
    }

    /// D50 adapted RGB to XYZ matrix of the named primaries.
    pub fn to_xyz_matrix(self) -> Option<Matrix3f> {
        self.points()?.to_xyz_matrix()
    }

    pub(crate) const KNOWN: [Primaries; 5] = [
        Primaries::SRgb,
        Primaries::AdobeRgb,
        Primaries::DciP3D65,
        Primaries::ProPhotoRgb,
        Primaries::Bt2020,
    ];

    /// Recognizes a standard set of primaries by its XYZ matrix.
    pub(crate) fn identify(to_xyz: &Matrix3f) -> Primaries {
        for primaries in Primaries::KNOWN {
            if let Some(known) = primaries.to_xyz_matrix() {
                if known.test_equality(*to_xyz) {
                    return primaries;
                }
            }
        }
        Primaries::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Xyz;

    #[test]
    fn test_named_matrices_are_valid() {
        for primaries in Primaries::KNOWN {
            let m = primaries.to_xyz_matrix().unwrap();
            assert!(m.is_valid(), "{primaries:?}");
            // D50 white must come out of (1, 1, 1)
            let white = m.mul_vector(1f32.into());
            assert_eq!(Xyz::from_vector(white), Xyz::D50, "{primaries:?}");
        }
        assert!(Primaries::Custom.to_xyz_matrix().is_none());
    }

    #[test]
    fn test_srgb_matrix() {
        let m = Primaries::SRgb.to_xyz_matrix().unwrap();
        let expected = [
            [0.4360747, 0.3850649, 0.1430804],
            [0.2225045, 0.7168786, 0.0606169],
            [0.0139322, 0.0971045, 0.7141733],
        ];
        for (row, expected_row) in m.v.iter().zip(expected.iter()) {
            for (&a, &b) in row.iter().zip(expected_row.iter()) {
                assert!((a - b).abs() < 1e-3, "{a} {b}");
            }
        }
    }

    #[test]
    fn test_identify() {
        let m = Primaries::DciP3D65.to_xyz_matrix().unwrap();
        assert_eq!(Primaries::identify(&m), Primaries::DciP3D65);
        assert_eq!(Primaries::identify(&Matrix3f::IDENTITY), Primaries::Custom);
    }

    #[test]
    fn test_degenerate_primaries() {
        let collinear = ColorSpacePrimaries::new(
            Chromaticity::D65,
            Chromaticity::new(0.1, 0.1),
            Chromaticity::new(0.2, 0.2),
            Chromaticity::new(0.3, 0.3),
        );
        assert!(collinear.to_xyz_matrix().is_none());
        let outside = ColorSpacePrimaries::new(
            Chromaticity::D65,
            Chromaticity::new(0.9, 0.3),
            Chromaticity::new(0.2, 0.7),
            Chromaticity::new(0.1, 0.1),
        );
        assert!(!outside.is_valid());
    }
}
