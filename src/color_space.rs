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
use crate::element::Element;
use crate::err::CmsError;
use crate::lut::LutCache;
use crate::matrix::{Chromaticity, Matrix3f, Xyz};
use crate::parametric::TransferFunction;
use crate::primaries::{ColorSpacePrimaries, Primaries};
use crate::profile::ParsingOptions;
use crate::table::TransferTable;
use crate::trc::{CURVE_TABLE_SIZE, ToneCurve};
use std::sync::{Arc, OnceLock};

/// Built-in color spaces.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NamedColorSpace {
    SRgb = 1,
    SRgbLinear = 2,
    AdobeRgb = 3,
    DisplayP3 = 4,
    ProPhotoRgb = 5,
    Bt2020 = 6,
    Bt2100Pq = 7,
    Bt2100Hlg = 8,
}

impl NamedColorSpace {
    pub const ALL: [NamedColorSpace; 8] = [
        NamedColorSpace::SRgb,
        NamedColorSpace::SRgbLinear,
        NamedColorSpace::AdobeRgb,
        NamedColorSpace::DisplayP3,
        NamedColorSpace::ProPhotoRgb,
        NamedColorSpace::Bt2020,
        NamedColorSpace::Bt2100Pq,
        NamedColorSpace::Bt2100Hlg,
    ];

    pub const fn description(self) -> &'static str {
        match self {
            NamedColorSpace::SRgb => "sRGB",
            NamedColorSpace::SRgbLinear => "Linear sRGB",
            NamedColorSpace::AdobeRgb => "Adobe RGB",
            NamedColorSpace::DisplayP3 => "Display P3",
            NamedColorSpace::ProPhotoRgb => "ProPhoto RGB",
            NamedColorSpace::Bt2020 => "BT.2020",
            NamedColorSpace::Bt2100Pq => "BT.2100(PQ)",
            NamedColorSpace::Bt2100Hlg => "BT.2100(HLG)",
        }
    }

    const fn definition(self) -> (Primaries, TransferCurveKind, f32) {
        match self {
            NamedColorSpace::SRgb => (Primaries::SRgb, TransferCurveKind::SRgb, 2.31),
            NamedColorSpace::SRgbLinear => (Primaries::SRgb, TransferCurveKind::Linear, 1.0),
            NamedColorSpace::AdobeRgb => (Primaries::AdobeRgb, TransferCurveKind::Gamma, ADOBE_GAMMA),
            NamedColorSpace::DisplayP3 => (Primaries::DciP3D65, TransferCurveKind::SRgb, 2.31),
            NamedColorSpace::ProPhotoRgb => {
                (Primaries::ProPhotoRgb, TransferCurveKind::ProPhotoRgb, 1.8)
            }
            NamedColorSpace::Bt2020 => (Primaries::Bt2020, TransferCurveKind::Bt2020, 2.1),
            NamedColorSpace::Bt2100Pq => (Primaries::Bt2020, TransferCurveKind::St2084, 0.),
            NamedColorSpace::Bt2100Hlg => (Primaries::Bt2020, TransferCurveKind::Hlg, 0.),
        }
    }
}

/// Gamma of Adobe RGB (1998), 563/256.
const ADOBE_GAMMA: f32 = 2.199_218_8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ColorModel {
    #[default]
    Undefined,
    Rgb,
    Gray,
    Cmyk,
}

impl ColorModel {
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorModel::Undefined => 0,
            ColorModel::Rgb => 3,
            ColorModel::Gray => 1,
            ColorModel::Cmyk => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TransformModel {
    /// 3x3 matrix to XYZ plus one tone curve per channel.
    #[default]
    ThreeComponentMatrix,
    /// Ordered element lists to and from the profile connection space.
    ElementListProcessing,
}

/// Classification of the tone curves of a matrix based color space.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TransferCurveKind {
    #[default]
    Custom,
    Linear,
    Gamma,
    SRgb,
    ProPhotoRgb,
    Bt2020,
    St2084,
    Hlg,
}

impl TransferCurveKind {
    pub(crate) fn curve(self, gamma: f32) -> Option<ToneCurve> {
        Some(match self {
            TransferCurveKind::Custom => return None,
            TransferCurveKind::Linear => ToneCurve::linear(),
            TransferCurveKind::Gamma => ToneCurve::from(TransferFunction::gamma(gamma)),
            TransferCurveKind::SRgb => ToneCurve::from(TransferFunction::srgb()),
            TransferCurveKind::ProPhotoRgb => ToneCurve::from(TransferFunction::pro_photo_rgb()),
            TransferCurveKind::Bt2020 => ToneCurve::from(TransferFunction::bt2020()),
            TransferCurveKind::St2084 => ToneCurve::pq(),
            TransferCurveKind::Hlg => ToneCurve::hlg(),
        })
    }

    /// Informational gamma value reported for the kind.
    pub(crate) const fn nominal_gamma(self, gamma: f32) -> f32 {
        match self {
            TransferCurveKind::Custom | TransferCurveKind::Gamma => gamma,
            TransferCurveKind::Linear => 1.,
            TransferCurveKind::SRgb => 2.31,
            TransferCurveKind::ProPhotoRgb => 1.8,
            TransferCurveKind::Bt2020 => 2.1,
            TransferCurveKind::St2084 | TransferCurveKind::Hlg => 0.,
        }
    }
}

/// Finds the kind of a curve, `Custom` when it matches no well known curve.
pub(crate) fn classify_curve(curve: &ToneCurve) -> (TransferCurveKind, f32) {
    match curve {
        ToneCurve::Uninitialized => (TransferCurveKind::Custom, 0.),
        ToneCurve::Function(f) => {
            if f.is_identity() {
                (TransferCurveKind::Linear, 1.)
            } else if f.is_gamma() {
                (TransferCurveKind::Gamma, f.gamma_value())
            } else if f.is_srgb() {
                (TransferCurveKind::SRgb, 2.31)
            } else if *f == TransferFunction::pro_photo_rgb() {
                (TransferCurveKind::ProPhotoRgb, 1.8)
            } else if *f == TransferFunction::bt2020() {
                (TransferCurveKind::Bt2020, 2.1)
            } else {
                (TransferCurveKind::Custom, 0.)
            }
        }
        ToneCurve::Table(t) => {
            if t.len() == CURVE_TABLE_SIZE {
                if *curve == ToneCurve::pq() {
                    return (TransferCurveKind::St2084, 0.);
                }
                if *curve == ToneCurve::hlg() {
                    return (TransferCurveKind::Hlg, 0.);
                }
            }
            (TransferCurveKind::Custom, 0.)
        }
    }
}

/// Shared state behind a [ColorSpace].
#[derive(Debug, Default)]
pub(crate) struct ColorSpaceData {
    pub(crate) named: Option<NamedColorSpace>,
    pub(crate) color_model: ColorModel,
    pub(crate) transform_model: TransformModel,
    pub(crate) primaries: Primaries,
    pub(crate) transfer: TransferCurveKind,
    pub(crate) gamma: f32,
    /// Native white point, unit luminance.
    pub(crate) white_point: Xyz,
    /// RGB to D50 XYZ, the adaptation matrix for Gray.
    pub(crate) to_xyz: Matrix3f,
    pub(crate) chad: Matrix3f,
    pub(crate) trc: [ToneCurve; 3],
    pub(crate) a_to_b: Vec<Element>,
    pub(crate) b_to_a: Vec<Element>,
    pub(crate) is_pcs_lab: bool,
    pub(crate) description: String,
    pub(crate) user_description: String,
    pub(crate) icc_profile: OnceLock<Vec<u8>>,
    pub(crate) lut: LutCache,
}

impl Clone for ColorSpaceData {
    fn clone(&self) -> Self {
        Self {
            named: self.named,
            color_model: self.color_model,
            transform_model: self.transform_model,
            primaries: self.primaries,
            transfer: self.transfer,
            gamma: self.gamma,
            white_point: self.white_point,
            to_xyz: self.to_xyz,
            chad: self.chad,
            trc: self.trc.clone(),
            a_to_b: self.a_to_b.clone(),
            b_to_a: self.b_to_a.clone(),
            is_pcs_lab: self.is_pcs_lab,
            description: self.description.clone(),
            user_description: self.user_description.clone(),
            icc_profile: self.icc_profile.clone(),
            lut: LutCache::default(),
        }
    }
}

impl ColorSpaceData {
    fn from_points(
        points: ColorSpacePrimaries,
        transfer: TransferCurveKind,
        gamma: f32,
    ) -> ColorSpaceData {
        let mut data = ColorSpaceData {
            color_model: ColorModel::Rgb,
            ..Default::default()
        };
        data.set_points(points);
        data.set_transfer(transfer, gamma);
        data.identify();
        data
    }

    /// Pseudo descriptor whose device values are D50 XYZ.
    pub(crate) fn xyz() -> ColorSpaceData {
        ColorSpaceData {
            color_model: ColorModel::Rgb,
            transfer: TransferCurveKind::Linear,
            gamma: 1.,
            white_point: Xyz::D50,
            to_xyz: Matrix3f::IDENTITY,
            chad: Matrix3f::IDENTITY,
            trc: [ToneCurve::linear(), ToneCurve::linear(), ToneCurve::linear()],
            description: "XYZ".to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn set_points(&mut self, points: ColorSpacePrimaries) {
        let white = points.white.to_xyz();
        self.white_point = white;
        self.chad = adapt_to_d50(white).unwrap_or_default();
        self.to_xyz = points.to_xyz_matrix().unwrap_or_default();
        self.primaries = if self.to_xyz.is_valid() {
            Primaries::identify(&self.to_xyz)
        } else {
            Primaries::Custom
        };
    }

    pub(crate) fn set_gray_white_point(&mut self, white: Xyz) {
        self.white_point = white;
        self.chad = adapt_to_d50(white).unwrap_or_default();
        self.to_xyz = self.chad;
        self.primaries = Primaries::Custom;
    }

    pub(crate) fn set_transfer(&mut self, transfer: TransferCurveKind, gamma: f32) {
        if let Some(curve) = transfer.curve(gamma) {
            self.trc = [curve.clone(), curve.clone(), curve];
            self.transfer = transfer;
            self.gamma = transfer.nominal_gamma(gamma);
        }
    }

    pub(crate) fn set_curves(&mut self, curves: [ToneCurve; 3]) {
        let shared = curves[0] == curves[1] && curves[0] == curves[2];
        let (kind, gamma) = if shared {
            classify_curve(&curves[0])
        } else {
            (TransferCurveKind::Custom, 0.)
        };
        self.trc = curves;
        self.transfer = kind;
        self.gamma = gamma;
    }

    /// Recognizes built-in spaces and fills in their description.
    pub(crate) fn identify(&mut self) {
        self.named = None;
        if self.color_model != ColorModel::Rgb
            || self.transform_model != TransformModel::ThreeComponentMatrix
        {
            return;
        }
        for named in NamedColorSpace::ALL {
            let (primaries, transfer, gamma) = named.definition();
            if self.primaries == primaries
                && self.transfer == transfer
                && (transfer != TransferCurveKind::Gamma || (self.gamma - gamma).abs() <= 1. / 512.)
            {
                self.named = Some(named);
                if self.description.is_empty() {
                    self.description = named.description().to_string();
                }
                return;
            }
        }
    }

    pub(crate) fn is_three_component_matrix(&self) -> bool {
        self.transform_model == TransformModel::ThreeComponentMatrix
    }

    pub(crate) fn is_valid(&self) -> bool {
        match self.color_model {
            ColorModel::Undefined => false,
            _ if !self.is_three_component_matrix() => !self.a_to_b.is_empty(),
            ColorModel::Cmyk => false,
            ColorModel::Gray => {
                self.to_xyz.is_valid() && self.white_point.is_valid() && self.trc[0].is_valid()
            }
            ColorModel::Rgb => {
                self.to_xyz.is_valid() && self.trc.iter().all(|c| c.is_valid())
            }
        }
    }

    pub(crate) fn equals(&self, other: &ColorSpaceData) -> bool {
        if let (Some(a), Some(b)) = (self.named, other.named) {
            return a == b;
        }
        let valid = self.is_valid();
        if valid != other.is_valid() {
            return false;
        }
        if !valid {
            let a = self.icc_profile.get().map(|x| x.as_slice()).unwrap_or_default();
            let b = other.icc_profile.get().map(|x| x.as_slice()).unwrap_or_default();
            return !(a.is_empty() && b.is_empty()) && a == b;
        }
        if self.color_model != other.color_model
            || self.transform_model != other.transform_model
        {
            return false;
        }
        if self.is_three_component_matrix() {
            if self.primaries != Primaries::Custom && other.primaries != Primaries::Custom {
                if self.primaries != other.primaries {
                    return false;
                }
            } else if self.to_xyz != other.to_xyz {
                return false;
            }
            if self.transfer != TransferCurveKind::Custom
                && other.transfer != TransferCurveKind::Custom
            {
                if self.transfer != other.transfer {
                    return false;
                }
                if self.transfer == TransferCurveKind::Gamma {
                    return (self.gamma - other.gamma).abs() <= 1. / 512.;
                }
                return true;
            }
            return self.trc == other.trc;
        }
        self.is_pcs_lab == other.is_pcs_lab
            && self.a_to_b == other.a_to_b
            && self.b_to_a == other.b_to_a
    }

    fn clear_element_lists_for_edit(&mut self) {
        if self.transform_model == TransformModel::ElementListProcessing {
            self.transform_model = TransformModel::ThreeComponentMatrix;
            self.a_to_b.clear();
            self.b_to_a.clear();
            self.is_pcs_lab = false;
            self.to_xyz = Matrix3f::default();
            self.chad = Matrix3f::IDENTITY;
        }
    }
}

fn named_data(named: NamedColorSpace) -> Arc<ColorSpaceData> {
    static REGISTRY: [OnceLock<Arc<ColorSpaceData>>; 8] = [const { OnceLock::new() }; 8];
    REGISTRY[named as usize - 1]
        .get_or_init(|| {
            let (primaries, transfer, gamma) = named.definition();
            let points = primaries.points().unwrap_or_default();
            let mut data = ColorSpaceData::from_points(points, transfer, gamma);
            data.named = Some(named);
            data.description = named.description().to_string();
            Arc::new(data)
        })
        .clone()
}

/// Color space descriptor.
///
/// Cheap to clone, clones share one immutable descriptor. Setters copy the
/// descriptor first when it is shared.
#[derive(Debug, Clone, Default)]
pub struct ColorSpace {
    pub(crate) d: Arc<ColorSpaceData>,
}

impl PartialEq for ColorSpace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.d, &other.d) || self.d.equals(&other.d)
    }
}

impl From<NamedColorSpace> for ColorSpace {
    fn from(value: NamedColorSpace) -> Self {
        ColorSpace::named(value)
    }
}

impl ColorSpace {
    pub(crate) fn from_data(data: ColorSpaceData) -> ColorSpace {
        ColorSpace { d: Arc::new(data) }
    }

    /// Canonical shared instance of a built-in color space.
    pub fn named(named: NamedColorSpace) -> ColorSpace {
        ColorSpace {
            d: named_data(named),
        }
    }

    pub fn new(primaries: Primaries, transfer: TransferCurveKind, gamma: f32) -> ColorSpace {
        let points = primaries.points().unwrap_or_default();
        ColorSpace::from_data(ColorSpaceData::from_points(points, transfer, gamma))
    }

    pub fn new_custom(
        points: ColorSpacePrimaries,
        transfer: TransferCurveKind,
        gamma: f32,
    ) -> ColorSpace {
        ColorSpace::from_data(ColorSpaceData::from_points(points, transfer, gamma))
    }

    /// RGB space sharing one sampled curve across the channels.
    pub fn from_primaries_and_table(points: ColorSpacePrimaries, table: TransferTable) -> ColorSpace {
        let curve = ToneCurve::from(table);
        ColorSpace::from_primaries_and_curves(points, [curve.clone(), curve.clone(), curve])
    }

    pub fn from_primaries_and_tables(
        points: ColorSpacePrimaries,
        red: TransferTable,
        green: TransferTable,
        blue: TransferTable,
    ) -> ColorSpace {
        ColorSpace::from_primaries_and_curves(
            points,
            [
                ToneCurve::from(red),
                ToneCurve::from(green),
                ToneCurve::from(blue),
            ],
        )
    }

    fn from_primaries_and_curves(points: ColorSpacePrimaries, curves: [ToneCurve; 3]) -> ColorSpace {
        let mut data = ColorSpaceData {
            color_model: ColorModel::Rgb,
            ..Default::default()
        };
        data.set_points(points);
        data.set_curves(curves);
        data.identify();
        ColorSpace::from_data(data)
    }

    pub fn new_gray(white: Chromaticity, transfer: TransferCurveKind, gamma: f32) -> ColorSpace {
        let mut data = ColorSpaceData {
            color_model: ColorModel::Gray,
            ..Default::default()
        };
        data.set_gray_white_point(white.to_xyz());
        data.set_transfer(transfer, gamma);
        ColorSpace::from_data(data)
    }

    pub fn new_gray_from_table(white: Chromaticity, table: TransferTable) -> ColorSpace {
        let mut data = ColorSpaceData {
            color_model: ColorModel::Gray,
            ..Default::default()
        };
        data.set_gray_white_point(white.to_xyz());
        let curve = ToneCurve::from(table);
        data.set_curves([curve.clone(), curve.clone(), curve]);
        ColorSpace::from_data(data)
    }

    /// Element list descriptor, `a_to_b` maps device values to the PCS and
    /// `b_to_a` maps back.
    pub fn from_element_lists(
        model: ColorModel,
        pcs_lab: bool,
        a_to_b: Vec<Element>,
        b_to_a: Vec<Element>,
    ) -> ColorSpace {
        ColorSpace::from_data(ColorSpaceData {
            color_model: model,
            transform_model: TransformModel::ElementListProcessing,
            is_pcs_lab: pcs_lab,
            white_point: Xyz::D50,
            to_xyz: Matrix3f::IDENTITY,
            chad: Matrix3f::IDENTITY,
            a_to_b,
            b_to_a,
            ..Default::default()
        })
    }

    /// Parses an ICC profile.
    ///
    /// Malformed profiles produce an invalid descriptor that still reports the
    /// given bytes from [ColorSpace::icc_profile].
    pub fn from_icc_profile(bytes: &[u8]) -> ColorSpace {
        Self::from_icc_profile_with_options(bytes, &ParsingOptions::default())
    }

    pub fn from_icc_profile_with_options(bytes: &[u8], options: &ParsingOptions) -> ColorSpace {
        match Self::try_from_icc_profile_with_options(bytes, options) {
            Ok(space) => space,
            Err(err) => {
                log::debug!("Failed to parse ICC profile: {err}");
                ColorSpace::from_data(ColorSpaceData {
                    icc_profile: OnceLock::from(bytes.to_vec()),
                    ..Default::default()
                })
            }
        }
    }

    pub fn try_from_icc_profile(bytes: &[u8]) -> Result<ColorSpace, CmsError> {
        Self::try_from_icc_profile_with_options(bytes, &ParsingOptions::default())
    }

    pub fn try_from_icc_profile_with_options(
        bytes: &[u8],
        options: &ParsingOptions,
    ) -> Result<ColorSpace, CmsError> {
        let mut data = crate::reader::parse_profile(bytes, options)?;
        data.icc_profile = OnceLock::from(bytes.to_vec());
        Ok(ColorSpace::from_data(data))
    }

    /// Encodes the descriptor as an ICC profile.
    pub fn to_icc_bytes(&self) -> Result<Vec<u8>, CmsError> {
        if let Some(bytes) = self.d.icc_profile.get() {
            return Ok(bytes.clone());
        }
        let bytes = crate::writer::encode_profile(&self.d)?;
        Ok(self.d.icc_profile.get_or_init(|| bytes).clone())
    }

    /// ICC bytes this descriptor came from or encodes to, empty if it cannot be encoded.
    pub fn icc_profile(&self) -> Vec<u8> {
        match self.to_icc_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::debug!("Color space is not expressible as ICC profile: {err}");
                Vec::new()
            }
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.d.is_valid()
    }

    #[inline]
    pub fn named_color_space(&self) -> Option<NamedColorSpace> {
        self.d.named
    }

    #[inline]
    pub fn color_model(&self) -> ColorModel {
        self.d.color_model
    }

    #[inline]
    pub fn transform_model(&self) -> TransformModel {
        self.d.transform_model
    }

    #[inline]
    pub fn primaries(&self) -> Primaries {
        self.d.primaries
    }

    #[inline]
    pub fn transfer_function(&self) -> TransferCurveKind {
        self.d.transfer
    }

    #[inline]
    pub fn gamma(&self) -> f32 {
        self.d.gamma
    }

    #[inline]
    pub fn is_pcs_lab(&self) -> bool {
        self.d.is_pcs_lab
    }

    /// RGB or Gray to D50 XYZ.
    #[inline]
    pub fn to_xyz_matrix(&self) -> Matrix3f {
        self.d.to_xyz
    }

    #[inline]
    pub fn tone_curves(&self) -> &[ToneCurve; 3] {
        &self.d.trc
    }

    #[inline]
    pub fn a_to_b(&self) -> &[Element] {
        &self.d.a_to_b
    }

    #[inline]
    pub fn b_to_a(&self) -> &[Element] {
        &self.d.b_to_a
    }

    pub fn white_point(&self) -> Option<Chromaticity> {
        if !self.d.is_three_component_matrix() {
            return None;
        }
        Chromaticity::try_from(self.d.white_point).ok()
    }

    /// Chromaticities of the primaries, recovered from the D50 matrix for custom spaces.
    pub fn primary_points(&self) -> Option<ColorSpacePrimaries> {
        if self.d.color_model != ColorModel::Rgb || !self.d.is_three_component_matrix() {
            return None;
        }
        if let Some(points) = self.d.primaries.points() {
            return Some(points);
        }
        let native = self.d.chad.inverse()?.mat_mul(self.d.to_xyz);
        let column = |i: usize| Chromaticity::try_from(Xyz::from_vector(native.column(i))).ok();
        Some(ColorSpacePrimaries {
            white: Chromaticity::try_from(self.d.white_point).ok()?,
            red: column(0)?,
            green: column(1)?,
            blue: column(2)?,
        })
    }

    pub fn description(&self) -> &str {
        if self.d.user_description.is_empty() {
            &self.d.description
        } else {
            &self.d.user_description
        }
    }

    /// Unique access to the descriptor, invalidating derived state.
    fn edit(&mut self) -> &mut ColorSpaceData {
        let d = Arc::make_mut(&mut self.d);
        d.icc_profile = OnceLock::new();
        d.lut = LutCache::default();
        d
    }

    fn finish_edit(&mut self) {
        let d = Arc::make_mut(&mut self.d);
        d.description.clear();
        d.identify();
    }

    pub fn set_primaries(&mut self, primaries: Primaries) {
        let Some(points) = primaries.points() else {
            log::debug!("Custom primaries need explicit points");
            return;
        };
        self.set_custom_primaries(points);
    }

    pub fn set_custom_primaries(&mut self, points: ColorSpacePrimaries) {
        if !points.is_valid() {
            log::debug!("Ignoring invalid primaries {points:?}");
            return;
        }
        let d = self.edit();
        d.clear_element_lists_for_edit();
        d.color_model = ColorModel::Rgb;
        d.set_points(points);
        self.finish_edit();
    }

    pub fn set_white_point(&mut self, white: Chromaticity) {
        if !white.is_valid() {
            log::debug!("Ignoring invalid white point {white:?}");
            return;
        }
        match self.d.color_model {
            ColorModel::Gray if self.d.is_three_component_matrix() => {
                self.edit().set_gray_white_point(white.to_xyz());
                self.finish_edit();
            }
            ColorModel::Rgb if self.d.is_three_component_matrix() => {
                let Some(mut points) = self.primary_points() else {
                    return;
                };
                points.white = white;
                self.edit().set_points(points);
                self.finish_edit();
            }
            _ => log::debug!("White point can only be set on matrix based RGB or Gray spaces"),
        }
    }

    pub fn set_transfer_function(&mut self, transfer: TransferCurveKind, gamma: f32) {
        if transfer == TransferCurveKind::Custom || self.d.color_model == ColorModel::Cmyk {
            log::debug!("Ignoring transfer function {transfer:?}");
            return;
        }
        let d = self.edit();
        d.clear_element_lists_for_edit();
        if d.color_model == ColorModel::Undefined {
            d.color_model = ColorModel::Rgb;
        }
        d.set_transfer(transfer, gamma);
        self.finish_edit();
    }

    pub fn with_transfer_function(&self, transfer: TransferCurveKind, gamma: f32) -> ColorSpace {
        let mut space = self.clone();
        space.set_transfer_function(transfer, gamma);
        space
    }

    pub fn set_transfer_table(&mut self, table: TransferTable) {
        let curve = ToneCurve::from(table);
        self.set_curves([curve.clone(), curve.clone(), curve]);
    }

    pub fn set_transfer_tables(
        &mut self,
        red: TransferTable,
        green: TransferTable,
        blue: TransferTable,
    ) {
        self.set_curves([
            ToneCurve::from(red),
            ToneCurve::from(green),
            ToneCurve::from(blue),
        ]);
    }

    fn set_curves(&mut self, curves: [ToneCurve; 3]) {
        if self.d.color_model == ColorModel::Cmyk {
            return;
        }
        let d = self.edit();
        d.clear_element_lists_for_edit();
        if d.color_model == ColorModel::Undefined {
            d.color_model = ColorModel::Rgb;
        }
        d.set_curves(curves);
        self.finish_edit();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.edit().user_description = description.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    #[test]
    fn test_named_singletons() {
        let a = ColorSpace::named(NamedColorSpace::SRgb);
        let b = ColorSpace::from(NamedColorSpace::SRgb);
        assert!(Arc::ptr_eq(&a.d, &b.d));
        for named in NamedColorSpace::ALL {
            let space = ColorSpace::named(named);
            assert!(space.is_valid(), "{named:?}");
            assert_eq!(space.named_color_space(), Some(named));
            assert_eq!(space.description(), named.description());
        }
    }

    #[test]
    fn test_construction_identifies_named() {
        let space = ColorSpace::new(Primaries::DciP3D65, TransferCurveKind::SRgb, 0.);
        assert_eq!(space.named_color_space(), Some(NamedColorSpace::DisplayP3));
        assert_eq!(space, ColorSpace::named(NamedColorSpace::DisplayP3));
        let adobe = ColorSpace::new(Primaries::AdobeRgb, TransferCurveKind::Gamma, 2.2);
        assert_eq!(adobe.named_color_space(), Some(NamedColorSpace::AdobeRgb));
        let custom = ColorSpace::new(Primaries::AdobeRgb, TransferCurveKind::Gamma, 1.9);
        assert_eq!(custom.named_color_space(), None);
        assert_ne!(custom, adobe);
    }

    #[test]
    fn test_copy_on_write() {
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let mut edited = srgb.clone();
        edited.set_transfer_function(TransferCurveKind::Linear, 1.);
        assert_eq!(edited.named_color_space(), Some(NamedColorSpace::SRgbLinear));
        assert_eq!(srgb.transfer_function(), TransferCurveKind::SRgb);
        assert_eq!(
            ColorSpace::named(NamedColorSpace::SRgb).transfer_function(),
            TransferCurveKind::SRgb
        );
        let with = srgb.with_transfer_function(TransferCurveKind::Gamma, 2.2);
        assert_eq!(with.transfer_function(), TransferCurveKind::Gamma);
        assert_eq!(with.gamma(), 2.2);
        assert_eq!(with.primaries(), Primaries::SRgb);
        assert_eq!(with.named_color_space(), None);
    }

    #[test]
    fn test_equality_rules() {
        let table = TransferTable::from_fn(256, TableKind::TwoWay, |x| {
            TransferFunction::gamma(1.7).apply(x)
        });
        let a = ColorSpace::from_primaries_and_table(ColorSpacePrimaries::SRGB, table.clone());
        let b = ColorSpace::from_primaries_and_table(ColorSpacePrimaries::SRGB, table);
        assert_eq!(a.transfer_function(), TransferCurveKind::Custom);
        assert_eq!(a, b);
        assert_ne!(a, ColorSpace::named(NamedColorSpace::SRgb));
        assert_ne!(ColorSpace::default(), ColorSpace::default());
        let broken = ColorSpace::from_icc_profile(b"not a profile");
        assert!(!broken.is_valid());
        assert_eq!(broken.icc_profile(), b"not a profile".to_vec());
        assert_eq!(broken, ColorSpace::from_icc_profile(b"not a profile"));
        assert_ne!(broken, ColorSpace::named(NamedColorSpace::SRgb));
    }

    #[test]
    fn test_primary_points_round_trip() {
        let space = ColorSpace::new_custom(ColorSpacePrimaries::ADOBE_RGB, TransferCurveKind::Linear, 1.);
        assert_eq!(space.primaries(), Primaries::AdobeRgb);
        let custom = ColorSpacePrimaries::new(
            Chromaticity::D50,
            Chromaticity::new(0.67, 0.32),
            Chromaticity::new(0.22, 0.7),
            Chromaticity::new(0.14, 0.08),
        );
        let space = ColorSpace::new_custom(custom, TransferCurveKind::Linear, 1.);
        assert_eq!(space.primaries(), Primaries::Custom);
        let points = space.primary_points().unwrap();
        for (a, b) in [
            (points.red, custom.red),
            (points.green, custom.green),
            (points.blue, custom.blue),
            (points.white, custom.white),
        ] {
            assert!((a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3, "{a:?} {b:?}");
        }
    }

    #[test]
    fn test_white_point_edit() {
        let mut space = ColorSpace::named(NamedColorSpace::SRgb);
        space.set_white_point(Chromaticity::D50);
        assert_eq!(space.primaries(), Primaries::Custom);
        let white = space.white_point().unwrap();
        assert!((white.x - Chromaticity::D50.x).abs() < 1e-4);
        let mut gray = ColorSpace::new_gray(Chromaticity::D65, TransferCurveKind::Gamma, 2.2);
        assert!(gray.is_valid());
        gray.set_white_point(Chromaticity::D50);
        assert!(gray.to_xyz_matrix().is_identity());
    }

    #[test]
    fn test_invalid_descriptors() {
        assert!(!ColorSpace::default().is_valid());
        let degenerate = ColorSpacePrimaries::new(
            Chromaticity::D65,
            Chromaticity::new(0.1, 0.1),
            Chromaticity::new(0.2, 0.2),
            Chromaticity::new(0.3, 0.3),
        );
        assert!(!ColorSpace::new_custom(degenerate, TransferCurveKind::SRgb, 0.).is_valid());
        assert!(!ColorSpace::new(Primaries::SRgb, TransferCurveKind::Custom, 0.).is_valid());
        assert!(
            !ColorSpace::from_element_lists(ColorModel::Rgb, false, vec![], vec![]).is_valid()
        );
    }
}
