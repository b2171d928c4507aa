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
use crate::cicp::{CicpColorPrimaries, CicpProfile, CicpTransferCharacteristics};
use crate::clut::ColorClut;
use crate::color_space::{ColorModel, ColorSpaceData, TransformModel};
use crate::dat::ColorDateTime;
use crate::element::{CurveSet, Element};
use crate::err::CmsError;
use crate::helpers::float_to_s15_fixed16_number;
use crate::matrix::{Matrix3f, Vector3f, Xyz};
use crate::profile::{
    ACSP_SIGNATURE, DataColorSpace, ProfileClass, ProfileHeader, ProfileVersion,
    RenderingIntent, TAG_TABLE_OFFSET,
};
use crate::reader::LutDirection;
use crate::tag::*;
use crate::trc::ToneCurve;

const COPYRIGHT: &str = "No copyright, use freely";

#[inline]
pub(crate) fn write_u16_be(into: &mut Vec<u8>, v: u16) {
    into.extend_from_slice(&v.to_be_bytes());
}

#[inline]
pub(crate) fn write_u32_be(into: &mut Vec<u8>, v: u32) {
    into.extend_from_slice(&v.to_be_bytes());
}

#[inline]
pub(crate) fn write_s15_fixed16(into: &mut Vec<u8>, v: f32) {
    into.extend_from_slice(&float_to_s15_fixed16_number(v).to_be_bytes());
}

pub(crate) fn write_xyz(into: &mut Vec<u8>, xyz: Xyz) {
    write_s15_fixed16(into, xyz.x);
    write_s15_fixed16(into, xyz.y);
    write_s15_fixed16(into, xyz.z);
}

fn write_matrix(into: &mut Vec<u8>, matrix: &Matrix3f) {
    for row in matrix.v.iter() {
        for &value in row.iter() {
            write_s15_fixed16(into, value);
        }
    }
}

fn write_vector(into: &mut Vec<u8>, v: Vector3f) {
    for &value in v.v.iter() {
        write_s15_fixed16(into, value);
    }
}

#[inline]
fn write_type(into: &mut Vec<u8>, tag_type: TagTypeDefinition) {
    write_u32_be(into, u32::from(tag_type));
    write_u32_be(into, 0);
}

#[inline]
fn pad_to_4(into: &mut Vec<u8>) {
    into.resize(into.len().next_multiple_of(4), 0);
}

#[inline]
fn quantize_u16(v: f32) -> u16 {
    (v.max(0.).min(1.) * 65535. + 0.5) as u16
}

fn encode_xyz_tag(xyz: Xyz) -> Vec<u8> {
    let mut tag = Vec::with_capacity(20);
    write_type(&mut tag, TagTypeDefinition::Xyz);
    write_xyz(&mut tag, xyz);
    tag
}

fn encode_chad_tag(matrix: &Matrix3f) -> Vec<u8> {
    let mut tag = Vec::with_capacity(44);
    write_type(&mut tag, TagTypeDefinition::S15Fixed16Array);
    write_matrix(&mut tag, matrix);
    tag
}

fn encode_cicp_tag(cicp: CicpProfile) -> Vec<u8> {
    let mut tag = Vec::with_capacity(12);
    write_type(&mut tag, TagTypeDefinition::Cicp);
    tag.push(cicp.color_primaries.into());
    tag.push(cicp.transfer_characteristics.into());
    tag.push(cicp.matrix_coefficients);
    tag.push(cicp.full_range as u8);
    tag
}

/// Single `enUS` record.
fn encode_mluc_tag(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut tag = Vec::with_capacity(28 + units.len() * 2);
    write_type(&mut tag, TagTypeDefinition::MultiLocalizedUnicode);
    write_u32_be(&mut tag, 1);
    write_u32_be(&mut tag, 12);
    tag.extend_from_slice(b"enUS");
    write_u32_be(&mut tag, (units.len() * 2) as u32);
    write_u32_be(&mut tag, 28);
    for unit in units {
        write_u16_be(&mut tag, unit);
    }
    tag
}

/// `curv` for tables and the identity, `para` for closed form curves.
pub(crate) fn encode_curve(curve: &ToneCurve) -> Vec<u8> {
    let mut tag = Vec::new();
    match curve {
        ToneCurve::Function(function) if !function.is_identity() => {
            let (kind, params) = function.to_parametric();
            write_type(&mut tag, TagTypeDefinition::ParametricCurve);
            write_u16_be(&mut tag, kind);
            write_u16_be(&mut tag, 0);
            for param in params {
                write_s15_fixed16(&mut tag, param);
            }
        }
        ToneCurve::Table(table) => {
            write_type(&mut tag, TagTypeDefinition::Curve);
            write_u32_be(&mut tag, table.len() as u32);
            for sample in table.to_u16() {
                write_u16_be(&mut tag, sample);
            }
        }
        _ => {
            write_type(&mut tag, TagTypeDefinition::Curve);
            write_u32_be(&mut tag, 0);
        }
    }
    tag
}

/// Stages of an element list sorted into the slots of an `mAB `/`mBA ` tag.
#[derive(Default)]
struct LutStages<'a> {
    a: Option<&'a CurveSet>,
    clut: Option<&'a ColorClut>,
    m: Option<&'a CurveSet>,
    matrix: Option<Matrix3f>,
    offset: Option<Vector3f>,
    b: Option<&'a CurveSet>,
}

impl<'a> LutStages<'a> {
    /// Walks the list from the device side, so `mBA ` lists are read backwards.
    fn split(elements: &'a [Element], direction: LutDirection) -> Result<Self, CmsError> {
        let ordered: Vec<&'a Element> = match direction {
            LutDirection::DeviceToPcs => elements.iter().collect(),
            LutDirection::PcsToDevice => elements.iter().rev().collect(),
        };
        let mut stages = LutStages::default();
        let mut i = 0;
        if let Some(Element::Curves(curves)) = ordered.get(i).copied() {
            if ordered[i + 1..].iter().any(|x| matches!(x, Element::Clut(_))) {
                stages.a = Some(curves);
                i += 1;
            }
        }
        if let Some(Element::Clut(clut)) = ordered.get(i).copied() {
            stages.clut = Some(clut);
            i += 1;
        }
        if let Some(Element::Curves(curves)) = ordered.get(i).copied() {
            if matches!(
                ordered.get(i + 1).copied(),
                Some(Element::Matrix(_) | Element::Offset(_))
            ) {
                stages.m = Some(curves);
                i += 1;
            }
        }
        let mut take_matrix = |i: &mut usize| {
            if let Some(Element::Matrix(matrix)) = ordered.get(*i).copied() {
                stages.matrix = Some(*matrix);
                *i += 1;
            }
        };
        match direction {
            LutDirection::DeviceToPcs => {
                take_matrix(&mut i);
                if let Some(Element::Offset(offset)) = ordered.get(i).copied() {
                    stages.offset = Some(*offset);
                    i += 1;
                }
            }
            LutDirection::PcsToDevice => {
                if let Some(Element::Offset(offset)) = ordered.get(i).copied() {
                    stages.offset = Some(*offset);
                    i += 1;
                }
                take_matrix(&mut i);
            }
        }
        if let Some(Element::Curves(curves)) = ordered.get(i).copied() {
            stages.b = Some(curves);
            i += 1;
        }
        if i != ordered.len() {
            return Err(CmsError::UnsupportedWriterShape);
        }
        Ok(stages)
    }

    fn check_channels(&self, device_channels: usize, direction: LutDirection) -> Result<(), CmsError> {
        let curves_fit = |set: Option<&CurveSet>, channels: usize| {
            set.map(|x| x.channels() == channels).unwrap_or(true)
        };
        let clut_fits = match self.clut {
            Some(clut) => {
                let (inputs, outputs) = match direction {
                    LutDirection::DeviceToPcs => (device_channels, 3),
                    LutDirection::PcsToDevice => (3, device_channels),
                };
                clut.input_channels() == inputs && clut.output_channels() == outputs
            }
            None => device_channels == 3,
        };
        if clut_fits
            && curves_fit(self.a, device_channels)
            && curves_fit(self.m, 3)
            && curves_fit(self.b, 3)
        {
            Ok(())
        } else {
            Err(CmsError::UnsupportedWriterShape)
        }
    }

    /// lut16 carries a uniform CLUT between sampled curves of equal length.
    fn fits_lut16(&self, direction: LutDirection) -> bool {
        let tables_fit = |set: Option<&CurveSet>| {
            let Some(set) = set else {
                return true;
            };
            let lengths: Vec<Option<usize>> = set
                .curves
                .iter()
                .map(|x| x.table().map(|t| t.len()))
                .collect();
            match lengths.first() {
                Some(Some(len)) => {
                    (2..=4096).contains(len) && lengths.iter().all(|x| *x == Some(*len))
                }
                _ => false,
            }
        };
        let Some(clut) = self.clut else {
            return false;
        };
        clut.is_uniform()
            && self.m.is_none()
            && self.offset.is_none()
            && (self.matrix.is_none() || direction == LutDirection::PcsToDevice)
            && tables_fit(self.a)
            && tables_fit(self.b)
    }
}

fn identity_curves(channels: usize) -> CurveSet {
    CurveSet::new(vec![ToneCurve::linear(); channels])
}

fn write_curve_set(into: &mut Vec<u8>, set: &CurveSet) {
    for curve in set.curves.iter() {
        into.extend_from_slice(&encode_curve(curve));
        pad_to_4(into);
    }
}

fn write_clut_values(into: &mut Vec<u8>, clut: &ColorClut) {
    let outputs = clut.output_channels();
    for cell in clut.table() {
        for &value in cell.v[..outputs].iter() {
            write_u16_be(into, quantize_u16(value));
        }
    }
}

fn encode_lut_ab(
    stages: &LutStages,
    direction: LutDirection,
    device_channels: usize,
) -> Vec<u8> {
    let (inputs, outputs, tag_type) = match direction {
        LutDirection::DeviceToPcs => (device_channels, 3, TagTypeDefinition::MabLut),
        LutDirection::PcsToDevice => (3, device_channels, TagTypeDefinition::MbaLut),
    };
    let mut tag = Vec::new();
    write_type(&mut tag, tag_type);
    tag.extend_from_slice(&[inputs as u8, outputs as u8, 0, 0]);
    // B, matrix, M, CLUT, A offsets are patched in below.
    tag.resize(32, 0);

    let patch = |tag: &mut Vec<u8>, slot: usize| {
        let offset = (tag.len() as u32).to_be_bytes();
        tag[12 + slot * 4..16 + slot * 4].copy_from_slice(&offset);
    };

    let b = stages.b.cloned().unwrap_or_else(|| identity_curves(3));
    patch(&mut tag, 0);
    write_curve_set(&mut tag, &b);

    if stages.matrix.is_some() || stages.offset.is_some() || stages.m.is_some() {
        patch(&mut tag, 1);
        write_matrix(&mut tag, &stages.matrix.unwrap_or(Matrix3f::IDENTITY));
        write_vector(&mut tag, stages.offset.unwrap_or_default());
        let m = stages.m.cloned().unwrap_or_else(|| identity_curves(3));
        patch(&mut tag, 2);
        write_curve_set(&mut tag, &m);
    }

    if let Some(clut) = stages.clut {
        patch(&mut tag, 3);
        let mut grid = [0u8; 16];
        grid[..clut.grid().len()].copy_from_slice(clut.grid());
        tag.extend_from_slice(&grid);
        tag.extend_from_slice(&[2, 0, 0, 0]);
        write_clut_values(&mut tag, clut);
        pad_to_4(&mut tag);
        let a = stages
            .a
            .cloned()
            .unwrap_or_else(|| identity_curves(device_channels));
        patch(&mut tag, 4);
        write_curve_set(&mut tag, &a);
    }
    tag
}

fn write_lut16_tables(into: &mut Vec<u8>, set: Option<&CurveSet>, channels: usize) -> u16 {
    let Some(set) = set else {
        for _ in 0..channels {
            write_u16_be(into, 0);
            write_u16_be(into, 65535);
        }
        return 2;
    };
    let mut entries = 0;
    for curve in set.curves.iter() {
        if let Some(table) = curve.table() {
            let samples = table.to_u16();
            entries = samples.len() as u16;
            for sample in samples {
                write_u16_be(into, sample);
            }
        }
    }
    entries
}

/// `mft2`, only reached for XYZ connection spaces.
fn encode_lut16(stages: &LutStages, direction: LutDirection, device_channels: usize) -> Vec<u8> {
    let (inputs, outputs) = match direction {
        LutDirection::DeviceToPcs => (device_channels, 3),
        LutDirection::PcsToDevice => (3, device_channels),
    };
    let (input_curves, output_curves) = match direction {
        LutDirection::DeviceToPcs => (stages.a, stages.b),
        LutDirection::PcsToDevice => (stages.b, stages.a),
    };
    let grid = stages.clut.map(|x| x.grid()[0]).unwrap_or(2);

    let mut tag = Vec::new();
    write_type(&mut tag, TagTypeDefinition::Lut16);
    tag.extend_from_slice(&[inputs as u8, outputs as u8, grid, 0]);
    write_matrix(&mut tag, &stages.matrix.unwrap_or(Matrix3f::IDENTITY));
    // entry counts are patched once the tables are written
    tag.extend_from_slice(&[0u8; 4]);

    let input_entries = write_lut16_tables(&mut tag, input_curves, inputs);
    if let Some(clut) = stages.clut {
        write_clut_values(&mut tag, clut);
    }
    let output_entries = write_lut16_tables(&mut tag, output_curves, outputs);
    tag[48..50].copy_from_slice(&input_entries.to_be_bytes());
    tag[50..52].copy_from_slice(&output_entries.to_be_bytes());
    tag
}

pub(crate) fn encode_lut(
    elements: &[Element],
    direction: LutDirection,
    model: ColorModel,
    pcs_lab: bool,
) -> Result<Vec<u8>, CmsError> {
    let device_channels = model.channels();
    let stages = LutStages::split(elements, direction)?;
    stages.check_channels(device_channels, direction)?;
    if !pcs_lab && stages.fits_lut16(direction) {
        return Ok(encode_lut16(&stages, direction, device_channels));
    }
    Ok(encode_lut_ab(&stages, direction, device_channels))
}

fn cicp_of(data: &ColorSpaceData) -> Option<CicpProfile> {
    Some(CicpProfile {
        color_primaries: CicpColorPrimaries::from_primaries(data.primaries)?,
        transfer_characteristics: CicpTransferCharacteristics::from_transfer(
            data.transfer,
            data.gamma,
        )?,
        matrix_coefficients: 0,
        full_range: true,
    })
}

/// Serializes a valid descriptor as an ICC v4 profile.
pub(crate) fn encode_profile(data: &ColorSpaceData) -> Result<Vec<u8>, CmsError> {
    if !data.is_valid() {
        return Err(CmsError::InvalidColorSpace);
    }
    let description = if data.user_description.is_empty() {
        &data.description
    } else {
        &data.user_description
    };
    let mut version = ProfileVersion::V4_0;
    let mut tags: Vec<(u32, Vec<u8>)> = vec![
        (DESC_TAG, encode_mluc_tag(description)),
        (CPRT_TAG, encode_mluc_tag(COPYRIGHT)),
        (WT_PT_TAG, encode_xyz_tag(Xyz::D50)),
    ];

    match (data.transform_model, data.color_model) {
        (TransformModel::ElementListProcessing, model) => {
            tags.push((
                A2B0_TAG,
                encode_lut(&data.a_to_b, LutDirection::DeviceToPcs, model, data.is_pcs_lab)?,
            ));
            if !data.b_to_a.is_empty() {
                tags.push((
                    B2A0_TAG,
                    encode_lut(&data.b_to_a, LutDirection::PcsToDevice, model, data.is_pcs_lab)?,
                ));
            }
        }
        (TransformModel::ThreeComponentMatrix, ColorModel::Rgb) => {
            let columns = [R_TAG_XYZ, G_TAG_XYZ, B_TAG_XYZ];
            for (i, signature) in columns.into_iter().enumerate() {
                tags.push((
                    signature,
                    encode_xyz_tag(Xyz::from_vector(data.to_xyz.column(i))),
                ));
            }
            for (signature, curve) in [R_TAG_TRC, G_TAG_TRC, B_TAG_TRC]
                .into_iter()
                .zip(data.trc.iter())
            {
                tags.push((signature, encode_curve(curve)));
            }
            if !data.chad.is_identity() {
                tags.push((CHAD_TAG, encode_chad_tag(&data.chad)));
            }
            if let Some(cicp) = cicp_of(data) {
                tags.push((CICP_TAG, encode_cicp_tag(cicp)));
                version = ProfileVersion::V4_3;
            }
        }
        (TransformModel::ThreeComponentMatrix, ColorModel::Gray) => {
            tags.push((K_TAG_TRC, encode_curve(&data.trc[0])));
            if !data.chad.is_identity() {
                tags.push((CHAD_TAG, encode_chad_tag(&data.chad)));
            }
        }
        _ => return Err(CmsError::InvalidColorSpace),
    }

    let data_color_space = match data.color_model {
        ColorModel::Rgb => DataColorSpace::Rgb,
        ColorModel::Gray => DataColorSpace::Gray,
        ColorModel::Cmyk => DataColorSpace::Cmyk,
        ColorModel::Undefined => return Err(CmsError::InvalidColorSpace),
    };
    let profile_class = match data.color_model {
        ColorModel::Cmyk => ProfileClass::OutputDevice,
        _ => ProfileClass::DisplayDevice,
    };
    let pcs = if data.is_pcs_lab {
        DataColorSpace::Lab
    } else {
        DataColorSpace::Xyz
    };

    // Identical payloads, like shared tone curves, are stored once.
    let mut entries: Vec<(u32, usize, usize)> = Vec::with_capacity(tags.len());
    let mut tag_data = Vec::new();
    let data_start = TAG_TABLE_OFFSET + tags.len() * TAG_SIZE;
    for (i, (signature, payload)) in tags.iter().enumerate() {
        let shared = tags[..i]
            .iter()
            .zip(entries.iter())
            .find(|((_, other), _)| other == payload)
            .map(|(_, &(_, offset, _))| offset);
        let offset = match shared {
            Some(offset) => offset,
            None => {
                let offset = data_start + tag_data.len();
                tag_data.extend_from_slice(payload);
                pad_to_4(&mut tag_data);
                offset
            }
        };
        entries.push((*signature, offset, payload.len()));
    }

    let size = data_start + tag_data.len();
    let header = ProfileHeader {
        size: u32::try_from(size).map_err(|_| CmsError::OverflowingError)?,
        cmm_type: 0,
        version,
        profile_class: profile_class.into(),
        data_color_space: data_color_space.into(),
        pcs: pcs.into(),
        creation_date_time: ColorDateTime::now(),
        signature: ACSP_SIGNATURE,
        platform: 0,
        flags: 0,
        device_manufacturer: 0,
        device_model: 0,
        device_attributes: 0,
        rendering_intent: RenderingIntent::Perceptual,
        illuminant: Xyz::D50,
        creator: 0,
        profile_id: [0; 16],
        tag_count: entries.len() as u32,
    };

    let mut profile = Vec::with_capacity(size);
    header.encode(&mut profile);
    for (signature, offset, len) in entries {
        write_u32_be(&mut profile, signature);
        write_u32_be(&mut profile, offset as u32);
        write_u32_be(&mut profile, len as u32);
    }
    profile.extend_from_slice(&tag_data);
    log::debug!("Encoded ICC profile '{description}' of {size} bytes");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_space::{ColorSpace, NamedColorSpace, TransferCurveKind};
    use crate::matrix::{Chromaticity, Vector4f};
    use crate::parametric::TransferFunction;
    use crate::primaries::{ColorSpacePrimaries, Primaries};
    use crate::profile::ParsingOptions;
    use crate::table::{TableKind, TransferTable};
    use rand::Rng;

    fn round_trip(space: &ColorSpace) -> ColorSpace {
        let bytes = space.to_icc_bytes().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        ColorSpace::try_from_icc_profile(&bytes).unwrap()
    }

    #[test]
    fn test_named_round_trip() {
        for named in NamedColorSpace::ALL {
            let space = ColorSpace::named(named);
            let decoded = round_trip(&space);
            assert_eq!(decoded.named_color_space(), Some(named), "{named:?}");
            assert_eq!(decoded, space);
            assert_eq!(decoded.description(), named.description());
        }
    }

    #[test]
    fn test_matrix_round_trip_keeps_white_point() {
        let points = ColorSpacePrimaries {
            white: Chromaticity::new(0.3127, 0.329),
            red: Chromaticity::new(0.68, 0.31),
            green: Chromaticity::new(0.21, 0.71),
            blue: Chromaticity::new(0.15, 0.05),
        };
        let space = ColorSpace::new_custom(points, TransferCurveKind::Gamma, 1.9);
        let decoded = round_trip(&space);
        assert_eq!(decoded.primaries(), Primaries::Custom);
        assert_eq!(decoded.transfer_function(), TransferCurveKind::Gamma);
        assert!((decoded.gamma() - 1.9).abs() < 1e-3);
        let white = decoded.white_point().unwrap();
        assert!((white.x - 0.3127).abs() < 1e-3);
        assert!((white.y - 0.329).abs() < 1e-3);
        assert_eq!(decoded, space);
    }

    #[test]
    fn test_shared_curve_payload() {
        let bytes = ColorSpace::named(NamedColorSpace::SRgb)
            .to_icc_bytes()
            .unwrap();
        let count = u32::from_be_bytes(bytes[128..132].try_into().unwrap()) as usize;
        let entry = |signature: u32| {
            (0..count)
                .map(|i| &bytes[132 + i * 12..144 + i * 12])
                .find(|x| u32::from_be_bytes(x[..4].try_into().unwrap()) == signature)
                .map(|x| u32::from_be_bytes(x[4..8].try_into().unwrap()))
                .unwrap()
        };
        assert_eq!(entry(R_TAG_TRC), entry(G_TAG_TRC));
        assert_eq!(entry(R_TAG_TRC), entry(B_TAG_TRC));
        assert_eq!(&bytes[36..40], b"acsp");
        assert_eq!(&bytes[8..10], &[4, 0x30]);
    }

    #[test]
    fn test_gray_round_trip() {
        let table = TransferTable::from_fn(256, TableKind::TwoWay, |x| x.powf(1.7));
        let space = ColorSpace::new_gray_from_table(Chromaticity::D65, table);
        let decoded = round_trip(&space);
        assert_eq!(decoded.color_model(), ColorModel::Gray);
        let white = decoded.white_point().unwrap();
        assert!((white.x - Chromaticity::D65.x).abs() < 1e-3);
        assert!((decoded.tone_curves()[0].apply(0.5) - 0.5f32.powf(1.7)).abs() < 1e-3);
    }

    #[test]
    fn test_custom_tables_round_trip() {
        let red = TransferTable::from_fn(1024, TableKind::TwoWay, |x| x.powf(2.0));
        let green = TransferTable::from_fn(1024, TableKind::TwoWay, |x| x.powf(2.2));
        let blue = TransferTable::from_fn(17, TableKind::TwoWay, |x| x * x * (3. - 2. * x));
        let space =
            ColorSpace::from_primaries_and_tables(ColorSpacePrimaries::SRGB, red, green, blue);
        let decoded = round_trip(&space);
        assert_eq!(decoded.transfer_function(), TransferCurveKind::Custom);
        let curves = decoded.tone_curves();
        assert!((curves[0].apply(0.5) - 0.25).abs() < 1e-3);
        assert!(curves[2].table().is_some());
    }

    fn rgb_lists() -> (Vec<Element>, Vec<Element>) {
        let gamma = ToneCurve::from(TransferFunction::gamma(2.2));
        let inverse = ToneCurve::from(TransferFunction::gamma(1. / 2.2));
        let to_xyz = ColorSpacePrimaries::SRGB.to_xyz_matrix().unwrap();
        let a_to_b = vec![
            Element::Curves(CurveSet::new(vec![gamma.clone(), gamma.clone(), gamma])),
            Element::Matrix(to_xyz),
            Element::Offset(Vector3f::new(0.001, 0., 0.)),
        ];
        let b_to_a = vec![
            Element::Matrix(to_xyz.inverse().unwrap()),
            Element::Offset(Vector3f::new(-0.001, 0., 0.)),
            Element::Curves(CurveSet::new(vec![inverse.clone(), inverse.clone(), inverse])),
        ];
        (a_to_b, b_to_a)
    }

    #[test]
    fn test_element_list_round_trip() {
        let (a_to_b, b_to_a) = rgb_lists();
        let space = ColorSpace::from_element_lists(ColorModel::Rgb, false, a_to_b, b_to_a);
        let decoded = round_trip(&space);
        assert_eq!(
            decoded.transform_model(),
            TransformModel::ElementListProcessing
        );
        assert_eq!(decoded.a_to_b().len(), 3);
        assert_eq!(decoded.b_to_a().len(), 3);
        assert_eq!(decoded, space);
    }

    #[test]
    fn test_cmyk_round_trip() {
        let mut rng = rand::rng();
        let clut = ColorClut::from_fn(vec![3, 3, 3, 3], 3, |c| {
            let k = 1. - c[3];
            Vector4f::new((1. - c[0]) * k, (1. - c[1]) * k, (1. - c[2]) * k, 0.)
        })
        .unwrap();
        let random: Vec<Vector4f> = (0..125)
            .map(|_| Vector4f::new(rng.random(), rng.random(), rng.random(), rng.random()))
            .collect();
        let back = ColorClut::new(vec![5, 5, 5], 4, random).unwrap();
        let space = ColorSpace::from_element_lists(
            ColorModel::Cmyk,
            true,
            vec![Element::Clut(clut)],
            vec![Element::Clut(back)],
        );
        let bytes = space.to_icc_bytes().unwrap();
        assert_eq!(&bytes[16..20], b"CMYK");
        assert_eq!(&bytes[20..24], b"Lab ");
        let decoded = ColorSpace::try_from_icc_profile(&bytes).unwrap();
        assert!(decoded.is_pcs_lab());
        assert_eq!(decoded.color_model(), ColorModel::Cmyk);
        let (Element::Clut(a), Element::Clut(b)) = (&decoded.a_to_b()[0], &space.a_to_b()[0])
        else {
            panic!("expected CLUT");
        };
        for (x, y) in a.table().iter().zip(b.table().iter()) {
            assert!((x.v[0] - y.v[0]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_lut16_for_sampled_curves() {
        let table = ToneCurve::from(TransferTable::from_fn(256, TableKind::OneWay, |x| {
            x.powf(1.5)
        }));
        let clut = ColorClut::from_fn(vec![9, 9, 9], 3, |c| Vector4f::new(c[0], c[1], c[2], 0.))
            .unwrap();
        let curves = CurveSet::new(vec![table.clone(), table.clone(), table]);
        let elements = vec![
            Element::Curves(curves.clone()),
            Element::Clut(clut),
            Element::Curves(curves),
        ];
        let tag = encode_lut(&elements, LutDirection::DeviceToPcs, ColorModel::Rgb, false)
            .unwrap();
        assert_eq!(&tag[..4], b"mft2");
        let parsed = crate::reader::read_lut_tag(
            &tag,
            LutDirection::DeviceToPcs,
            ColorModel::Rgb,
            false,
            &ParsingOptions::default(),
        )
        .unwrap();
        assert_eq!(parsed, elements);

        let lab = encode_lut(&elements, LutDirection::DeviceToPcs, ColorModel::Rgb, true).unwrap();
        assert_eq!(&lab[..4], b"mAB ");
    }

    #[test]
    fn test_unsupported_shapes() {
        let curves = Element::Curves(identity_curves(3));
        let matrix = Element::Matrix(Matrix3f::IDENTITY);
        assert_eq!(
            encode_lut(
                &[matrix.clone(), curves.clone(), matrix],
                LutDirection::DeviceToPcs,
                ColorModel::Rgb,
                false
            )
            .err(),
            Some(CmsError::UnsupportedWriterShape)
        );
        assert_eq!(
            encode_lut(&[curves], LutDirection::DeviceToPcs, ColorModel::Cmyk, false).err(),
            Some(CmsError::UnsupportedWriterShape)
        );
        assert_eq!(
            ColorSpace::default().to_icc_bytes().err(),
            Some(CmsError::InvalidColorSpace)
        );
    }
}
