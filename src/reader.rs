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
use crate::cicp::CicpProfile;
use crate::clut::ColorClut;
use crate::color_space::{ColorModel, ColorSpaceData, TransferCurveKind, TransformModel};
use crate::element::{CurveSet, Element};
use crate::err::{CmsError, MalformedSize};
use crate::helpers::{
    read_matrix_3d, read_s15_fixed16, read_u16_be, read_u32_be, read_vector_3d, read_xyz,
    utf16be_to_string,
};
use crate::matrix::{Matrix3f, Vector3f, Vector4f, Xyz};
use crate::parametric::TransferFunction;
use crate::primaries::Primaries;
use crate::profile::{
    ACSP_SIGNATURE, DataColorSpace, ParsingOptions, ProfileClass, ProfileHeader,
    TAG_TABLE_OFFSET,
};
use crate::safe_math::{SafeAdd, SafeMul};
use crate::table::{TableKind, TransferTable};
use crate::tag::*;
use crate::trc::ToneCurve;

/// lut16 tags store Lab with 100 at 0xFF00 instead of 0xFFFF.
const LEGACY_LAB_TO_LAB: f32 = 65535. / 65280.;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum LutDirection {
    DeviceToPcs,
    PcsToDevice,
}

#[derive(Debug, Copy, Clone)]
struct TagEntry {
    signature: u32,
    offset: usize,
    size: usize,
}

pub(crate) fn signature_name(signature: u32) -> String {
    String::from_utf8_lossy(&signature.to_be_bytes()).into_owned()
}

#[inline]
fn truncated(slice: &[u8], expected: usize) -> CmsError {
    CmsError::TruncatedProfile(MalformedSize {
        size: slice.len(),
        expected,
    })
}

#[inline]
fn sub_slice(slice: &[u8], start: usize, len: usize) -> Result<&[u8], CmsError> {
    let end = start.safe_add(len)?;
    slice.get(start..end).ok_or_else(|| truncated(slice, end))
}

#[inline]
fn tag_type(tag: &[u8]) -> Result<TagTypeDefinition, CmsError> {
    Ok(TagTypeDefinition::from(read_u32_be(tag, 0)?))
}

#[inline]
fn unexpected_type(tag_type: TagTypeDefinition) -> CmsError {
    CmsError::UnknownTagType(u32::from(tag_type))
}

fn read_xyz_tag(tag: &[u8]) -> Result<Xyz, CmsError> {
    match tag_type(tag)? {
        TagTypeDefinition::Xyz => read_xyz(sub_slice(tag, 8, 12)?),
        other => Err(unexpected_type(other)),
    }
}

fn read_chad_tag(tag: &[u8]) -> Result<Matrix3f, CmsError> {
    match tag_type(tag)? {
        TagTypeDefinition::S15Fixed16Array => read_matrix_3d(sub_slice(tag, 8, 36)?),
        other => Err(unexpected_type(other)),
    }
}

fn read_cicp_tag(tag: &[u8]) -> Result<CicpProfile, CmsError> {
    match tag_type(tag)? {
        TagTypeDefinition::Cicp => {
            let payload = sub_slice(tag, 8, 4)?;
            Ok(CicpProfile {
                color_primaries: payload[0].into(),
                transfer_characteristics: payload[1].into(),
                matrix_coefficients: payload[2],
                full_range: payload[3] == 1,
            })
        }
        other => Err(unexpected_type(other)),
    }
}

/// First record of `desc`, `mluc` or `text`.
fn read_description(tag: &[u8]) -> Result<String, CmsError> {
    match tag_type(tag)? {
        TagTypeDefinition::Description => {
            let length = read_u32_be(tag, 8)? as usize;
            let ascii = sub_slice(tag, 12, length)?;
            Ok(String::from_utf8_lossy(ascii)
                .trim_end_matches('\0')
                .to_string())
        }
        TagTypeDefinition::MultiLocalizedUnicode => {
            let records = read_u32_be(tag, 8)?;
            if records == 0 {
                return Ok(String::new());
            }
            let length = read_u32_be(tag, 20)? as usize;
            let offset = read_u32_be(tag, 24)? as usize;
            Ok(utf16be_to_string(sub_slice(tag, offset, length)?))
        }
        TagTypeDefinition::Text => Ok(String::from_utf8_lossy(tag.get(8..).unwrap_or_default())
            .trim_end_matches('\0')
            .to_string()),
        other => Err(unexpected_type(other)),
    }
}

/// Reads a `curv` or `para` curve, returning it with the number of bytes it occupies.
pub(crate) fn read_curve(
    tag: &[u8],
    kind: TableKind,
    options: &ParsingOptions,
) -> Result<(ToneCurve, usize), CmsError> {
    match tag_type(tag)? {
        TagTypeDefinition::Curve => {
            let entry_count = read_u32_be(tag, 8)? as usize;
            match entry_count {
                0 => Ok((ToneCurve::linear(), 12)),
                1 => {
                    // u8Fixed8Number
                    let gamma = read_u16_be(tag, 12)? as f32 / 256.;
                    if gamma <= 0. {
                        return Err(CmsError::InvalidTrcCurve);
                    }
                    Ok((ToneCurve::from(TransferFunction::gamma(gamma)), 14))
                }
                _ => {
                    if entry_count > options.max_allowed_trc_size {
                        return Err(CmsError::CurveLutIsTooLarge);
                    }
                    let curve_size = entry_count.safe_mul(2)?;
                    let samples = sub_slice(tag, 12, curve_size)?
                        .chunks_exact(2)
                        .map(|x| u16::from_be_bytes([x[0], x[1]]))
                        .collect();
                    let table = TransferTable::from_u16(samples, kind);
                    if !table.check_validity() {
                        return Err(CmsError::NonMonotonicTable);
                    }
                    let curve = match kind {
                        TableKind::TwoWay => match table.as_transfer_function() {
                            Some(function) => ToneCurve::from(function),
                            None => ToneCurve::from(table),
                        },
                        TableKind::OneWay => ToneCurve::from(table),
                    };
                    Ok((curve, 12 + curve_size))
                }
            }
        }
        TagTypeDefinition::ParametricCurve => {
            const COUNT_TO_LENGTH: [usize; 5] = [1, 3, 4, 5, 7]; //PARAMETRIC_CURVE_TYPE
            let function_type = read_u16_be(tag, 8)?;
            let count = *COUNT_TO_LENGTH
                .get(function_type as usize)
                .ok_or(CmsError::InvalidTrcCurve)?;
            let params = (0..count)
                .map(|i| read_s15_fixed16(tag, 12 + i * 4))
                .collect::<Result<Vec<f32>, CmsError>>()?;
            let function = TransferFunction::from_parametric(function_type, &params)?;
            Ok((ToneCurve::from(function), 12 + count * 4))
        }
        other => Err(unexpected_type(other)),
    }
}

#[inline]
fn read_trc(tag: &[u8], options: &ParsingOptions) -> Result<ToneCurve, CmsError> {
    read_curve(tag, TableKind::TwoWay, options).map(|(curve, _)| curve)
}

fn read_curve_set(
    tag: &[u8],
    offset: usize,
    channels: usize,
    options: &ParsingOptions,
) -> Result<CurveSet, CmsError> {
    let mut curves = Vec::with_capacity(channels);
    let mut position = offset;
    for _ in 0..channels {
        let nested = tag.get(position..).ok_or_else(|| truncated(tag, position))?;
        let (curve, size) = read_curve(nested, TableKind::OneWay, options)?;
        curves.push(curve);
        // 4 byte aligned
        position = position.safe_add(size.next_multiple_of(4))?;
    }
    Ok(CurveSet::new(curves))
}

fn read_samples(
    tag: &[u8],
    offset: &mut usize,
    count: usize,
    wide: bool,
) -> Result<Vec<f32>, CmsError> {
    let entry_size = if wide { 2 } else { 1 };
    let bytes = sub_slice(tag, *offset, count.safe_mul(entry_size)?)?;
    *offset += bytes.len();
    Ok(if wide {
        bytes
            .chunks_exact(2)
            .map(|x| u16::from_be_bytes([x[0], x[1]]) as f32 * (1. / 65535.))
            .collect()
    } else {
        bytes.iter().map(|&x| x as f32 * (1. / 255.)).collect()
    })
}

fn read_lut_tables(
    tag: &[u8],
    offset: &mut usize,
    channels: usize,
    entries: usize,
    wide: bool,
) -> Result<CurveSet, CmsError> {
    let entry_size = if wide { 2 } else { 1 };
    let mut curves = Vec::with_capacity(channels);
    for _ in 0..channels {
        let bytes = sub_slice(tag, *offset, entries * entry_size)?;
        *offset += bytes.len();
        let table = if wide {
            TransferTable::from_u16(
                bytes
                    .chunks_exact(2)
                    .map(|x| u16::from_be_bytes([x[0], x[1]]))
                    .collect(),
                TableKind::OneWay,
            )
        } else {
            TransferTable::from_u8(bytes.to_vec(), TableKind::OneWay)
        };
        curves.push(ToneCurve::from(table));
    }
    Ok(CurveSet::new(curves))
}

fn to_clut_table(values: &[f32], outputs: usize) -> Vec<Vector4f> {
    values
        .chunks_exact(outputs)
        .map(|cell| {
            let mut v = Vector4f::default();
            v.v[..outputs].copy_from_slice(cell);
            v
        })
        .collect()
}

fn check_clut_size(cells: usize, options: &ParsingOptions) -> Result<(), CmsError> {
    if cells > options.max_allowed_clut_size {
        return Err(CmsError::MalformedClut(MalformedSize {
            size: cells,
            expected: options.max_allowed_clut_size,
        }));
    }
    Ok(())
}

fn check_channels(
    direction: LutDirection,
    device_channels: usize,
    inputs: u8,
    outputs: u8,
) -> Result<(), CmsError> {
    let (expected_inputs, expected_outputs) = match direction {
        LutDirection::DeviceToPcs => (device_channels, 3),
        LutDirection::PcsToDevice => (3, device_channels),
    };
    if inputs as usize != expected_inputs {
        return Err(CmsError::InvalidChannelCount(inputs));
    }
    if outputs as usize != expected_outputs {
        return Err(CmsError::InvalidChannelCount(outputs));
    }
    Ok(())
}

#[inline]
fn push_element(elements: &mut Vec<Element>, element: Element) {
    if !element.is_identity() {
        elements.push(element);
    }
}

/// `mft1` and `mft2`: matrix, input curves, CLUT, output curves.
fn read_lut_data(
    tag: &[u8],
    wide: bool,
    direction: LutDirection,
    device_channels: usize,
    pcs_lab: bool,
    options: &ParsingOptions,
) -> Result<Vec<Element>, CmsError> {
    let shape = sub_slice(tag, 8, 3)?;
    let (inputs, outputs, grid_points) = (shape[0], shape[1], shape[2]);
    check_channels(direction, device_channels, inputs, outputs)?;
    if grid_points < 2 {
        return Err(CmsError::InvalidLutShape);
    }
    let matrix = read_matrix_3d(sub_slice(tag, 12, 36)?)?;
    let (input_entries, output_entries, mut offset) = if wide {
        (
            read_u16_be(tag, 48)? as usize,
            read_u16_be(tag, 50)? as usize,
            52,
        )
    } else {
        (256, 256, 48)
    };
    if !(2..=4096).contains(&input_entries) || !(2..=4096).contains(&output_entries) {
        return Err(CmsError::InvalidLutShape);
    }
    let (inputs, outputs) = (inputs as usize, outputs as usize);
    let grid = vec![grid_points; inputs];
    let cells = ColorClut::cells(&grid)?;
    check_clut_size(cells, options)?;

    let input_curves = read_lut_tables(tag, &mut offset, inputs, input_entries, wide)?;
    let values = read_samples(tag, &mut offset, cells.safe_mul(outputs)?, wide)?;
    let clut = ColorClut::new(grid, outputs, to_clut_table(&values, outputs))?;
    let output_curves = read_lut_tables(tag, &mut offset, outputs, output_entries, wide)?;

    let legacy_lab = wide && pcs_lab;
    let mut elements = Vec::new();
    if direction == LutDirection::PcsToDevice {
        if legacy_lab {
            elements.push(Element::Matrix(Matrix3f::from_scale(Vector3f::from(
                1. / LEGACY_LAB_TO_LAB,
            ))));
        } else if !pcs_lab {
            // The matrix is only defined for XYZ input.
            push_element(&mut elements, Element::Matrix(matrix));
        }
    }
    push_element(&mut elements, Element::Curves(input_curves));
    elements.push(Element::Clut(clut));
    push_element(&mut elements, Element::Curves(output_curves));
    if direction == LutDirection::DeviceToPcs && legacy_lab {
        elements.push(Element::Matrix(Matrix3f::from_scale(Vector3f::from(
            LEGACY_LAB_TO_LAB,
        ))));
    }
    Ok(elements)
}

fn read_clut(
    tag: &[u8],
    offset: usize,
    inputs: usize,
    outputs: usize,
    options: &ParsingOptions,
) -> Result<ColorClut, CmsError> {
    let header = sub_slice(tag, offset, 20)?;
    let grid = header[..inputs].to_vec();
    if grid.iter().any(|&x| x < 2) {
        return Err(CmsError::InvalidLutShape);
    }
    let precision = header[16];
    if precision != 1 && precision != 2 {
        return Err(CmsError::InvalidClutPrecision(precision));
    }
    let cells = ColorClut::cells(&grid)?;
    check_clut_size(cells, options)?;
    let mut position = offset + 20;
    let values = read_samples(tag, &mut position, cells.safe_mul(outputs)?, precision == 2)?;
    ColorClut::new(grid, outputs, to_clut_table(&values, outputs))
}

/// `mAB ` and `mBA `: up to five stages, B curves are mandatory, the matrix
/// comes with M curves and the CLUT with A curves.
fn read_lut_ab(
    tag: &[u8],
    direction: LutDirection,
    device_channels: usize,
    options: &ParsingOptions,
) -> Result<Vec<Element>, CmsError> {
    let shape = sub_slice(tag, 8, 2)?;
    let (inputs, outputs) = (shape[0], shape[1]);
    check_channels(direction, device_channels, inputs, outputs)?;
    let (inputs, outputs) = (inputs as usize, outputs as usize);

    let b_curve_offset = read_u32_be(tag, 12)? as usize;
    let matrix_offset = read_u32_be(tag, 16)? as usize;
    let m_curve_offset = read_u32_be(tag, 20)? as usize;
    let clut_offset = read_u32_be(tag, 24)? as usize;
    let a_curve_offset = read_u32_be(tag, 28)? as usize;

    if b_curve_offset == 0
        || (matrix_offset == 0) != (m_curve_offset == 0)
        || (clut_offset == 0) != (a_curve_offset == 0)
        || (clut_offset == 0 && inputs != outputs)
    {
        return Err(CmsError::InvalidLutShape);
    }

    let (a_channels, b_channels) = match direction {
        LutDirection::DeviceToPcs => (inputs, outputs),
        LutDirection::PcsToDevice => (outputs, inputs),
    };

    let b_curves = read_curve_set(tag, b_curve_offset, b_channels, options)?;
    let matrix = if matrix_offset != 0 {
        let m_tag = sub_slice(tag, matrix_offset, 48)?;
        Some((read_matrix_3d(m_tag)?, read_vector_3d(&m_tag[36..])?))
    } else {
        None
    };
    let m_curves = if m_curve_offset != 0 {
        Some(read_curve_set(tag, m_curve_offset, 3, options)?)
    } else {
        None
    };
    let clut = if clut_offset != 0 {
        Some(read_clut(tag, clut_offset, inputs, outputs, options)?)
    } else {
        None
    };
    let a_curves = if a_curve_offset != 0 {
        Some(read_curve_set(tag, a_curve_offset, a_channels, options)?)
    } else {
        None
    };

    let mut elements = Vec::new();
    let push_matrix = |elements: &mut Vec<Element>| {
        if let Some((matrix, offset)) = matrix {
            push_element(elements, Element::Matrix(matrix));
            push_element(elements, Element::Offset(offset));
        }
    };
    match direction {
        LutDirection::DeviceToPcs => {
            if let Some(a_curves) = a_curves {
                push_element(&mut elements, Element::Curves(a_curves));
            }
            if let Some(clut) = clut {
                elements.push(Element::Clut(clut));
            }
            if let Some(m_curves) = m_curves {
                push_element(&mut elements, Element::Curves(m_curves));
            }
            push_matrix(&mut elements);
            push_element(&mut elements, Element::Curves(b_curves.clone()));
        }
        LutDirection::PcsToDevice => {
            push_element(&mut elements, Element::Curves(b_curves.clone()));
            push_matrix(&mut elements);
            if let Some(m_curves) = m_curves {
                push_element(&mut elements, Element::Curves(m_curves));
            }
            if let Some(clut) = clut {
                elements.push(Element::Clut(clut));
            }
            if let Some(a_curves) = a_curves {
                push_element(&mut elements, Element::Curves(a_curves));
            }
        }
    }
    if elements.is_empty() {
        elements.push(Element::Curves(b_curves));
    }
    Ok(elements)
}

pub(crate) fn read_lut_tag(
    tag: &[u8],
    direction: LutDirection,
    model: ColorModel,
    pcs_lab: bool,
    options: &ParsingOptions,
) -> Result<Vec<Element>, CmsError> {
    let device_channels = model.channels();
    match tag_type(tag)? {
        TagTypeDefinition::Lut8 => {
            read_lut_data(tag, false, direction, device_channels, pcs_lab, options)
        }
        TagTypeDefinition::Lut16 => {
            read_lut_data(tag, true, direction, device_channels, pcs_lab, options)
        }
        TagTypeDefinition::MabLut if direction == LutDirection::DeviceToPcs => {
            read_lut_ab(tag, direction, device_channels, options)
        }
        TagTypeDefinition::MbaLut if direction == LutDirection::PcsToDevice => {
            read_lut_ab(tag, direction, device_channels, options)
        }
        other => Err(unexpected_type(other)),
    }
}

struct ProfileReader<'a> {
    data: &'a [u8],
    header: ProfileHeader,
    tags: Vec<TagEntry>,
    options: &'a ParsingOptions,
}

impl<'a> ProfileReader<'a> {
    /// Validates the header and every tag table entry.
    fn new(bytes: &'a [u8], options: &'a ParsingOptions) -> Result<Self, CmsError> {
        if bytes.len() > options.max_profile_size {
            log::warn!(
                "ICC profile of {} bytes exceeds the limit of {} bytes",
                bytes.len(),
                options.max_profile_size
            );
            return Err(CmsError::ProfileTooLarge(bytes.len()));
        }
        let header = ProfileHeader::new_from_slice(bytes).inspect_err(|_| {
            log::warn!("ICC profile of {} bytes is too short", bytes.len());
        })?;
        if header.signature != ACSP_SIGNATURE {
            log::warn!(
                "ICC profile has signature '{}' instead of 'acsp'",
                signature_name(header.signature)
            );
            return Err(CmsError::InvalidSignature(header.signature));
        }
        let declared = header.size as usize;
        if declared < TAG_TABLE_OFFSET {
            log::warn!("ICC profile declares an impossible size of {declared} bytes");
            return Err(CmsError::InvalidProfile);
        }
        if declared > bytes.len() {
            log::warn!(
                "ICC profile declares {declared} bytes, but only {} are available",
                bytes.len()
            );
            return Err(truncated(bytes, declared));
        }
        if !(2..=4).contains(&header.version.major()) {
            log::warn!("ICC profile version {:#010x} is not supported", header.version.0);
            return Err(CmsError::UnsupportedProfileVersion(header.version.0));
        }
        let data = &bytes[..declared];
        let tag_count = header.tag_count as usize;
        let data_start = tag_count.safe_mul(TAG_SIZE)?.safe_add(TAG_TABLE_OFFSET)?;
        if data_start > declared {
            log::warn!("Tag table of {tag_count} entries does not fit into the ICC profile");
            return Err(truncated(data, data_start));
        }
        let mut tags = Vec::with_capacity(tag_count);
        for entry in data[TAG_TABLE_OFFSET..data_start].chunks_exact(TAG_SIZE) {
            let signature = read_u32_be(entry, 0)?;
            let offset = read_u32_be(entry, 4)? as usize;
            let size = read_u32_be(entry, 8)? as usize;
            if offset < data_start || offset.safe_add(size)? > declared || size < 8 {
                log::warn!(
                    "Tag '{}' at offset {offset} of {size} bytes lies outside of the tag data",
                    signature_name(signature)
                );
                return Err(CmsError::TagOutOfBounds(signature));
            }
            if offset % 4 != 0 {
                log::warn!(
                    "Tag '{}' at offset {offset} is not 4 byte aligned",
                    signature_name(signature)
                );
                return Err(CmsError::MisalignedTag(signature));
            }
            tags.push(TagEntry {
                signature,
                offset,
                size,
            });
        }
        Ok(ProfileReader {
            data,
            header,
            tags,
            options,
        })
    }

    fn tag(&self, signature: u32) -> Option<&'a [u8]> {
        let data = self.data;
        self.tags
            .iter()
            .find(|x| x.signature == signature)
            .and_then(|x| data.get(x.offset..x.offset + x.size))
    }

    #[inline]
    fn has(&self, signature: u32) -> bool {
        self.tags.iter().any(|x| x.signature == signature)
    }

    /// Reads a required tag, logging what went wrong with it.
    fn read_tag<T>(
        &self,
        signature: u32,
        read: impl FnOnce(&'a [u8]) -> Result<T, CmsError>,
    ) -> Result<T, CmsError> {
        let Some(tag) = self.tag(signature) else {
            log::warn!("Required tag '{}' is missing", signature_name(signature));
            return Err(CmsError::MissingTag(signature));
        };
        read(tag).inspect_err(|err| {
            log::warn!("Malformed tag '{}': {err}", signature_name(signature));
        })
    }

    /// Native white point and the adaptation from it to D50.
    fn read_white_point(&self) -> Result<(Xyz, Matrix3f), CmsError> {
        let wtpt = self.read_tag(WT_PT_TAG, read_xyz_tag)?;
        let (white, chad) = if self.has(CHAD_TAG) {
            let chad = self.read_tag(CHAD_TAG, read_chad_tag)?;
            let Some(inverse) = chad.inverse() else {
                log::warn!("Chromatic adaptation matrix is not invertible");
                return Err(CmsError::InvalidMatrix);
            };
            (Xyz::from_vector(inverse.mul_vector(wtpt.to_vector())), chad)
        } else {
            let Some(chad) = adapt_to_d50(wtpt) else {
                log::warn!("Cannot adapt white point {wtpt:?} to D50");
                return Err(CmsError::InvalidWhitePoint);
            };
            (wtpt, chad)
        };
        if !white.is_valid() || (white.y - 1.).abs() > 0.01 {
            log::warn!("White point {white:?} is not normalized");
            return Err(CmsError::InvalidWhitePoint);
        }
        Ok((white, chad))
    }

    fn read_cicp(&self) -> Option<(Primaries, TransferCurveKind, f32)> {
        let tag = self.tag(CICP_TAG)?;
        match read_cicp_tag(tag) {
            Ok(cicp) => {
                let recognized = cicp.recognized();
                if recognized.is_none() {
                    log::debug!("Ignoring cicp tag with unsupported code points {cicp:?}");
                }
                recognized
            }
            Err(err) => {
                log::debug!("Ignoring malformed cicp tag: {err}");
                None
            }
        }
    }

    /// `aarg`, `aagg` and `aabg` when all three are readable.
    fn read_apple_curves(&self) -> Option<[ToneCurve; 3]> {
        let read = |signature: u32| -> Option<ToneCurve> {
            let tag = self.tag(signature)?;
            read_trc(tag, self.options)
                .inspect_err(|err| {
                    log::debug!(
                        "Ignoring Apple curve '{}': {err}",
                        signature_name(signature)
                    );
                })
                .ok()
        };
        Some([
            read(APPLE_R_TAG_TRC)?,
            read(APPLE_G_TAG_TRC)?,
            read(APPLE_B_TAG_TRC)?,
        ])
    }

    fn read_rgb(&self, pcs_lab: bool) -> Result<ColorSpaceData, CmsError> {
        if let Some((primaries, transfer, gamma)) = self.read_cicp() {
            let points = primaries.points().ok_or(CmsError::InvalidCicp)?;
            let mut data = ColorSpaceData {
                color_model: ColorModel::Rgb,
                ..Default::default()
            };
            data.set_points(points);
            data.set_transfer(transfer, gamma);
            return Ok(data);
        }
        const MATRIX_TAGS: [u32; 7] = [
            R_TAG_XYZ, G_TAG_XYZ, B_TAG_XYZ, R_TAG_TRC, G_TAG_TRC, B_TAG_TRC, WT_PT_TAG,
        ];
        if !pcs_lab && MATRIX_TAGS.iter().all(|&x| self.has(x)) {
            return self.read_rgb_matrix();
        }
        self.read_element_lists(ColorModel::Rgb, pcs_lab)
    }

    fn read_rgb_matrix(&self) -> Result<ColorSpaceData, CmsError> {
        let red = self.read_tag(R_TAG_XYZ, read_xyz_tag)?;
        let green = self.read_tag(G_TAG_XYZ, read_xyz_tag)?;
        let blue = self.read_tag(B_TAG_XYZ, read_xyz_tag)?;
        let to_xyz = Matrix3f::from_columns(red.to_vector(), green.to_vector(), blue.to_vector());
        if !to_xyz.is_valid() {
            log::warn!("RGB colorants {to_xyz:?} do not form an invertible matrix");
            return Err(CmsError::InvalidMatrix);
        }
        let (white, chad) = self.read_white_point()?;
        let options = self.options;
        let mut curves = [
            self.read_tag(R_TAG_TRC, |x| read_trc(x, options))?,
            self.read_tag(G_TAG_TRC, |x| read_trc(x, options))?,
            self.read_tag(B_TAG_TRC, |x| read_trc(x, options))?,
        ];
        if let Some(apple) = self.read_apple_curves() {
            curves = apple;
        }
        let mut data = ColorSpaceData {
            color_model: ColorModel::Rgb,
            primaries: Primaries::identify(&to_xyz),
            white_point: white,
            to_xyz,
            chad,
            ..Default::default()
        };
        data.set_curves(curves);
        Ok(data)
    }

    fn read_gray(&self) -> Result<ColorSpaceData, CmsError> {
        let (white, chad) = self.read_white_point()?;
        let options = self.options;
        let curve = self.read_tag(K_TAG_TRC, |x| read_trc(x, options))?;
        let mut data = ColorSpaceData {
            color_model: ColorModel::Gray,
            white_point: white,
            to_xyz: chad,
            chad,
            ..Default::default()
        };
        data.set_curves([curve.clone(), curve.clone(), curve]);
        Ok(data)
    }

    fn read_element_lists(
        &self,
        model: ColorModel,
        pcs_lab: bool,
    ) -> Result<ColorSpaceData, CmsError> {
        let options = self.options;
        let a_to_b = self.read_tag(A2B0_TAG, |x| {
            read_lut_tag(x, LutDirection::DeviceToPcs, model, pcs_lab, options)
        })?;
        let b_to_a = if self.has(B2A0_TAG) {
            self.read_tag(B2A0_TAG, |x| {
                read_lut_tag(x, LutDirection::PcsToDevice, model, pcs_lab, options)
            })?
        } else {
            Vec::new()
        };
        if model == ColorModel::Cmyk && !a_to_b.iter().any(|x| matches!(x, Element::Clut(_))) {
            log::warn!("CMYK profile without a CLUT");
            return Err(CmsError::InvalidLutShape);
        }
        Ok(ColorSpaceData {
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
}

/// Parses ICC bytes into a descriptor, every rejection is logged as a warning.
pub(crate) fn parse_profile(
    bytes: &[u8],
    options: &ParsingOptions,
) -> Result<ColorSpaceData, CmsError> {
    let reader = ProfileReader::new(bytes, options)?;
    let header = &reader.header;

    let profile_class = ProfileClass::try_from(header.profile_class).inspect_err(|_| {
        log::warn!(
            "Profile class '{}' is not supported",
            signature_name(header.profile_class)
        );
    })?;
    let model = match DataColorSpace::try_from(header.data_color_space) {
        Ok(DataColorSpace::Rgb) => ColorModel::Rgb,
        Ok(DataColorSpace::Gray) => ColorModel::Gray,
        Ok(DataColorSpace::Cmyk) => ColorModel::Cmyk,
        _ => {
            log::warn!(
                "Color space '{}' is not supported",
                signature_name(header.data_color_space)
            );
            return Err(CmsError::UnsupportedColorSpace(header.data_color_space));
        }
    };
    let pcs_lab = match DataColorSpace::try_from(header.pcs) {
        Ok(DataColorSpace::Xyz) => false,
        Ok(DataColorSpace::Lab) => true,
        _ => {
            log::warn!(
                "Profile connection space '{}' is not supported",
                signature_name(header.pcs)
            );
            return Err(CmsError::UnsupportedPcs(header.pcs));
        }
    };
    if header.illuminant != Xyz::D50 {
        log::warn!("Profile illuminant {:?} is not D50", header.illuminant);
        return Err(CmsError::NonD50Illuminant);
    }
    log::debug!(
        "Reading {profile_class:?} profile for {model:?}, Lab connection space: {pcs_lab}"
    );

    let mut data = match model {
        ColorModel::Rgb => reader.read_rgb(pcs_lab)?,
        ColorModel::Gray => reader.read_gray()?,
        ColorModel::Cmyk => reader.read_element_lists(ColorModel::Cmyk, pcs_lab)?,
        ColorModel::Undefined => return Err(CmsError::InvalidColorSpace),
    };
    if let Some(tag) = reader.tag(DESC_TAG) {
        match read_description(tag) {
            Ok(description) => data.description = description,
            Err(err) => log::debug!("Ignoring unreadable description: {err}"),
        }
    }
    data.identify();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curv(samples: &[u16]) -> Vec<u8> {
        let mut tag = b"curv\0\0\0\0".to_vec();
        tag.extend_from_slice(&(samples.len() as u32).to_be_bytes());
        for s in samples {
            tag.extend_from_slice(&s.to_be_bytes());
        }
        tag
    }

    fn para(kind: u16, params: &[f32]) -> Vec<u8> {
        let mut tag = b"para\0\0\0\0".to_vec();
        tag.extend_from_slice(&kind.to_be_bytes());
        tag.extend_from_slice(&[0, 0]);
        for &p in params {
            tag.extend_from_slice(&((p as f64 * 65536.).round() as i32).to_be_bytes());
        }
        tag
    }

    #[test]
    fn test_curv_variants() {
        let options = ParsingOptions::default();
        let (identity, size) = read_curve(&curv(&[]), TableKind::TwoWay, &options).unwrap();
        assert!(identity.is_identity());
        assert_eq!(size, 12);
        let (gamma, size) = read_curve(&curv(&[563]), TableKind::TwoWay, &options).unwrap();
        assert_eq!(size, 14);
        assert!((gamma.function().unwrap().gamma_value() - 2.199_218_8).abs() < 1e-5);

        let srgb = TransferFunction::srgb();
        let samples: Vec<u16> = (0..1024)
            .map(|i| (srgb.apply(i as f32 / 1023.) * 65535. + 0.5) as u16)
            .collect();
        let (fitted, _) = read_curve(&curv(&samples), TableKind::TwoWay, &options).unwrap();
        assert!(fitted.function().unwrap().is_srgb());
        let (kept, _) = read_curve(&curv(&samples), TableKind::OneWay, &options).unwrap();
        assert!(kept.table().is_some());

        assert_eq!(
            read_curve(&curv(&[0, 30000, 20000, 65535]), TableKind::TwoWay, &options).err(),
            Some(CmsError::NonMonotonicTable)
        );
        let small = ParsingOptions {
            max_allowed_trc_size: 16,
            ..Default::default()
        };
        assert_eq!(
            read_curve(&curv(&samples), TableKind::TwoWay, &small).err(),
            Some(CmsError::CurveLutIsTooLarge)
        );
        let mut short = curv(&samples);
        short.truncate(100);
        assert!(read_curve(&short, TableKind::TwoWay, &options).is_err());
    }

    #[test]
    fn test_para_variants() {
        let options = ParsingOptions::default();
        let (curve, size) = read_curve(
            &para(3, &[2.4, 1. / 1.055, 0.055 / 1.055, 1. / 12.92, 0.04045]),
            TableKind::TwoWay,
            &options,
        )
        .unwrap();
        assert_eq!(size, 32);
        assert!(curve.function().unwrap().is_srgb());
        assert_eq!(
            read_curve(&para(1, &[2.2, 0., 0.1]), TableKind::TwoWay, &options).err(),
            Some(CmsError::ParametricCurveZeroDivision)
        );
        assert_eq!(
            read_curve(&para(5, &[2.2]), TableKind::TwoWay, &options).err(),
            Some(CmsError::InvalidTrcCurve)
        );
        assert!(read_curve(&para(4, &[2.2, 1.]), TableKind::TwoWay, &options).is_err());
    }

    #[test]
    fn test_descriptions() {
        let mut desc = b"desc\0\0\0\0".to_vec();
        desc.extend_from_slice(&5u32.to_be_bytes());
        desc.extend_from_slice(b"sRGB\0");
        assert_eq!(read_description(&desc).unwrap(), "sRGB");

        let mut mluc = b"mluc\0\0\0\0".to_vec();
        mluc.extend_from_slice(&1u32.to_be_bytes());
        mluc.extend_from_slice(&12u32.to_be_bytes());
        mluc.extend_from_slice(b"enUS");
        mluc.extend_from_slice(&6u32.to_be_bytes());
        mluc.extend_from_slice(&28u32.to_be_bytes());
        mluc.extend_from_slice(&[0, b'P', 0, b'3', 0, 0]);
        assert_eq!(read_description(&mluc).unwrap(), "P3");

        mluc[27] = 200;
        assert!(read_description(&mluc).is_err());
    }

    #[test]
    fn test_lut_shape_rules() {
        let options = ParsingOptions::default();
        let mut tag = b"mAB \0\0\0\0".to_vec();
        tag.extend_from_slice(&[3, 3, 0, 0]);
        // no B curves
        tag.extend_from_slice(&[0u8; 20]);
        assert_eq!(
            read_lut_tag(
                &tag,
                LutDirection::DeviceToPcs,
                ColorModel::Rgb,
                false,
                &options
            )
            .err(),
            Some(CmsError::InvalidLutShape)
        );
        assert_eq!(
            read_lut_tag(
                &tag,
                LutDirection::DeviceToPcs,
                ColorModel::Cmyk,
                false,
                &options
            )
            .err(),
            Some(CmsError::InvalidChannelCount(3))
        );
        assert!(matches!(
            read_lut_tag(
                &tag,
                LutDirection::PcsToDevice,
                ColorModel::Rgb,
                false,
                &options
            ),
            Err(CmsError::UnknownTagType(_))
        ));
    }

    #[test]
    fn test_mab_identity_curves_and_clut() {
        let options = ParsingOptions::default();
        let mut tag = b"mAB \0\0\0\0".to_vec();
        tag.extend_from_slice(&[3, 3, 0, 0]);
        // B at 32, CLUT at 68, A at 112
        for offset in [32u32, 0, 0, 68, 112] {
            tag.extend_from_slice(&offset.to_be_bytes());
        }
        for _ in 0..3 {
            tag.extend_from_slice(&curv(&[]));
        }
        let mut grid = [0u8; 16];
        grid[..3].copy_from_slice(&[2, 2, 2]);
        tag.extend_from_slice(&grid);
        tag.extend_from_slice(&[1, 0, 0, 0]);
        for cell in 0..8u8 {
            let r = (cell >> 2) & 1;
            let g = (cell >> 1) & 1;
            let b = cell & 1;
            tag.extend_from_slice(&[r * 255, g * 255, b * 255]);
        }
        assert_eq!(tag.len(), 112);
        for _ in 0..3 {
            tag.extend_from_slice(&curv(&[]));
        }
        let elements = read_lut_tag(
            &tag,
            LutDirection::DeviceToPcs,
            ColorModel::Rgb,
            false,
            &options,
        )
        .unwrap();
        assert_eq!(elements.len(), 1);
        let Element::Clut(clut) = &elements[0] else {
            panic!("expected CLUT");
        };
        let v = clut.apply(Vector4f::new(0.25, 0.5, 0.75, 0.));
        assert!((v.v[0] - 0.25).abs() < 1e-5);
        assert!((v.v[2] - 0.75).abs() < 1e-5);

        tag[68 + 16] = 3;
        let precision = read_lut_tag(
            &tag,
            LutDirection::DeviceToPcs,
            ColorModel::Rgb,
            false,
            &options,
        );
        assert_eq!(precision.err(), Some(CmsError::InvalidClutPrecision(3)));
    }

    fn fixed(v: f32) -> [u8; 4] {
        ((v as f64 * 65536.).round() as i32).to_be_bytes()
    }

    fn xyz(x: f32, y: f32, z: f32) -> Vec<u8> {
        let mut tag = b"XYZ \0\0\0\0".to_vec();
        for v in [x, y, z] {
            tag.extend_from_slice(&fixed(v));
        }
        tag
    }

    /// Display RGB profile over XYZ with the given tags, payloads are 4 byte aligned.
    fn build_profile(tags: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let table_end = TAG_TABLE_OFFSET + tags.len() * TAG_SIZE;
        let mut entries = Vec::new();
        let mut payload = Vec::new();
        for (signature, tag) in tags {
            entries.extend_from_slice(&signature.to_be_bytes());
            entries.extend_from_slice(&((table_end + payload.len()) as u32).to_be_bytes());
            entries.extend_from_slice(&(tag.len() as u32).to_be_bytes());
            payload.extend_from_slice(tag);
            payload.resize(payload.len().div_ceil(4) * 4, 0);
        }
        let mut bytes = vec![0u8; 128];
        bytes[0..4].copy_from_slice(&((table_end + payload.len()) as u32).to_be_bytes());
        bytes[8..12].copy_from_slice(&0x0420_0000u32.to_be_bytes());
        bytes[12..16].copy_from_slice(b"mntr");
        bytes[16..20].copy_from_slice(b"RGB ");
        bytes[20..24].copy_from_slice(b"XYZ ");
        bytes[36..40].copy_from_slice(b"acsp");
        bytes[68..72].copy_from_slice(&fixed(0.9642));
        bytes[72..76].copy_from_slice(&fixed(1.));
        bytes[76..80].copy_from_slice(&fixed(0.8249));
        bytes.extend_from_slice(&(tags.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&entries);
        bytes.extend_from_slice(&payload);
        bytes
    }

    fn matrix_tags(trc: Vec<u8>) -> Vec<(u32, Vec<u8>)> {
        vec![
            (R_TAG_XYZ, xyz(0.4361, 0.2225, 0.0139)),
            (G_TAG_XYZ, xyz(0.3851, 0.7169, 0.0971)),
            (B_TAG_XYZ, xyz(0.1431, 0.0606, 0.7141)),
            (WT_PT_TAG, xyz(0.9642, 1., 0.8249)),
            (R_TAG_TRC, trc.clone()),
            (G_TAG_TRC, trc.clone()),
            (B_TAG_TRC, trc),
        ]
    }

    fn matrix_profile() -> Vec<u8> {
        build_profile(&matrix_tags(curv(&[256])))
    }

    fn set_u32(bytes: &mut [u8], at: usize, value: u32) {
        bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }

    #[test]
    fn test_header_rejections() {
        let options = ParsingOptions::default();
        let valid = matrix_profile();
        let data = parse_profile(&valid, &options).unwrap();
        assert!(data.is_valid());
        assert_eq!(data.transform_model, TransformModel::ThreeComponentMatrix);

        let mut bytes = valid.clone();
        bytes[36..40].copy_from_slice(b"abcd");
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::InvalidSignature(u32::from_be_bytes(*b"abcd")))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 0, valid.len() as u32 + 4);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::TruncatedProfile(MalformedSize {
                size: valid.len(),
                expected: valid.len() + 4,
            }))
        );

        let tight = ParsingOptions {
            max_profile_size: 256,
            ..Default::default()
        };
        assert_eq!(
            parse_profile(&valid, &tight).err(),
            Some(CmsError::ProfileTooLarge(valid.len()))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 8, 0x0520_0000);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::UnsupportedProfileVersion(0x0520_0000))
        );

        let mut bytes = valid.clone();
        bytes[12..16].copy_from_slice(b"link");
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::UnsupportedProfileClass(u32::from_be_bytes(*b"link")))
        );

        let mut bytes = valid.clone();
        bytes[68..72].copy_from_slice(&fixed(0.9505));
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::NonD50Illuminant)
        );
    }

    #[test]
    fn test_tag_table_rejections() {
        let options = ParsingOptions::default();
        let valid = matrix_profile();
        let first_offset = read_u32_be(&valid, 136).unwrap();

        // offset inside the tag table
        let mut bytes = valid.clone();
        set_u32(&mut bytes, 136, 128);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::TagOutOfBounds(R_TAG_XYZ))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 140, valid.len() as u32);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::TagOutOfBounds(R_TAG_XYZ))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 140, 4);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::TagOutOfBounds(R_TAG_XYZ))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 136, first_offset + 2);
        set_u32(&mut bytes, 140, 18);
        assert_eq!(
            parse_profile(&bytes, &options).err(),
            Some(CmsError::MisalignedTag(R_TAG_XYZ))
        );

        let mut bytes = valid.clone();
        set_u32(&mut bytes, 128, u32::MAX);
        assert!(parse_profile(&bytes, &options).is_err());
    }

    #[test]
    fn test_truncated_profiles() {
        let options = ParsingOptions::default();
        let valid = matrix_profile();
        for len in 0..valid.len() {
            assert!(parse_profile(&valid[..len], &options).is_err(), "{len}");
        }
    }

    #[test]
    fn test_apple_curves() {
        let options = ParsingOptions::default();
        let mut tags = matrix_tags(curv(&[256]));
        let apple = curv(&[563]);
        tags.push((APPLE_R_TAG_TRC, apple.clone()));
        tags.push((APPLE_G_TAG_TRC, apple.clone()));
        tags.push((APPLE_B_TAG_TRC, apple.clone()));
        let data = parse_profile(&build_profile(&tags), &options).unwrap();
        let expected = 0.5f32.powf(563. / 256.);
        for curve in data.trc.iter() {
            assert!((curve.apply(0.5) - expected).abs() < 1e-3);
        }

        // one unreadable curve leaves the regular TRCs in place
        let last = tags.len() - 1;
        tags[last].1 = b"xxxx\0\0\0\0\0\0\0\0".to_vec();
        let data = parse_profile(&build_profile(&tags), &options).unwrap();
        for curve in data.trc.iter() {
            assert!((curve.apply(0.5) - 0.5).abs() < 1e-3);
        }

        tags.pop();
        let data = parse_profile(&build_profile(&tags), &options).unwrap();
        assert!((data.trc[0].apply(0.5) - 0.5).abs() < 1e-3);
    }
}
