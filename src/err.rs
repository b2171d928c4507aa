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
use std::error::Error;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedSize {
    pub size: usize,
    pub expected: usize,
}

/// Every failure the crate can report.
#[derive(Debug, Clone, PartialEq)]
pub enum CmsError {
    LaneSizeMismatch,
    LaneMultipleOfChannels,
    InvalidProfile,
    InvalidSignature(u32),
    UnsupportedProfileVersion(u32),
    UnsupportedProfileClass(u32),
    UnsupportedColorSpace(u32),
    UnsupportedPcs(u32),
    NonD50Illuminant,
    ProfileTooLarge(usize),
    TruncatedProfile(MalformedSize),
    TagOutOfBounds(u32),
    MisalignedTag(u32),
    MissingTag(u32),
    UnknownTagType(u32),
    InvalidTrcCurve,
    CurveLutIsTooLarge,
    ParametricCurveZeroDivision,
    NonMonotonicTable,
    MalformedClut(MalformedSize),
    InvalidClutPrecision(u8),
    InvalidLutShape,
    InvalidChannelCount(u8),
    InvalidMatrix,
    InvalidWhitePoint,
    InvalidCicp,
    OverflowingError,
    DivisionByZero,
    InvalidLayout,
    InvalidColorSpace,
    UnsupportedWriterShape,
}

impl Display for CmsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmsError::LaneSizeMismatch => f.write_str("Lanes length must match"),
            CmsError::LaneMultipleOfChannels => {
                f.write_str("Lane length must not be multiple of channel count")
            }
            CmsError::InvalidProfile => f.write_str("Invalid ICC profile"),
            CmsError::InvalidSignature(sig) => {
                f.write_fmt(format_args!("Invalid profile signature {sig:#010x}"))
            }
            CmsError::UnsupportedProfileVersion(v) => {
                f.write_fmt(format_args!("Unsupported profile version {v:#010x}"))
            }
            CmsError::UnsupportedProfileClass(c) => {
                f.write_fmt(format_args!("Unsupported profile class {c:#010x}"))
            }
            CmsError::UnsupportedColorSpace(c) => {
                f.write_fmt(format_args!("Unsupported data color space {c:#010x}"))
            }
            CmsError::UnsupportedPcs(c) => {
                f.write_fmt(format_args!("Unsupported profile connection space {c:#010x}"))
            }
            CmsError::NonD50Illuminant => f.write_str("Profile illuminant is not D50"),
            CmsError::ProfileTooLarge(size) => {
                f.write_fmt(format_args!("Profile of {size} bytes exceeds the allowed size"))
            }
            CmsError::TruncatedProfile(size) => f.write_fmt(format_args!(
                "Profile is truncated, declared {} bytes, but only {} available",
                size.expected, size.size
            )),
            CmsError::TagOutOfBounds(tag) => {
                f.write_fmt(format_args!("Tag {tag:#010x} lies outside of the profile"))
            }
            CmsError::MisalignedTag(tag) => {
                f.write_fmt(format_args!("Tag {tag:#010x} is not 4 byte aligned"))
            }
            CmsError::MissingTag(tag) => {
                f.write_fmt(format_args!("Required tag {tag:#010x} is missing"))
            }
            CmsError::UnknownTagType(tag) => {
                f.write_fmt(format_args!("Unknown tag type {tag:#010x}"))
            }
            CmsError::InvalidTrcCurve => f.write_str("Invalid TRC curve"),
            CmsError::CurveLutIsTooLarge => f.write_str("Curve LUT is too large"),
            CmsError::ParametricCurveZeroDivision => {
                f.write_str("Parametric Curve definition causes division by zero")
            }
            CmsError::NonMonotonicTable => {
                f.write_str("Two way transfer table must be non-decreasing")
            }
            CmsError::MalformedClut(size) => f.write_fmt(format_args!(
                "Invalid CLUT size: {} elements, expected {}",
                size.size, size.expected
            )),
            CmsError::InvalidClutPrecision(p) => {
                f.write_fmt(format_args!("CLUT precision must be 1 or 2, but it was {p}"))
            }
            CmsError::InvalidLutShape => f.write_str("Illegal combination of LUT elements"),
            CmsError::InvalidChannelCount(c) => {
                f.write_fmt(format_args!("Unexpected channel count {c}"))
            }
            CmsError::InvalidMatrix => f.write_str("Matrix is not invertible"),
            CmsError::InvalidWhitePoint => f.write_str("White point is not normalized"),
            CmsError::InvalidCicp => f.write_str("Invalid Code Independent point (CICP)"),
            CmsError::OverflowingError => f.write_str("Overflowing was happen, that is not allowed"),
            CmsError::DivisionByZero => f.write_str("Division by zero"),
            CmsError::InvalidLayout => {
                f.write_str("Pixel layout is not compatible with the color model")
            }
            CmsError::InvalidColorSpace => f.write_str("Color space is not valid"),
            CmsError::UnsupportedWriterShape => {
                f.write_str("Element list cannot be expressed as an ICC LUT tag")
            }
        }
    }
}

impl Error for CmsError {}
