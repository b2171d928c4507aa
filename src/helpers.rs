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
use crate::err::{CmsError, MalformedSize};
use crate::matrix::{Matrix3f, Vector3f, Xyz};
use crate::safe_math::SafeAdd;

/// Produces the nearest float to `a` with a maximum error of 1/1024 which
/// happens for large values like 0x40000040.
#[inline]
pub(crate) const fn s15_fixed16_number_to_float(a: i32) -> f32 {
    a as f32 / 65536.
}

/// Saturates to the representable range of s15Fixed16.
#[inline]
pub(crate) fn float_to_s15_fixed16_number(v: f32) -> i32 {
    let scaled = (v as f64 * 65536.).round();
    scaled.max(i32::MIN as f64).min(i32::MAX as f64) as i32
}

#[inline]
fn bytes_at<const N: usize>(slice: &[u8], offset: usize) -> Result<[u8; N], CmsError> {
    let end = offset.safe_add(N)?;
    slice
        .get(offset..end)
        .and_then(|x| x.try_into().ok())
        .ok_or(CmsError::TruncatedProfile(MalformedSize {
            size: slice.len(),
            expected: end,
        }))
}

#[inline]
pub(crate) fn read_u16_be(slice: &[u8], offset: usize) -> Result<u16, CmsError> {
    Ok(u16::from_be_bytes(bytes_at(slice, offset)?))
}

#[inline]
pub(crate) fn read_u32_be(slice: &[u8], offset: usize) -> Result<u32, CmsError> {
    Ok(u32::from_be_bytes(bytes_at(slice, offset)?))
}

#[inline]
pub(crate) fn read_s15_fixed16(slice: &[u8], offset: usize) -> Result<f32, CmsError> {
    Ok(s15_fixed16_number_to_float(i32::from_be_bytes(bytes_at(
        slice, offset,
    )?)))
}

pub(crate) fn read_xyz(slice: &[u8]) -> Result<Xyz, CmsError> {
    Ok(Xyz::new(
        read_s15_fixed16(slice, 0)?,
        read_s15_fixed16(slice, 4)?,
        read_s15_fixed16(slice, 8)?,
    ))
}

/// Nine s15Fixed16 numbers in row major order.
pub(crate) fn read_matrix_3d(slice: &[u8]) -> Result<Matrix3f, CmsError> {
    let mut matrix = Matrix3f::default();
    for i in 0..9 {
        matrix.v[i / 3][i % 3] = read_s15_fixed16(slice, i * 4)?;
    }
    Ok(matrix)
}

pub(crate) fn read_vector_3d(slice: &[u8]) -> Result<Vector3f, CmsError> {
    Ok(Vector3f::new(
        read_s15_fixed16(slice, 0)?,
        read_s15_fixed16(slice, 4)?,
        read_s15_fixed16(slice, 8)?,
    ))
}

/// Decodes UTF-16BE, dropping trailing NUL characters.
pub(crate) fn utf16be_to_string(slice: &[u8]) -> String {
    let units: Vec<u16> = slice
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}
