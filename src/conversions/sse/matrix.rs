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
use crate::matrix::{Matrix3f, Vector4f};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Multiplies the first three lanes of every vector by `matrix`, the fourth
/// lane is kept as is.
///
/// # Safety
///
/// The caller must ensure the CPU supports SSE4.1.
#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn transform_matrix(matrix: &Matrix3f, dst: &mut [Vector4f], clamp: bool) {
    let m = &matrix.v;
    unsafe {
        let c0 = _mm_setr_ps(m[0][0], m[1][0], m[2][0], 0.);
        let c1 = _mm_setr_ps(m[0][1], m[1][1], m[2][1], 0.);
        let c2 = _mm_setr_ps(m[0][2], m[1][2], m[2][2], 0.);
        let zeros = _mm_setzero_ps();
        let ones = _mm_set1_ps(1.);

        for v in dst.iter_mut() {
            let src = _mm_loadu_ps(v.v.as_ptr());
            let x = _mm_shuffle_ps::<0b00_00_00_00>(src, src);
            let y = _mm_shuffle_ps::<0b01_01_01_01>(src, src);
            let z = _mm_shuffle_ps::<0b10_10_10_10>(src, src);
            let mut r = _mm_add_ps(
                _mm_add_ps(_mm_mul_ps(c0, x), _mm_mul_ps(c1, y)),
                _mm_mul_ps(c2, z),
            );
            if clamp {
                r = _mm_min_ps(_mm_max_ps(r, zeros), ones);
            }
            r = _mm_blend_ps::<0b1000>(r, src);
            _mm_storeu_ps(v.v.as_mut_ptr(), r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primaries::Primaries;

    #[test]
    fn test_matches_scalar() {
        if !std::arch::is_x86_feature_detected!("sse4.1") {
            return;
        }
        let matrix = Primaries::SRgb.to_xyz_matrix().unwrap();
        let mut buffer: Vec<Vector4f> = (0..64)
            .map(|i| {
                let t = i as f32 / 63.;
                Vector4f::new(t, 1. - t, t * 0.5, t)
            })
            .collect();
        let expected: Vec<Vector4f> = buffer.iter().map(|v| matrix.mul_vector4(*v)).collect();
        unsafe {
            transform_matrix(&matrix, &mut buffer, false);
        }
        for (a, b) in buffer.iter().zip(expected.iter()) {
            assert_eq!(a, b);
            assert_eq!(a.v[3], b.v[3]);
        }
    }
}
