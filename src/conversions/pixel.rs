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
use crate::color::Pixel;
use crate::matrix::Vector4f;
use crate::transform::TransformFlags;

/// Unpacks `src` into working vectors and alphas.
///
/// Premultiplied input is divided by its alpha, a zero alpha yields zero
/// channels.
pub(crate) fn load_chunk<P: Pixel>(
    src: &[P],
    buffer: &mut [Vector4f],
    alpha: &mut [f32],
    flags: TransformFlags,
) {
    let premultiplied = P::HAS_ALPHA && flags.input_premultiplied && !flags.input_opaque;
    for ((pixel, dst), a) in src.iter().zip(buffer.iter_mut()).zip(alpha.iter_mut()) {
        let (mut v, mut pa) = pixel.load();
        if !P::HAS_ALPHA || flags.input_opaque {
            pa = 1.;
        } else if premultiplied {
            if pa > 0. {
                let scale = 1. / pa;
                v = Vector4f::new(v.v[0] * scale, v.v[1] * scale, v.v[2] * scale, v.v[3]);
            } else {
                v = Vector4f::default();
            }
        }
        if !P::EXTENDED {
            v = v.clamp01();
            pa = pa.max(0.).min(1.);
        }
        *dst = v;
        *a = pa;
    }
}

/// Packs working vectors into `dst`, premultiplying when requested and
/// the destination carries alpha.
pub(crate) fn store_chunk<P: Pixel>(
    buffer: &[Vector4f],
    alpha: &[f32],
    dst: &mut [P],
    flags: TransformFlags,
) {
    let premultiply = P::HAS_ALPHA && flags.output_premultiplied;
    for ((v, a), pixel) in buffer.iter().zip(alpha.iter()).zip(dst.iter_mut()) {
        let mut v = *v;
        let mut a = *a;
        if !P::EXTENDED {
            v = v.clamp01();
            a = a.max(0.).min(1.);
        }
        if premultiply {
            v = Vector4f::new(v.v[0] * a, v.v[1] * a, v.v[2] * a, v.v[3]);
        }
        *pixel = P::store(v, a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Argb32, Cmyk32, RgbaF32};

    #[test]
    fn test_unpremultiply() {
        let src = [Argb32::new(128, 64, 32, 0), Argb32::new(0, 10, 10, 10)];
        let mut buffer = [Vector4f::default(); 2];
        let mut alpha = [0f32; 2];
        let flags = TransformFlags {
            input_premultiplied: true,
            ..Default::default()
        };
        load_chunk(&src, &mut buffer, &mut alpha, flags);
        assert!((buffer[0].v[0] - 0.5).abs() < 1e-2);
        assert!((buffer[0].v[1] - 0.25).abs() < 1e-2);
        assert_eq!(buffer[1], Vector4f::default());
        assert_eq!(alpha[1], 0.);
        assert!(buffer.iter().all(|v| v.is_valid()));
    }

    #[test]
    fn test_opaque_and_premultiplied_output() {
        let src = [Argb32::new(0, 255, 128, 0)];
        let mut buffer = [Vector4f::default(); 1];
        let mut alpha = [0f32; 1];
        let flags = TransformFlags {
            input_opaque: true,
            output_premultiplied: true,
            ..Default::default()
        };
        load_chunk(&src, &mut buffer, &mut alpha, flags);
        assert_eq!(alpha[0], 1.);
        let mut dst = [Argb32::default(); 1];
        store_chunk(&buffer, &alpha, &mut dst, flags);
        assert_eq!(dst[0], Argb32::new(255, 255, 128, 0));

        let half = [0.5f32];
        store_chunk(&buffer, &half, &mut dst, flags);
        assert_eq!(dst[0], Argb32::new(128, 128, 64, 0));

        let mut cmyk = [Cmyk32::default(); 1];
        store_chunk(&buffer, &half, &mut cmyk, flags);
        assert_eq!(cmyk[0], Cmyk32::new(255, 128, 0, 0));
    }

    #[test]
    fn test_extended_is_not_clamped() {
        let src = [RgbaF32::new(1.5, -0.25, 0.5, 1.)];
        let mut buffer = [Vector4f::default(); 1];
        let mut alpha = [0f32; 1];
        load_chunk(&src, &mut buffer, &mut alpha, TransformFlags::default());
        assert_eq!(buffer[0].v[0], 1.5);
        let mut dst = [Argb32::default(); 1];
        store_chunk(&buffer, &alpha, &mut dst, TransformFlags::default());
        assert_eq!(dst[0], Argb32::new(255, 255, 0, 128));
    }
}
