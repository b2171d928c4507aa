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
use crate::clut::ColorClut;
use crate::matrix::{Matrix3f, Vector3f, Vector4f};
use crate::trc::ToneCurve;

/// Independent curves applied to the leading channels of a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveSet {
    pub curves: Vec<ToneCurve>,
}

impl CurveSet {
    pub fn new(curves: Vec<ToneCurve>) -> Self {
        Self { curves }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.curves.len()
    }

    pub fn is_identity(&self) -> bool {
        self.curves.iter().all(|c| c.is_identity())
    }

    #[inline]
    pub fn apply(&self, v: Vector4f) -> Vector4f {
        let mut r = v;
        for (dst, curve) in r.v.iter_mut().zip(self.curves.iter()) {
            *dst = curve.apply(*dst);
        }
        r
    }
}

/// One stage of an element pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Curves(CurveSet),
    Matrix(Matrix3f),
    Offset(Vector3f),
    Clut(ColorClut),
}

impl Element {
    #[inline]
    pub fn apply(&self, v: Vector4f) -> Vector4f {
        match self {
            Element::Curves(curves) => curves.apply(v),
            Element::Matrix(matrix) => matrix.mul_vector4(v),
            Element::Offset(offset) => Vector4f {
                v: [
                    v.v[0] + offset.v[0],
                    v.v[1] + offset.v[1],
                    v.v[2] + offset.v[2],
                    v.v[3],
                ],
            },
            Element::Clut(clut) => clut.apply(v),
        }
    }

    /// Runs the stage over a whole buffer.
    pub fn apply_slice(&self, buffer: &mut [Vector4f]) {
        match self {
            Element::Curves(curves) => {
                for v in buffer.iter_mut() {
                    *v = curves.apply(*v);
                }
            }
            Element::Matrix(matrix) => {
                for v in buffer.iter_mut() {
                    *v = matrix.mul_vector4(*v);
                }
            }
            Element::Offset(_) | Element::Clut(_) => {
                for v in buffer.iter_mut() {
                    *v = self.apply(*v);
                }
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Element::Curves(curves) => curves.is_identity(),
            Element::Matrix(matrix) => matrix.is_identity(),
            Element::Offset(offset) => *offset == Vector3f::default(),
            Element::Clut(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parametric::TransferFunction;

    #[test]
    fn test_stages() {
        let curves = Element::Curves(CurveSet::new(vec![
            ToneCurve::from(TransferFunction::gamma(2.)),
            ToneCurve::linear(),
            ToneCurve::linear(),
        ]));
        let mut buffer = [Vector4f::new(0.5, 0.5, 0.5, 0.25); 4];
        curves.apply_slice(&mut buffer);
        assert_eq!(buffer[3], Vector4f::new(0.25, 0.5, 0.5, 0.25));

        let offset = Element::Offset(Vector3f::new(0.1, 0., -0.1));
        offset.apply_slice(&mut buffer);
        assert_eq!(buffer[0], Vector4f::new(0.35, 0.5, 0.4, 0.25));

        let matrix = Element::Matrix(Matrix3f::from_scale(Vector3f::new(2., 1., 0.5)));
        assert_eq!(
            matrix.apply(buffer[0]),
            Vector4f::new(0.7, 0.5, 0.2, 0.25)
        );
    }

    #[test]
    fn test_identity_detection() {
        assert!(Element::Matrix(Matrix3f::IDENTITY).is_identity());
        assert!(Element::Offset(Vector3f::default()).is_identity());
        assert!(Element::Curves(CurveSet::new(vec![ToneCurve::linear(); 3])).is_identity());
        assert!(!Element::Offset(Vector3f::new(0.1, 0., 0.)).is_identity());
    }
}
