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
use crate::element::Element;
use crate::err::CmsError;
use crate::lab::Lab;
use crate::lut::TrcLut;
use crate::matrix::{Matrix3f, Vector4f, Xyz};
use crate::mlaf::mlaf;
use std::sync::Arc;

/// One step of a transform pipeline, run over a working buffer.
///
/// `extended` is set when neither end of the transform clamps, values
/// outside `[0, 1]` are then kept between stages.
pub(crate) trait InPlaceStage: Send + Sync {
    fn transform(&self, dst: &mut [Vector4f], extended: bool) -> Result<(), CmsError>;
}

/// Device values to linear light, one table per leading channel.
pub(crate) struct LinearizeStage {
    pub(crate) tables: Vec<Arc<TrcLut>>,
}

impl InPlaceStage for LinearizeStage {
    fn transform(&self, dst: &mut [Vector4f], _: bool) -> Result<(), CmsError> {
        for v in dst.iter_mut() {
            for (x, table) in v.v.iter_mut().zip(self.tables.iter()) {
                *x = table.to_linear(*x);
            }
        }
        Ok(())
    }
}

pub(crate) struct DelinearizeStage {
    pub(crate) tables: Vec<Arc<TrcLut>>,
}

impl InPlaceStage for DelinearizeStage {
    fn transform(&self, dst: &mut [Vector4f], _: bool) -> Result<(), CmsError> {
        for v in dst.iter_mut() {
            for (x, table) in v.v.iter_mut().zip(self.tables.iter()) {
                *x = table.from_linear(*x);
            }
        }
        Ok(())
    }
}

#[inline(always)]
fn clamp_rgb(v: Vector4f) -> Vector4f {
    Vector4f {
        v: [
            v.v[0].max(0.).min(1.),
            v.v[1].max(0.).min(1.),
            v.v[2].max(0.).min(1.),
            v.v[3],
        ],
    }
}

/// Multiplies the first three lanes, optionally clamping the result.
pub(crate) struct MatrixStage {
    pub(crate) matrix: Matrix3f,
    pub(crate) clamp: bool,
}

impl MatrixStage {
    fn transform_scalar(&self, dst: &mut [Vector4f], clamp: bool) {
        let m = &self.matrix;
        for v in dst.iter_mut() {
            let x = v.v[0];
            let y = v.v[1];
            let z = v.v[2];
            let r = Vector4f {
                v: [
                    mlaf(mlaf(m.v[0][0] * x, m.v[0][1], y), m.v[0][2], z),
                    mlaf(mlaf(m.v[1][0] * x, m.v[1][1], y), m.v[1][2], z),
                    mlaf(mlaf(m.v[2][0] * x, m.v[2][1], y), m.v[2][2], z),
                    v.v[3],
                ],
            };
            *v = if clamp { clamp_rgb(r) } else { r };
        }
    }
}

impl InPlaceStage for MatrixStage {
    fn transform(&self, dst: &mut [Vector4f], extended: bool) -> Result<(), CmsError> {
        let clamp = self.clamp && !extended;
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "sse"))]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                unsafe {
                    crate::conversions::sse::transform_matrix(&self.matrix, dst, clamp);
                }
                return Ok(());
            }
        }
        self.transform_scalar(dst, clamp);
        Ok(())
    }
}

/// Linear gray to native XYZ along the white point.
pub(crate) struct GrayToXyzStage {
    pub(crate) white: Xyz,
}

impl InPlaceStage for GrayToXyzStage {
    fn transform(&self, dst: &mut [Vector4f], _: bool) -> Result<(), CmsError> {
        for v in dst.iter_mut() {
            let y = v.v[0];
            *v = Vector4f::new(self.white.x * y, self.white.y * y, self.white.z * y, v.v[3]);
        }
        Ok(())
    }
}

/// Native XYZ to linear gray, broadcast to every lane.
pub(crate) struct XyzToGrayStage {
    pub(crate) white: Xyz,
}

impl InPlaceStage for XyzToGrayStage {
    fn transform(&self, dst: &mut [Vector4f], extended: bool) -> Result<(), CmsError> {
        let scale = if self.white.y != 0. {
            1. / self.white.y
        } else {
            1.
        };
        for v in dst.iter_mut() {
            let mut y = v.v[1] * scale;
            if !extended {
                y = y.max(0.).min(1.);
            }
            *v = Vector4f::from(y);
        }
        Ok(())
    }
}

/// Runs an element list, input and output are clamped to `[0, 1]`.
pub(crate) struct ElementsStage {
    pub(crate) elements: Vec<Element>,
}

impl InPlaceStage for ElementsStage {
    fn transform(&self, dst: &mut [Vector4f], _: bool) -> Result<(), CmsError> {
        for v in dst.iter_mut() {
            *v = v.clamp01();
        }
        for element in self.elements.iter() {
            element.apply_slice(dst);
        }
        for v in dst.iter_mut() {
            *v = v.clamp01();
        }
        Ok(())
    }
}

/// XYZ in the connection space stores 1.0 as 0x8000 in a 16 bit range.
pub(crate) const XYZ_ENCODING: f32 = 32768. / 65535.;

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum PcsStep {
    /// Multiplies the first three lanes.
    ScaleXyz(f32),
    /// Encoded Lab to real XYZ.
    LabToXyz,
    /// Real XYZ to encoded Lab.
    XyzToLab,
}

pub(crate) struct PcsStage {
    pub(crate) step: PcsStep,
}

impl InPlaceStage for PcsStage {
    fn transform(&self, dst: &mut [Vector4f], _: bool) -> Result<(), CmsError> {
        match self.step {
            PcsStep::ScaleXyz(scale) => {
                for v in dst.iter_mut() {
                    *v = Vector4f::new(v.v[0] * scale, v.v[1] * scale, v.v[2] * scale, v.v[3]);
                }
            }
            PcsStep::LabToXyz => {
                for v in dst.iter_mut() {
                    let xyz = Lab::from_pcs_vector(*v).to_xyz();
                    *v = Vector4f::new(xyz.x, xyz.y, xyz.z, v.v[3]);
                }
            }
            PcsStep::XyzToLab => {
                for v in dst.iter_mut() {
                    let lab = Lab::from_xyz(Xyz::new(v.v[0], v.v[1], v.v[2]));
                    *v = lab.to_pcs_vector(v.v[3]);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Vector3f;
    use crate::parametric::TransferFunction;
    use crate::trc::ToneCurve;

    #[test]
    fn test_matrix_stage_clamps_rgb_only() {
        let stage = MatrixStage {
            matrix: Matrix3f::from_scale(Vector3f::new(2., 0.5, -1.)),
            clamp: true,
        };
        let mut buffer = [Vector4f::new(0.75, 0.5, 0.5, 0.3); 3];
        stage.transform(&mut buffer, false).unwrap();
        assert_eq!(buffer[2], Vector4f::new(1., 0.25, 0., 0.3));
        let mut buffer = [Vector4f::new(0.75, 0.5, 0.5, 0.3); 5];
        stage.transform(&mut buffer, true).unwrap();
        assert_eq!(buffer[4], Vector4f::new(1.5, 0.25, -0.5, 0.3));
    }

    #[test]
    fn test_linearize_round_trip() {
        let table = Arc::new(TrcLut::new(&ToneCurve::from(TransferFunction::srgb())));
        let to = LinearizeStage {
            tables: vec![table.clone(), table.clone(), table.clone()],
        };
        let from = DelinearizeStage {
            tables: vec![table.clone(), table.clone(), table],
        };
        let mut buffer: Vec<Vector4f> = (0..=255)
            .map(|i| Vector4f::new(i as f32 / 255., 0.5, 1., 0.))
            .collect();
        let original = buffer.clone();
        to.transform(&mut buffer, false).unwrap();
        assert!((buffer[128].v[0] - 0.21586).abs() < 1e-3);
        from.transform(&mut buffer, false).unwrap();
        for (a, b) in buffer.iter().zip(original.iter()) {
            assert!((a.v[0] - b.v[0]).abs() < 1. / 4080.);
        }
    }

    #[test]
    fn test_gray_stages() {
        let white = Xyz::new(0.95047, 1., 1.08883);
        let mut buffer = [Vector4f::new(0.5, 0.5, 0.5, 0.); 2];
        GrayToXyzStage { white }.transform(&mut buffer, false).unwrap();
        assert_eq!(buffer[0], Vector4f::new(0.475235, 0.5, 0.544415, 0.));
        XyzToGrayStage { white }.transform(&mut buffer, false).unwrap();
        assert_eq!(buffer[1], Vector4f::from(0.5));
    }

    #[test]
    fn test_pcs_steps() {
        let mut buffer = [Vector4f::new(0.9642, 1., 0.8249, 0.)];
        PcsStage {
            step: PcsStep::XyzToLab,
        }
        .transform(&mut buffer, false)
        .unwrap();
        let lab = Vector4f::new(1., 128. / 255., 128. / 255., 0.);
        for (a, b) in buffer[0].v.iter().zip(lab.v.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
        PcsStage {
            step: PcsStep::LabToXyz,
        }
        .transform(&mut buffer, false)
        .unwrap();
        let xyz = Vector4f::new(0.9642, 1., 0.8249, 0.);
        for (a, b) in buffer[0].v.iter().zip(xyz.v.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
        PcsStage {
            step: PcsStep::ScaleXyz(XYZ_ENCODING),
        }
        .transform(&mut buffer, false)
        .unwrap();
        assert!((buffer[0].v[1] - 0.500_007_6).abs() < 1e-4);
    }
}
