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
use crate::color_space::{ColorModel, ColorSpaceData, TransformModel};
use crate::conversions::pixel::{load_chunk, store_chunk};
use crate::conversions::stages::{
    DelinearizeStage, ElementsStage, GrayToXyzStage, InPlaceStage, LinearizeStage, MatrixStage,
    PcsStage, PcsStep, XYZ_ENCODING, XyzToGrayStage,
};
use crate::err::CmsError;
use crate::lut::TrcLut;
use crate::matrix::{Matrix3f, Vector4f};
use crate::tag::B2A0_TAG;
use crate::transform::TransformFlags;
use std::sync::Arc;

/// Pixels converted per pass through the stages.
pub(crate) const CHUNK: usize = 256;

/// Representation of the connection space between two halves of a pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Pcs {
    /// D50 XYZ, white has unit luminance.
    XyzReal,
    /// XYZ as element lists carry it.
    XyzEncoded,
    /// Lab packed into `[0, 1]`.
    LabEncoded,
}

/// Ordered stages converting working vectors from one space to another.
#[derive(Default)]
pub(crate) struct Pipeline {
    stages: Vec<Box<dyn InPlaceStage>>,
}

/// Tables for the first `channels` curves, `None` when all of them are linear.
fn curve_tables(data: &ColorSpaceData, channels: usize) -> Option<Vec<Arc<TrcLut>>> {
    if data.trc[..channels].iter().all(|c| c.is_identity()) {
        return None;
    }
    Some(data.lut.tables(&data.trc)[..channels].to_vec())
}

impl Pipeline {
    pub(crate) fn new(
        source: &ColorSpaceData,
        destination: &ColorSpaceData,
    ) -> Result<Pipeline, CmsError> {
        let mut pipeline = Pipeline::default();
        let matrix_rgb = |data: &ColorSpaceData| {
            data.transform_model == TransformModel::ThreeComponentMatrix
                && data.color_model == ColorModel::Rgb
        };
        if matrix_rgb(source) && matrix_rgb(destination) {
            let inverse = destination
                .to_xyz
                .inverse()
                .ok_or(CmsError::InvalidMatrix)?;
            let combined = inverse.mat_mul(source.to_xyz);
            if combined.is_identity() && source.trc == destination.trc {
                return Ok(pipeline);
            }
            if let Some(tables) = curve_tables(source, 3) {
                pipeline.push(LinearizeStage { tables });
            }
            if !combined.is_identity() {
                pipeline.push(MatrixStage {
                    matrix: combined,
                    clamp: true,
                });
            }
            if let Some(tables) = curve_tables(destination, 3) {
                pipeline.push(DelinearizeStage { tables });
            }
            return Ok(pipeline);
        }

        let from = pipeline.push_source(source)?;
        let to = if destination.transform_model == TransformModel::ElementListProcessing {
            if destination.is_pcs_lab {
                Pcs::LabEncoded
            } else {
                Pcs::XyzEncoded
            }
        } else {
            Pcs::XyzReal
        };
        pipeline.push_pcs(from, to);
        pipeline.push_destination(destination)?;
        Ok(pipeline)
    }

    fn push(&mut self, stage: impl InPlaceStage + 'static) {
        self.stages.push(Box::new(stage));
    }

    fn push_matrix(&mut self, matrix: Matrix3f, clamp: bool) {
        if !matrix.is_identity() {
            self.push(MatrixStage { matrix, clamp });
        }
    }

    fn push_source(&mut self, data: &ColorSpaceData) -> Result<Pcs, CmsError> {
        match (data.transform_model, data.color_model) {
            (TransformModel::ElementListProcessing, _) => {
                self.push(ElementsStage {
                    elements: data.a_to_b.clone(),
                });
                Ok(if data.is_pcs_lab {
                    Pcs::LabEncoded
                } else {
                    Pcs::XyzEncoded
                })
            }
            (TransformModel::ThreeComponentMatrix, ColorModel::Rgb) => {
                if let Some(tables) = curve_tables(data, 3) {
                    self.push(LinearizeStage { tables });
                }
                self.push_matrix(data.to_xyz, false);
                Ok(Pcs::XyzReal)
            }
            (TransformModel::ThreeComponentMatrix, ColorModel::Gray) => {
                if let Some(tables) = curve_tables(data, 1) {
                    self.push(LinearizeStage { tables });
                }
                self.push(GrayToXyzStage {
                    white: data.white_point,
                });
                self.push_matrix(data.to_xyz, false);
                Ok(Pcs::XyzReal)
            }
            _ => Err(CmsError::InvalidColorSpace),
        }
    }

    fn push_pcs(&mut self, from: Pcs, to: Pcs) {
        if from == to {
            return;
        }
        match from {
            Pcs::XyzReal => {}
            Pcs::XyzEncoded => self.push(PcsStage {
                step: PcsStep::ScaleXyz(1. / XYZ_ENCODING),
            }),
            Pcs::LabEncoded => self.push(PcsStage {
                step: PcsStep::LabToXyz,
            }),
        }
        match to {
            Pcs::XyzReal => {}
            Pcs::XyzEncoded => self.push(PcsStage {
                step: PcsStep::ScaleXyz(XYZ_ENCODING),
            }),
            Pcs::LabEncoded => self.push(PcsStage {
                step: PcsStep::XyzToLab,
            }),
        }
    }

    fn push_destination(&mut self, data: &ColorSpaceData) -> Result<(), CmsError> {
        match (data.transform_model, data.color_model) {
            (TransformModel::ElementListProcessing, _) => {
                if data.b_to_a.is_empty() {
                    return Err(CmsError::MissingTag(B2A0_TAG));
                }
                self.push(ElementsStage {
                    elements: data.b_to_a.clone(),
                });
            }
            (TransformModel::ThreeComponentMatrix, ColorModel::Rgb) => {
                let inverse = data.to_xyz.inverse().ok_or(CmsError::InvalidMatrix)?;
                self.push_matrix(inverse, true);
                if let Some(tables) = curve_tables(data, 3) {
                    self.push(DelinearizeStage { tables });
                }
            }
            (TransformModel::ThreeComponentMatrix, ColorModel::Gray) => {
                let inverse = data.to_xyz.inverse().ok_or(CmsError::InvalidMatrix)?;
                self.push_matrix(inverse, false);
                self.push(XyzToGrayStage {
                    white: data.white_point,
                });
                if let Some(tables) = curve_tables(data, 3) {
                    self.push(DelinearizeStage { tables });
                }
            }
            _ => return Err(CmsError::InvalidColorSpace),
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub(crate) fn run(&self, buffer: &mut [Vector4f], extended: bool) -> Result<(), CmsError> {
        for stage in self.stages.iter() {
            stage.transform(buffer, extended)?;
        }
        Ok(())
    }

    /// Converts `src` into `dst` chunk by chunk, both must have equal length.
    pub(crate) fn apply<S: Pixel, D: Pixel>(
        &self,
        src: &[S],
        dst: &mut [D],
        flags: TransformFlags,
    ) -> Result<(), CmsError> {
        if src.len() != dst.len() {
            return Err(CmsError::LaneSizeMismatch);
        }
        let extended = D::EXTENDED;
        let mut buffer = [Vector4f::default(); CHUNK];
        let mut alphas = [0f32; CHUNK];
        for (src, dst) in src.chunks(CHUNK).zip(dst.chunks_mut(CHUNK)) {
            let working = &mut buffer[..src.len()];
            let alpha = &mut alphas[..src.len()];
            load_chunk(src, working, alpha, flags);
            self.run(working, extended)?;
            store_chunk(working, alpha, dst, flags);
        }
        Ok(())
    }
}
