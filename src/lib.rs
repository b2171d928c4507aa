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
#![allow(clippy::manual_clamp, clippy::excessive_precision)]
#![deny(unreachable_pub)]
//! ICC color spaces: parsing and writing profiles, and converting pixels
//! between color spaces.
//!
//! ```
//! use iccspace::{Argb32, ColorSpace, NamedColorSpace};
//!
//! let srgb = ColorSpace::named(NamedColorSpace::SRgb);
//! let p3 = ColorSpace::named(NamedColorSpace::DisplayP3);
//! let transform = srgb.transformation_to(&p3);
//! let red = transform.map(Argb32::opaque(255, 0, 0));
//! assert!(red.green() > 0);
//!
//! let icc = p3.to_icc_bytes().unwrap();
//! assert_eq!(ColorSpace::from_icc_profile(&icc), p3);
//! ```
mod chad;
mod cicp;
mod clut;
mod color;
mod color_space;
mod conversions;
mod dat;
mod element;
mod err;
mod helpers;
mod lab;
mod lut;
mod matrix;
mod mlaf;
mod parametric;
mod primaries;
mod profile;
mod reader;
mod safe_math;
mod table;
mod tag;
mod transform;
mod trc;
mod writer;

pub use cicp::{CicpColorPrimaries, CicpProfile, CicpTransferCharacteristics};
pub use clut::ColorClut;
pub use color::{Argb32, Cmyk32, Color, Pixel, Rgba64, RgbaF32};
pub use color_space::{ColorModel, ColorSpace, NamedColorSpace, TransferCurveKind, TransformModel};
pub use dat::ColorDateTime;
pub use element::{CurveSet, Element};
pub use err::{CmsError, MalformedSize};
pub use lab::Lab;
pub use matrix::{Chromaticity, Matrix3f, Vector3, Vector3f, Vector4, Vector4f, XyY, Xyz};
pub use parametric::TransferFunction;
pub use primaries::{ColorSpacePrimaries, Primaries};
pub use profile::{DataColorSpace, ParsingOptions, ProfileClass, ProfileVersion, RenderingIntent};
pub use table::{TableKind, TableSamples, TransferTable};
pub use transform::{ColorTransform, TransformFlags};
pub use trc::ToneCurve;
