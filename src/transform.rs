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
use crate::color::{Color, Pixel};
use crate::color_space::{ColorSpace, ColorSpaceData};
use crate::conversions::Pipeline;
use crate::err::CmsError;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

/// Alpha handling of [ColorTransform::apply].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TransformFlags {
    /// Source color channels are multiplied by alpha.
    pub input_premultiplied: bool,
    /// Multiply destination color channels by alpha.
    pub output_premultiplied: bool,
    /// Treat source alpha as fully opaque.
    pub input_opaque: bool,
}

struct TransformData {
    source: Arc<ColorSpaceData>,
    destination: Arc<ColorSpaceData>,
    pipeline: Pipeline,
}

/// Conversion of pixels from one color space to another.
///
/// A transform involving an invalid color space is the identity, pixels
/// pass through unchanged.
#[derive(Clone, Default)]
pub struct ColorTransform {
    d: Option<Arc<TransformData>>,
}

impl Debug for ColorTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.d {
            None => f.write_str("ColorTransform(identity)"),
            Some(d) => f
                .debug_struct("ColorTransform")
                .field("source", &d.source.description)
                .field("destination", &d.destination.description)
                .finish(),
        }
    }
}

impl PartialEq for ColorTransform {
    fn eq(&self, other: &Self) -> bool {
        match (&self.d, &other.d) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.source.equals(&b.source) && a.destination.equals(&b.destination))
            }
            _ => false,
        }
    }
}

fn xyz_data() -> Arc<ColorSpaceData> {
    static XYZ: OnceLock<Arc<ColorSpaceData>> = OnceLock::new();
    XYZ.get_or_init(|| Arc::new(ColorSpaceData::xyz())).clone()
}

impl ColorTransform {
    fn new(source: Arc<ColorSpaceData>, destination: Arc<ColorSpaceData>) -> ColorTransform {
        if !source.is_valid() || !destination.is_valid() {
            log::debug!("Transform involves an invalid color space, using identity");
            return ColorTransform::default();
        }
        if Arc::ptr_eq(&source, &destination) || source.equals(&destination) {
            return ColorTransform::default();
        }
        match Pipeline::new(&source, &destination) {
            Ok(pipeline) if pipeline.is_empty() => ColorTransform::default(),
            Ok(pipeline) => ColorTransform {
                d: Some(Arc::new(TransformData {
                    source,
                    destination,
                    pipeline,
                })),
            },
            Err(err) => {
                log::debug!(
                    "Cannot transform from {:?} to {:?}, using identity: {err}",
                    source.description,
                    destination.description
                );
                ColorTransform::default()
            }
        }
    }

    /// Pixels come out exactly as they went in.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.d.is_none()
    }

    /// Converts one pixel, clamping unless the encoding is extended.
    ///
    /// The pixel is returned unchanged when its color model does not match
    /// both ends of the transform.
    pub fn map<P: Pixel>(&self, pixel: P) -> P {
        let Some(d) = &self.d else {
            return pixel;
        };
        if P::MODEL != d.source.color_model || P::MODEL != d.destination.color_model {
            log::debug!("Pixel layout does not match the transform, pixel left unchanged");
            return pixel;
        }
        let mut dst = [P::default()];
        match d.pipeline.apply(&[pixel], &mut dst, TransformFlags::default()) {
            Ok(()) => dst[0],
            Err(_) => pixel,
        }
    }

    /// Converts one color without clamping intermediate values.
    ///
    /// Gray sources read the luma of an RGB color, gray results come back as
    /// RGB with equal components. A color of the wrong model maps to
    /// [Color::Invalid].
    pub fn map_color(&self, color: Color) -> Color {
        let Some(d) = &self.d else {
            return color;
        };
        let Some(v) = color.to_vector(d.source.color_model) else {
            log::debug!("Color does not match the transform source model");
            return Color::Invalid;
        };
        let mut buffer = [v];
        match d.pipeline.run(&mut buffer, true) {
            Ok(()) => Color::from_vector(buffer[0], color.alpha(), d.destination.color_model),
            Err(_) => Color::Invalid,
        }
    }

    /// Converts `src` into `dst`.
    ///
    /// Both buffers must have the same length and their color models must
    /// match the source and destination of the transform. Alpha is copied
    /// from the source, or is opaque when the source has none.
    pub fn apply<S: Pixel, D: Pixel>(
        &self,
        src: &[S],
        dst: &mut [D],
        flags: TransformFlags,
    ) -> Result<(), CmsError> {
        if src.len() != dst.len() {
            return Err(CmsError::LaneSizeMismatch);
        }
        match &self.d {
            None => {
                if S::MODEL != D::MODEL {
                    return Err(CmsError::InvalidLayout);
                }
                Pipeline::default().apply(src, dst, flags)
            }
            Some(d) => {
                if S::MODEL != d.source.color_model || D::MODEL != d.destination.color_model {
                    return Err(CmsError::InvalidLayout);
                }
                d.pipeline.apply(src, dst, flags)
            }
        }
    }
}

impl ColorSpace {
    /// Transform from this color space to `destination`.
    ///
    /// Identity when either side is invalid or both describe the same space.
    pub fn transformation_to(&self, destination: &ColorSpace) -> ColorTransform {
        ColorTransform::new(self.d.clone(), destination.d.clone())
    }

    /// Transform into D50 XYZ, results come back as RGB with x, y and z in
    /// the red, green and blue channels.
    pub fn transformation_to_xyz(&self) -> ColorTransform {
        ColorTransform::new(self.d.clone(), xyz_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clut::ColorClut;
    use crate::color::{Argb32, Cmyk32, Rgba64, RgbaF32};
    use crate::color_space::{ColorModel, NamedColorSpace, TransferCurveKind};
    use crate::element::{CurveSet, Element};
    use crate::lab::Lab;
    use crate::matrix::{Chromaticity, Vector4f};
    use crate::primaries::ColorSpacePrimaries;
    use crate::trc::ToneCurve;
    use rand::Rng;

    fn identity_cube() -> ColorClut {
        ColorClut::from_fn(vec![2, 2, 2], 3, |x| Vector4f::new(x[0], x[1], x[2], 0.)).unwrap()
    }

    #[test]
    fn test_identity_law() {
        for named in NamedColorSpace::ALL {
            let cs = ColorSpace::named(named);
            let transform = cs.transformation_to(&cs);
            assert!(transform.is_identity());
            let pixel = Argb32::new(200, 10, 128, 250);
            assert_eq!(transform.map(pixel), pixel);
            let color = Color::rgba(0.25, 1.5, -0.1, 0.5);
            assert_eq!(transform.map_color(color), color);
        }
        let a = ColorSpace::new_custom(ColorSpacePrimaries::SRGB, TransferCurveKind::Gamma, 2.2);
        let b = a.with_transfer_function(TransferCurveKind::Gamma, 2.2);
        assert!(a.transformation_to(&b).is_identity());
    }

    #[test]
    fn test_srgb_red_in_display_p3() {
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let p3 = ColorSpace::named(NamedColorSpace::DisplayP3);
        let transform = srgb.transformation_to(&p3);
        assert!(!transform.is_identity());
        let red = transform.map(Argb32::opaque(255, 0, 0));
        assert_eq!(red.alpha(), 255);
        assert!(red.red() < 255);
        assert!(red.green() > 0 && red.blue() > 0);
        assert!((red.red() as i32 - 234).abs() <= 2, "{red:?}");
        assert!((red.green() as i32 - 51).abs() <= 2, "{red:?}");
        assert!((red.blue() as i32 - 35).abs() <= 2, "{red:?}");

        // the other way leaves the sRGB gamut and clamps
        let back = p3.transformation_to(&srgb).map(Argb32::opaque(255, 0, 0));
        assert_eq!((back.red(), back.green(), back.blue()), (255, 0, 0));
        let extended = p3
            .transformation_to(&srgb)
            .map(RgbaF32::new(1., 0., 0., 1.));
        assert!(extended.r > 1. && extended.g < 0.);
    }

    #[test]
    fn test_linear_round_trip_levels() {
        let linear = ColorSpace::named(NamedColorSpace::SRgbLinear);
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let forward = linear.transformation_to(&srgb);
        let backward = srgb.transformation_to(&linear);
        let src: Vec<RgbaF32> = (0..=255)
            .map(|i| {
                let v = i as f32 / 255.;
                RgbaF32::new(v, v, v, 1.)
            })
            .collect();
        let mut encoded = vec![RgbaF32::default(); src.len()];
        let mut decoded = vec![RgbaF32::default(); src.len()];
        forward
            .apply(&src, &mut encoded, TransformFlags::default())
            .unwrap();
        backward
            .apply(&encoded, &mut decoded, TransformFlags::default())
            .unwrap();
        for (a, b) in src.iter().zip(decoded.iter()) {
            assert!((a.r - b.r).abs() <= 1. / 4080., "{a:?} {b:?}");
            assert!((a.g - b.g).abs() <= 1. / 4080., "{a:?} {b:?}");
            assert!((a.b - b.b).abs() <= 1. / 4080., "{a:?} {b:?}");
        }
    }

    #[test]
    fn test_composition_law() {
        let mut rng = rand::rng();
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        // each of these contains the sRGB gamut, so nothing clamps on the way
        for named in [
            NamedColorSpace::AdobeRgb,
            NamedColorSpace::DisplayP3,
            NamedColorSpace::ProPhotoRgb,
        ] {
            let wide = ColorSpace::named(named);
            let there = srgb.transformation_to(&wide);
            let back = wide.transformation_to(&srgb);
            for _ in 0..64 {
                let src = Rgba64::new(
                    rng.random_range(6554..=65535),
                    rng.random_range(6554..=65535),
                    rng.random_range(6554..=65535),
                    rng.random_range(0..=65535),
                );
                let result = back.map(there.map(src));
                assert_eq!(result.a, src.a);
                for (x, y) in [(src.r, result.r), (src.g, result.g), (src.b, result.b)] {
                    assert!((x as i32 - y as i32).abs() <= 16, "{src:?} {result:?}");
                }
            }
        }
    }

    #[test]
    fn test_clut_only_lists_are_identity() {
        let a = ColorSpace::from_element_lists(
            ColorModel::Rgb,
            false,
            vec![Element::Clut(identity_cube())],
            vec![Element::Clut(identity_cube())],
        );
        let b = ColorSpace::from_element_lists(
            ColorModel::Rgb,
            false,
            vec![
                Element::Curves(CurveSet::new(vec![ToneCurve::linear(); 3])),
                Element::Clut(identity_cube()),
            ],
            vec![Element::Clut(identity_cube())],
        );
        assert!(a.is_valid() && b.is_valid());
        let transform = a.transformation_to(&b);
        assert!(!transform.is_identity());
        let mut rng = rand::rng();
        for _ in 0..100 {
            let (r, g, bl) = (
                rng.random_range(0f32..1.),
                rng.random_range(0f32..1.),
                rng.random_range(0f32..1.),
            );
            let mapped = transform.map_color(Color::rgba(r, g, bl, 0.5));
            let Color::Rgb {
                red, green, blue, ..
            } = mapped
            else {
                panic!("{mapped:?}");
            };
            assert!((red - r).abs() < 1e-5 && (green - g).abs() < 1e-5 && (blue - bl).abs() < 1e-5);
            assert_eq!(mapped.alpha(), 0.5);
        }
        let src = [Rgba64::new(1000, 30000, 65535, 7)];
        let mut dst = [Rgba64::default()];
        transform
            .apply(&src, &mut dst, TransformFlags::default())
            .unwrap();
        assert_eq!(dst, src);

        // the device values are encoded XYZ
        let to_xyz = a.transformation_to_xyz();
        let Color::Rgb { green, .. } = to_xyz.map_color(Color::rgb(0.25, 0.5, 0.75)) else {
            panic!("expected rgb");
        };
        assert!((green - 0.5 * 65535. / 32768.).abs() < 1e-4);
    }

    #[test]
    fn test_transformation_to_xyz() {
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let transform = srgb.transformation_to_xyz();
        let Color::Rgb {
            red, green, blue, ..
        } = transform.map_color(Color::rgb(1., 1., 1.))
        else {
            panic!("expected rgb");
        };
        assert!((red - 0.9642).abs() < 1e-3);
        assert!((green - 1.).abs() < 1e-3);
        assert!((blue - 0.8249).abs() < 1e-3);
        assert_eq!(transform, srgb.transformation_to_xyz());
    }

    #[test]
    fn test_gray_to_rgb() {
        let gray = ColorSpace::new_gray(Chromaticity::D65, TransferCurveKind::SRgb, 0.);
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let transform = gray.transformation_to(&srgb);
        assert!(!transform.is_identity());
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![Argb32::default(); 256];
        transform
            .apply(&src, &mut dst, TransformFlags::default())
            .unwrap();
        for (g, p) in src.iter().zip(dst.iter()) {
            assert_eq!(p.alpha(), 255);
            for c in [p.red(), p.green(), p.blue()] {
                assert!((c as i32 - *g as i32).abs() <= 1, "{g} {p:?}");
            }
        }

        let back = srgb.transformation_to(&gray);
        let mut levels = vec![0u8; 256];
        back.apply(&dst, &mut levels, TransformFlags::default())
            .unwrap();
        for (a, b) in src.iter().zip(levels.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
        let Color::Rgb { red, green, .. } = back.map_color(Color::rgb(1., 1., 1.)) else {
            panic!("expected rgb");
        };
        assert!((red - 1.).abs() < 1e-3);
        assert_eq!(red, green);
    }

    #[test]
    fn test_cmyk_lists() {
        let ink = |x: &[f32]| {
            let darkness = 1. - (1. - x[3]) * (1. - (x[0] + x[1] + x[2]) / 3.);
            Lab::new(100. * (1. - darkness), 0., 0.).to_pcs_vector(0.)
        };
        let a_to_b = ColorClut::from_fn(vec![2, 2, 2, 2], 3, ink).unwrap();
        let b_to_a = ColorClut::from_fn(vec![2, 2, 2], 4, |x| {
            Vector4f::new(0., 0., 0., 1. - x[0])
        })
        .unwrap();
        let cmyk = ColorSpace::from_element_lists(
            ColorModel::Cmyk,
            true,
            vec![Element::Clut(a_to_b)],
            vec![Element::Clut(b_to_a)],
        );
        assert!(cmyk.is_valid());
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);

        let to_rgb = cmyk.transformation_to(&srgb);
        let src = [Cmyk32::new(0, 0, 0, 0), Cmyk32::new(0, 0, 0, 255)];
        let mut dst = [Argb32::default(); 2];
        to_rgb
            .apply(&src, &mut dst, TransformFlags::default())
            .unwrap();
        for c in [dst[0].red(), dst[0].green(), dst[0].blue()] {
            assert!(c >= 253, "{:?}", dst[0]);
        }
        for c in [dst[1].red(), dst[1].green(), dst[1].blue()] {
            assert!(c <= 2, "{:?}", dst[1]);
        }
        assert_eq!(dst[0].alpha(), 255);

        let to_cmyk = srgb.transformation_to(&cmyk);
        let mut ink = [Cmyk32::default(); 2];
        to_cmyk
            .apply(
                &[Argb32::opaque(255, 255, 255), Argb32::opaque(0, 0, 0)],
                &mut ink,
                TransformFlags::default(),
            )
            .unwrap();
        assert!(ink[0].black() <= 2, "{:?}", ink[0]);
        assert!(ink[1].black() >= 253, "{:?}", ink[1]);
        assert_eq!(ink[0].cyan(), 0);

        let black = to_rgb.map_color(Color::cmyk(0., 0., 0., 1.));
        assert!(matches!(black, Color::Rgb { red, .. } if red < 0.01));
        assert_eq!(to_rgb.map_color(Color::rgb(1., 1., 1.)), Color::Invalid);
    }

    #[test]
    fn test_layout_errors() {
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let p3 = ColorSpace::named(NamedColorSpace::DisplayP3);
        let transform = srgb.transformation_to(&p3);
        let src = [Argb32::opaque(1, 2, 3); 4];
        let mut cmyk = [Cmyk32::default(); 4];
        assert_eq!(
            transform.apply(&src, &mut cmyk, TransformFlags::default()),
            Err(CmsError::InvalidLayout)
        );
        let mut short = [Argb32::default(); 3];
        assert_eq!(
            transform.apply(&src, &mut short, TransformFlags::default()),
            Err(CmsError::LaneSizeMismatch)
        );
        let identity = ColorTransform::default();
        assert_eq!(
            identity.apply(&src, &mut cmyk, TransformFlags::default()),
            Err(CmsError::InvalidLayout)
        );
        let mut wide = [Rgba64::default(); 4];
        identity
            .apply(&src, &mut wide, TransformFlags::default())
            .unwrap();
        assert_eq!(wide[0], Rgba64::new(257, 514, 771, 65535));
        assert_eq!(transform.map(Cmyk32(5)), Cmyk32(5));
    }

    #[test]
    fn test_premultiplied_alpha() {
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let linear = ColorSpace::named(NamedColorSpace::SRgbLinear);
        let transform = srgb.transformation_to(&linear);
        let src = [Argb32::new(128, 128, 0, 0), Argb32::new(0, 40, 40, 40)];
        let flags = TransformFlags {
            input_premultiplied: true,
            output_premultiplied: true,
            input_opaque: false,
        };
        let mut dst = [Argb32::default(); 2];
        transform.apply(&src, &mut dst, flags).unwrap();
        // 128/128 unpremultiplies to full red, linear 1.0 times alpha again
        assert_eq!(dst[0], Argb32::new(128, 128, 0, 0));
        assert_eq!(dst[1], Argb32::new(0, 0, 0, 0));

        let mut straight = [Argb32::default(); 2];
        transform
            .apply(
                &src,
                &mut straight,
                TransformFlags {
                    input_premultiplied: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(straight[0], Argb32::new(128, 255, 0, 0));

        let mut opaque = [Argb32::default(); 2];
        transform
            .apply(
                &src,
                &mut opaque,
                TransformFlags {
                    input_opaque: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(opaque[1].alpha(), 255);
    }

    #[test]
    fn test_invalid_spaces_are_identity() {
        let invalid = ColorSpace::from_icc_profile(&[0u8; 16]);
        assert!(!invalid.is_valid());
        let srgb = ColorSpace::named(NamedColorSpace::SRgb);
        let transform = invalid.transformation_to(&srgb);
        assert!(transform.is_identity());
        let pixel = Argb32::opaque(1, 2, 3);
        assert_eq!(transform.map(pixel), pixel);
        assert!(srgb.transformation_to(&invalid).is_identity());

        let collinear = ColorSpace::new_custom(
            ColorSpacePrimaries::new(
                Chromaticity::D65,
                Chromaticity::new(0.1, 0.1),
                Chromaticity::new(0.2, 0.2),
                Chromaticity::new(0.3, 0.3),
            ),
            TransferCurveKind::SRgb,
            0.,
        );
        assert!(!collinear.is_valid());
        let transform = srgb.transformation_to(&collinear);
        assert!(transform.is_identity());
        let pixel = Argb32::opaque(200, 100, 50);
        assert_eq!(transform.map(pixel), pixel);

        // no way back into an element list without B2A
        let one_way = ColorSpace::from_element_lists(
            ColorModel::Rgb,
            false,
            vec![Element::Clut(identity_cube())],
            Vec::new(),
        );
        assert!(srgb.transformation_to(&one_way).is_identity());
        assert!(!one_way.transformation_to(&srgb).is_identity());
    }
}
