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
use crate::color_space::ColorModel;
use crate::matrix::Vector4f;

/// Pixel encoding accepted by [crate::ColorTransform::apply].
///
/// Every encoding loads into a working [Vector4f] holding the stored channel
/// values scaled to `[0, 1]` plus an alpha value, and stores back from them.
pub trait Pixel: Copy + Default + Send + Sync + 'static {
    /// Color model the channels belong to.
    const MODEL: ColorModel;
    /// Values outside `[0, 1]` are representable.
    const EXTENDED: bool;
    const HAS_ALPHA: bool;

    /// Channel values and alpha, both in `[0, 1]` for integer encodings.
    fn load(self) -> (Vector4f, f32);

    /// Inverse of [Pixel::load], `v` and `alpha` are clamped by the caller
    /// unless the encoding is extended.
    fn store(v: Vector4f, alpha: f32) -> Self;
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255. + 0.5) as u8
}

#[inline]
fn to_u16(v: f32) -> u16 {
    (v * 65535. + 0.5) as u16
}

/// 8 bit RGB with alpha packed as `0xAARRGGBB`.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Argb32(pub u32);

impl Argb32 {
    #[inline]
    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Argb32(
            ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32,
        )
    }

    #[inline]
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self::new(255, red, green, blue)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl Pixel for Argb32 {
    const MODEL: ColorModel = ColorModel::Rgb;
    const EXTENDED: bool = false;
    const HAS_ALPHA: bool = true;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        const S: f32 = 1. / 255.;
        (
            Vector4f::new(
                self.red() as f32 * S,
                self.green() as f32 * S,
                self.blue() as f32 * S,
                0.,
            ),
            self.alpha() as f32 * S,
        )
    }

    #[inline]
    fn store(v: Vector4f, alpha: f32) -> Self {
        Argb32::new(to_u8(alpha), to_u8(v.v[0]), to_u8(v.v[1]), to_u8(v.v[2]))
    }
}

/// 16 bit per channel RGBA.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rgba64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Rgba64 {
    #[inline]
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }
}

impl Pixel for Rgba64 {
    const MODEL: ColorModel = ColorModel::Rgb;
    const EXTENDED: bool = false;
    const HAS_ALPHA: bool = true;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        const S: f32 = 1. / 65535.;
        (
            Vector4f::new(self.r as f32 * S, self.g as f32 * S, self.b as f32 * S, 0.),
            self.a as f32 * S,
        )
    }

    #[inline]
    fn store(v: Vector4f, alpha: f32) -> Self {
        Rgba64::new(to_u16(v.v[0]), to_u16(v.v[1]), to_u16(v.v[2]), to_u16(alpha))
    }
}

/// Floating point RGBA, values outside `[0, 1]` are kept.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RgbaF32 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaF32 {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Pixel for RgbaF32 {
    const MODEL: ColorModel = ColorModel::Rgb;
    const EXTENDED: bool = true;
    const HAS_ALPHA: bool = true;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        (Vector4f::new(self.r, self.g, self.b, 0.), self.a)
    }

    #[inline]
    fn store(v: Vector4f, alpha: f32) -> Self {
        RgbaF32::new(v.v[0], v.v[1], v.v[2], alpha)
    }
}

/// 8 bit CMYK packed as `0xCCMMYYKK`.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cmyk32(pub u32);

impl Cmyk32 {
    #[inline]
    pub const fn new(cyan: u8, magenta: u8, yellow: u8, black: u8) -> Self {
        Cmyk32(
            ((cyan as u32) << 24) | ((magenta as u32) << 16) | ((yellow as u32) << 8) | black as u32,
        )
    }

    #[inline]
    pub const fn cyan(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn magenta(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn yellow(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn black(self) -> u8 {
        self.0 as u8
    }
}

impl Pixel for Cmyk32 {
    const MODEL: ColorModel = ColorModel::Cmyk;
    const EXTENDED: bool = false;
    const HAS_ALPHA: bool = false;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        const S: f32 = 1. / 255.;
        (
            Vector4f::new(
                self.cyan() as f32 * S,
                self.magenta() as f32 * S,
                self.yellow() as f32 * S,
                self.black() as f32 * S,
            ),
            1.,
        )
    }

    #[inline]
    fn store(v: Vector4f, _: f32) -> Self {
        Cmyk32::new(to_u8(v.v[0]), to_u8(v.v[1]), to_u8(v.v[2]), to_u8(v.v[3]))
    }
}

/// 8 bit gray.
impl Pixel for u8 {
    const MODEL: ColorModel = ColorModel::Gray;
    const EXTENDED: bool = false;
    const HAS_ALPHA: bool = false;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        let v = self as f32 * (1. / 255.);
        (Vector4f::new(v, v, v, 0.), 1.)
    }

    #[inline]
    fn store(v: Vector4f, _: f32) -> Self {
        to_u8(v.v[0])
    }
}

/// 16 bit gray.
impl Pixel for u16 {
    const MODEL: ColorModel = ColorModel::Gray;
    const EXTENDED: bool = false;
    const HAS_ALPHA: bool = false;

    #[inline]
    fn load(self) -> (Vector4f, f32) {
        let v = self as f32 * (1. / 65535.);
        (Vector4f::new(v, v, v, 0.), 1.)
    }

    #[inline]
    fn store(v: Vector4f, _: f32) -> Self {
        to_u16(v.v[0])
    }
}

/// Color value for single color mapping with [crate::ColorTransform::map_color].
///
/// Components are unpremultiplied and not limited to `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum Color {
    #[default]
    Invalid,
    Rgb {
        red: f32,
        green: f32,
        blue: f32,
        alpha: f32,
    },
    Cmyk {
        cyan: f32,
        magenta: f32,
        yellow: f32,
        black: f32,
        alpha: f32,
    },
}

impl Color {
    #[inline]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Color::Rgb {
            red,
            green,
            blue,
            alpha: 1.,
        }
    }

    #[inline]
    pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Color::Rgb {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[inline]
    pub const fn cmyk(cyan: f32, magenta: f32, yellow: f32, black: f32) -> Self {
        Color::Cmyk {
            cyan,
            magenta,
            yellow,
            black,
            alpha: 1.,
        }
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Color::Invalid)
    }

    pub const fn alpha(&self) -> f32 {
        match *self {
            Color::Invalid => 0.,
            Color::Rgb { alpha, .. } | Color::Cmyk { alpha, .. } => alpha,
        }
    }

    /// Working vector in the layout of `model`, `None` when the color cannot
    /// be read as that model.
    ///
    /// Gray reads the Rec. 709 luma of an RGB color.
    pub(crate) fn to_vector(self, model: ColorModel) -> Option<Vector4f> {
        match (self, model) {
            (
                Color::Rgb {
                    red, green, blue, ..
                },
                ColorModel::Rgb,
            ) => Some(Vector4f::new(red, green, blue, 0.)),
            (
                Color::Rgb {
                    red, green, blue, ..
                },
                ColorModel::Gray,
            ) => {
                let y = 0.2126 * red + 0.7152 * green + 0.0722 * blue;
                Some(Vector4f::new(y, y, y, 0.))
            }
            (
                Color::Cmyk {
                    cyan,
                    magenta,
                    yellow,
                    black,
                    ..
                },
                ColorModel::Cmyk,
            ) => Some(Vector4f::new(cyan, magenta, yellow, black)),
            _ => None,
        }
    }

    pub(crate) fn from_vector(v: Vector4f, alpha: f32, model: ColorModel) -> Color {
        match model {
            ColorModel::Rgb => Color::rgba(v.v[0], v.v[1], v.v[2], alpha),
            ColorModel::Gray => Color::rgba(v.v[0], v.v[0], v.v[0], alpha),
            ColorModel::Cmyk => Color::Cmyk {
                cyan: v.v[0],
                magenta: v.v[1],
                yellow: v.v[2],
                black: v.v[3],
                alpha,
            },
            ColorModel::Undefined => Color::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        let p = Argb32::new(0x80, 0x10, 0x20, 0x30);
        assert_eq!(p.0, 0x8010_2030);
        assert_eq!((p.alpha(), p.red(), p.green(), p.blue()), (0x80, 0x10, 0x20, 0x30));
        let (v, a) = p.load();
        assert_eq!(Argb32::store(v, a), p);

        let c = Cmyk32::new(1, 2, 3, 4);
        assert_eq!(c.0, 0x0102_0304);
        let (v, _) = c.load();
        assert_eq!(Cmyk32::store(v, 1.), c);
    }

    #[test]
    fn test_gray_and_wide_encodings() {
        for value in [0u16, 1, 32767, 65534, 65535] {
            let (v, a) = value.load();
            assert_eq!(a, 1.);
            assert_eq!(u16::store(v, a), value);
        }
        for value in 0..=255u8 {
            let (v, _) = value.load();
            assert_eq!(u8::store(v, 1.), value);
        }
        let p = Rgba64::new(1, 65535, 30000, 12);
        let (v, a) = p.load();
        assert_eq!(Rgba64::store(v, a), p);
        let (v, a) = RgbaF32::new(-0.5, 1.5, 0.25, 0.5).load();
        assert_eq!(v.v[0], -0.5);
        assert_eq!(RgbaF32::store(v, a), RgbaF32::new(-0.5, 1.5, 0.25, 0.5));
    }

    #[test]
    fn test_color_vectors() {
        let white = Color::rgb(1., 1., 1.);
        let gray = white.to_vector(ColorModel::Gray).unwrap();
        assert!((gray.v[0] - 1.).abs() < 1e-6);
        assert!(white.to_vector(ColorModel::Cmyk).is_none());
        assert!(Color::Invalid.to_vector(ColorModel::Rgb).is_none());
        let cmyk = Color::cmyk(0.1, 0.2, 0.3, 0.4);
        let v = cmyk.to_vector(ColorModel::Cmyk).unwrap();
        assert_eq!(Color::from_vector(v, 1., ColorModel::Cmyk), cmyk);
        assert_eq!(
            Color::from_vector(Vector4f::new(0.5, 0., 0., 0.), 0.25, ColorModel::Gray),
            Color::rgba(0.5, 0.5, 0.5, 0.25)
        );
    }
}
