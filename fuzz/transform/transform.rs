#![no_main]

use iccspace::{
    Argb32, Cmyk32, Color, ColorModel, ColorSpace, NamedColorSpace, RgbaF32, TransformFlags,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(space) = ColorSpace::try_from_icc_profile(data) else {
        return;
    };
    let srgb = ColorSpace::named(NamedColorSpace::SRgb);
    let to_srgb = space.transformation_to(&srgb);
    let from_srgb = srgb.transformation_to(&space);
    let flags = TransformFlags {
        input_premultiplied: true,
        output_premultiplied: true,
        input_opaque: false,
    };
    let pixels: Vec<u8> = (0..=255).collect();
    match space.color_model() {
        ColorModel::Rgb => {
            let src: Vec<Argb32> = pixels
                .iter()
                .map(|&x| Argb32::new(x, x, 255 - x, x / 2))
                .collect();
            let mut dst = vec![Argb32::default(); src.len()];
            _ = to_srgb.apply(&src, &mut dst, flags);
            let mut back = vec![Argb32::default(); src.len()];
            _ = from_srgb.apply(&dst, &mut back, flags);
            let mut float = vec![RgbaF32::default(); src.len()];
            _ = to_srgb.apply(&src, &mut float, flags);
        }
        ColorModel::Gray => {
            let mut dst = vec![Argb32::default(); pixels.len()];
            _ = to_srgb.apply(&pixels, &mut dst, flags);
            let mut back = vec![0u8; pixels.len()];
            _ = from_srgb.apply(&dst, &mut back, flags);
        }
        ColorModel::Cmyk => {
            let src: Vec<Cmyk32> = pixels
                .iter()
                .map(|&x| Cmyk32::new(x, 255 - x, x / 3, x / 2))
                .collect();
            let mut dst = vec![Argb32::default(); src.len()];
            _ = to_srgb.apply(&src, &mut dst, flags);
            let mut back = vec![Cmyk32::default(); src.len()];
            _ = from_srgb.apply(&dst, &mut back, flags);
        }
        ColorModel::Undefined => {}
    }
    _ = to_srgb.map_color(Color::rgb(2., -1., 0.5));
    _ = space.transformation_to_xyz().map_color(Color::cmyk(0.1, 0.2, 0.3, 0.4));
});
