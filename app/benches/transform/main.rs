/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use criterion::{Criterion, criterion_group, criterion_main};
use iccspace::{Argb32, ColorSpace, NamedColorSpace, Rgba64, TransformFlags};
use lcms2::{Intent, PixelFormat, Profile, Transform};
use rand::Rng;

const WIDTH: usize = 1920;
const HEIGHT: usize = 1080;

fn random_rgba() -> Vec<u8> {
    let mut rng = rand::rng();
    (0..WIDTH * HEIGHT * 4).map(|_| rng.random::<u8>()).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let rgba = random_rgba();
    let argb: Vec<Argb32> = rgba
        .chunks_exact(4)
        .map(|x| Argb32::new(x[3], x[0], x[1], x[2]))
        .collect();
    let wide: Vec<Rgba64> = rgba
        .chunks_exact(4)
        .map(|x| {
            Rgba64::new(
                x[0] as u16 * 257,
                x[1] as u16 * 257,
                x[2] as u16 * 257,
                x[3] as u16 * 257,
            )
        })
        .collect();

    let p3 = ColorSpace::named(NamedColorSpace::DisplayP3);
    let srgb = ColorSpace::named(NamedColorSpace::SRgb);
    let p3_icc = p3.to_icc_bytes().unwrap();
    let srgb_icc = srgb.to_icc_bytes().unwrap();

    c.bench_function("iccspace: Argb32 P3 -> sRGB", |b| {
        let transform = p3.transformation_to(&srgb);
        let mut dst = vec![Argb32::default(); argb.len()];
        b.iter(|| {
            transform
                .apply(&argb, &mut dst, TransformFlags::default())
                .unwrap();
        })
    });

    c.bench_function("iccspace: Argb32 premultiplied P3 -> sRGB", |b| {
        let transform = p3.transformation_to(&srgb);
        let mut dst = vec![Argb32::default(); argb.len()];
        let flags = TransformFlags {
            input_premultiplied: true,
            output_premultiplied: true,
            input_opaque: false,
        };
        b.iter(|| {
            transform.apply(&argb, &mut dst, flags).unwrap();
        })
    });

    c.bench_function("iccspace: Rgba64 P3 -> sRGB", |b| {
        let transform = p3.transformation_to(&srgb);
        let mut dst = vec![Rgba64::default(); wide.len()];
        b.iter(|| {
            transform
                .apply(&wide, &mut dst, TransformFlags::default())
                .unwrap();
        })
    });

    c.bench_function("lcms2: RGBA P3 -> sRGB", |b| {
        let src_profile = Profile::new_icc(&p3_icc).unwrap();
        let dst_profile = Profile::new_icc(&srgb_icc).unwrap();
        let mut dst = vec![0u8; rgba.len()];
        let t = Transform::new(
            &src_profile,
            PixelFormat::RGBA_8,
            &dst_profile,
            PixelFormat::RGBA_8,
            Intent::Perceptual,
        )
        .unwrap();
        b.iter(|| {
            t.transform_pixels(&rgba, &mut dst);
        })
    });

    c.bench_function("qcms: RGBA P3 -> sRGB", |b| {
        let src_profile = qcms::Profile::new_from_slice(&p3_icc, false).unwrap();
        let mut dst_profile = qcms::Profile::new_sRGB();
        dst_profile.precache_output_transform();
        let mut dst = vec![0u8; rgba.len()];
        let xfm = qcms::Transform::new(
            &src_profile,
            &dst_profile,
            qcms::DataType::RGBA8,
            qcms::Intent::default(),
        )
        .unwrap();
        b.iter(|| {
            xfm.convert(&rgba, &mut dst);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
