/*
 * // Copyright 2024 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use criterion::{Criterion, criterion_group, criterion_main};
use iccspace::{ColorSpace, NamedColorSpace};
use std::hint::black_box;

pub fn criterion_benchmark(c: &mut Criterion) {
    let p3_icc = ColorSpace::named(NamedColorSpace::DisplayP3)
        .to_icc_bytes()
        .unwrap();
    let pq_icc = ColorSpace::named(NamedColorSpace::Bt2100Pq)
        .to_icc_bytes()
        .unwrap();

    c.bench_function("iccspace: parse Display P3", |b| {
        b.iter(|| black_box(ColorSpace::from_icc_profile(black_box(&p3_icc))))
    });

    c.bench_function("iccspace: parse BT.2100 PQ", |b| {
        b.iter(|| black_box(ColorSpace::from_icc_profile(black_box(&pq_icc))))
    });

    c.bench_function("iccspace: encode BT.2100 PQ", |b| {
        let space = ColorSpace::named(NamedColorSpace::Bt2100Pq);
        b.iter(|| {
            // editing a shared descriptor copies it and drops the cached bytes
            let mut edited = space.clone();
            edited.set_description("PQ");
            black_box(edited.to_icc_bytes())
        })
    });

    c.bench_function("lcms2: parse Display P3", |b| {
        b.iter(|| black_box(lcms2::Profile::new_icc(black_box(&p3_icc)).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
