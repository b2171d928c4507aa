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
use iccspace::{Argb32, ColorSpace, NamedColorSpace, TransformFlags};
use lcms2::{Intent, PixelFormat, Profile, Transform};
use std::fs;
use std::path::Path;

fn main() {
    let out = Path::new("./target/icc");
    fs::create_dir_all(out).unwrap();

    let srgb = ColorSpace::named(NamedColorSpace::SRgb);
    let srgb_icc = srgb.to_icc_bytes().unwrap();

    for named in NamedColorSpace::ALL {
        let space = ColorSpace::named(named);
        let icc = space.to_icc_bytes().unwrap();
        let path = out.join(format!("{:?}.icc", named).to_lowercase());
        fs::write(&path, &icc).unwrap();

        let decoded = ColorSpace::try_from_icc_profile(&icc).unwrap();
        println!(
            "{:<14} {:>5} bytes, re-read as {:?}, equal: {}",
            named.description(),
            icc.len(),
            decoded.named_color_space(),
            decoded == space
        );

        let pixels = [
            Argb32::opaque(255, 0, 0),
            Argb32::opaque(0, 255, 0),
            Argb32::opaque(0, 0, 255),
            Argb32::opaque(128, 128, 128),
        ];
        let mut ours = [Argb32::default(); 4];
        decoded
            .transformation_to(&srgb)
            .apply(&pixels, &mut ours, TransformFlags::default())
            .unwrap();

        // lcms2 reads the same bytes for comparison
        let Ok(reference) = Profile::new_icc(&icc) else {
            println!("    lcms2 rejected the profile");
            continue;
        };
        let srgb_profile = Profile::new_icc(&srgb_icc).unwrap();
        let t = Transform::new(
            &reference,
            PixelFormat::RGB_8,
            &srgb_profile,
            PixelFormat::RGB_8,
            Intent::RelativeColorimetric,
        )
        .unwrap();
        let src: Vec<[u8; 3]> = pixels.iter().map(|p| [p.red(), p.green(), p.blue()]).collect();
        let mut theirs = vec![[0u8; 3]; src.len()];
        t.transform_pixels(&src, &mut theirs);
        for ((p, a), b) in pixels.iter().zip(ours.iter()).zip(theirs.iter()) {
            println!(
                "    ({:3}, {:3}, {:3}) -> ours ({:3}, {:3}, {:3}) lcms2 ({:3}, {:3}, {:3})",
                p.red(),
                p.green(),
                p.blue(),
                a.red(),
                a.green(),
                a.blue(),
                b[0],
                b[1],
                b[2]
            );
        }
    }
}
