#![no_main]

use iccspace::{ColorSpace, ParsingOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Never panic expected
    _ = ColorSpace::try_from_icc_profile(data);
    let tight = ParsingOptions {
        max_profile_size: 4096,
        max_allowed_clut_size: 4096,
        max_allowed_trc_size: 256,
    };
    _ = ColorSpace::try_from_icc_profile_with_options(data, &tight);
});
