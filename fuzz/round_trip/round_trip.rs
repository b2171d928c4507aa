#![no_main]

use iccspace::ColorSpace;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(space) = ColorSpace::try_from_icc_profile(data) else {
        return;
    };
    // Shapes the writer cannot express are rejected, everything else must
    // parse again
    let Ok(encoded) = space.to_icc_bytes() else {
        return;
    };
    let decoded = ColorSpace::try_from_icc_profile(&encoded).unwrap();
    assert_eq!(decoded.color_model(), space.color_model());
    assert_eq!(decoded.transform_model(), space.transform_model());
});
