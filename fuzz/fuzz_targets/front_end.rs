// fuzz_targets/front_end.rs
#![no_main]

use gogetset::format::format_source;
use gogetset_parser::{parse_package_clause, parse_source};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_package_clause(src);
    match parse_source(src) {
        Ok(file) => {
            let _ = file.package_name();
            // Valid input must format, and formatting must be stable.
            let once = format_source(src).expect("valid source formats");
            let twice = format_source(&once).expect("formatted source stays valid");
            assert_eq!(once, twice);
        }
        Err(failure) => assert!(!failure.diags.is_empty()),
    }
});
