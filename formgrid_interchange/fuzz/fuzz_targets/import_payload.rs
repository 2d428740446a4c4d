#![no_main]
use libfuzzer_sys::fuzz_target;

use formgrid_interchange::import;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        // Must reject or load without panicking, never half-parse.
        let _ = import(raw);
    }
});
