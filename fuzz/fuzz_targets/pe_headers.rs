#![no_main]
use libfuzzer_sys::fuzz_target;
use siginspect::formats::pe::headers::{parse_coff_header, parse_dos_header, parse_optional_header};

fuzz_target!(|data: &[u8]| {
    let Ok(dos) = parse_dos_header(data) else {
        return;
    };
    let start = dos.e_lfanew as usize;
    if let Some(nt) = data.get(start..) {
        if parse_coff_header(nt).is_ok() {
            let _ = parse_optional_header(nt.get(24..).unwrap_or_default());
        }
    }
});
