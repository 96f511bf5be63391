#![no_main]
use libfuzzer_sys::fuzz_target;
use siginspect::config::ConfigFile;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(file) = ConfigFile::parse(Path::new("<fuzz>"), text) {
            let _ = file.flags();
            let _ = file.palette();
        }
    }
});
