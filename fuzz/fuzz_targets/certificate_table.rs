#![no_main]
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use siginspect::formats::pe::certificates::{first_signed_data, parse_certificate_table, signed_data_blob};

fuzz_target!(|data: &[u8]| {
    let table = Bytes::copy_from_slice(data);
    if let Ok(entries) = parse_certificate_table(&table, 0) {
        if let Some(entry) = first_signed_data(&entries) {
            let _ = signed_data_blob(entry);
        }
    }
});
