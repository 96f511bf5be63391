#![no_main]
use libfuzzer_sys::fuzz_target;
use siginspect::authenticode::signed_data::SignedData;

fuzz_target!(|data: &[u8]| {
    if let Ok(signed) = SignedData::decode_ber(data) {
        for info in &signed.signer_infos {
            let _ = info.signed_attributes_digested_content();
        }
    }
});
