//! The real certificate service over the signed samples.

use std::fs;
use std::io::Write;

use chrono::{TimeZone, Utc};
use siginspect::app::run_with_config;
use siginspect::authenticode::{AuthenticodeService, CertificateService};
use siginspect::config::Config;
use siginspect::error::FailureKind;
use siginspect::formats::pe::PeImage;
use siginspect::inspect::{InspectionOutcome, Inspector};
use tempfile::TempDir;

use crate::common::sample_file_path;
use crate::common::test_data::*;
use crate::common::test_utils::write_file;

fn service() -> AuthenticodeService {
    AuthenticodeService::new().at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
}

/// Copies of the samples in a fresh directory.
fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in [SIGNED_EXE, EXPIRED_DLL, UNSIGNED_EXE, README_TXT] {
        let data = fs::read(sample_file_path(name)).unwrap();
        let file_name = name.rsplit('/').next().unwrap();
        write_file(dir.path(), file_name, &data);
    }
    dir
}

fn signature_der() -> Vec<u8> {
    let data = fs::read(sample_file_path(SIGNED_EXE)).unwrap();
    let (offset, len) = SIGNED_EXE_BLOB;
    data[offset..offset + len].to_vec()
}

#[test]
fn test_pe_certificate_table_location() {
    let mut pe = PeImage::open(sample_file_path(SIGNED_EXE)).unwrap();
    assert!(pe.is_signed());
    let blob = pe.signature().unwrap();
    assert_eq!(blob.offset, SIGNED_EXE_BLOB.0 as u64);
    assert_eq!(blob.der.len(), SIGNED_EXE_BLOB.1);

    let pe = PeImage::open(sample_file_path(UNSIGNED_EXE)).unwrap();
    assert!(!pe.is_signed());
}

#[test]
fn test_sample_directory_run() {
    let dir = sample_tree();
    let config = Config {
        show_exceptions: true,
        ..Config::default()
    };

    let mut console = Vec::new();
    let summary = run_with_config(dir.path(), &config, service(), &mut console).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.certificate_failures, 2);

    let text = String::from_utf8(console).unwrap();
    assert!(text.contains("Issuer: CN=Siginspect Test Signer, O=Siginspect Fixtures, C=US\n"));
    assert!(text.contains("Active from: 2020-01-01 00:00:00 UTC\nActive until: 2049-12-31 00:00:00 UTC\n"));
    assert!(text.contains("Certificate is valid\n"));
    assert!(text.contains("Certificate is invalid\n"));
    assert!(text.contains("unsigned.exe: Failed to load certificate.\n"));
    assert!(text.contains("readme.txt: Failed to load certificate.\n"));
    assert!(text.ends_with("Certificates found: 2\n"));
}

#[test]
fn test_binaries_only_skips_text() {
    let dir = sample_tree();
    let config = Config {
        binaries_only: true,
        show_exceptions: true,
        verbose: true,
        ..Config::default()
    };

    let mut console = Vec::new();
    let summary = run_with_config(dir.path(), &config, service(), &mut console).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.certificate_failures, 1);

    let text = String::from_utf8(console).unwrap();
    assert!(!text.contains("readme.txt"));
    assert!(text.contains("Serial number: 5A17C0DE\n"));
    assert!(text.contains("Thumbprint: F1F71E19437BB13E721678662748E2668F2AFC69\n"));
    assert!(text.contains("Handle: 336\n"));
    assert!(text.contains("Version: 3\n"));
}

#[test]
fn test_signed_msi_package() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("setup.msi");
    {
        let mut package = cfb::create(&path).unwrap();
        let mut stream = package.create_stream("\u{5}DigitalSignature").unwrap();
        stream.write_all(&signature_der()).unwrap();
        stream.flush().unwrap();
    }

    let record = service().inspect(&path).unwrap();
    assert_eq!(record.handle, 0);
    assert_eq!(record.serial_number, "5A17C0DE");
    assert!(record.valid);
}

#[test]
fn test_msi_signature_stream_padding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("padded.msi");
    {
        let mut package = cfb::create(&path).unwrap();
        let mut stream = package.create_stream("\u{5}DigitalSignature").unwrap();
        stream.write_all(&signature_der()).unwrap();
        stream.write_all(&[0u8; 8]).unwrap();
        stream.flush().unwrap();
    }

    let record = service().inspect(&path).unwrap();
    assert_eq!(record.thumbprint, "F1F71E19437BB13E721678662748E2668F2AFC69");
    assert!(record.valid);
}

#[test]
fn test_msi_signature_stream_junk_tail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("junk.msi");
    let mut der = signature_der();
    // Outer length now claims more than the stream holds.
    der[3] = der[3].wrapping_add(4);
    {
        let mut package = cfb::create(&path).unwrap();
        let mut stream = package.create_stream("\u{5}DigitalSignature").unwrap();
        stream.write_all(&der).unwrap();
        stream.write_all(b"junk").unwrap();
        stream.flush().unwrap();
    }

    match Inspector::new(service()).inspect_path(&path) {
        InspectionOutcome::Failure(failure) => assert_eq!(failure.kind, FailureKind::LoadFailure),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unsigned_msi_package() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("setup.msi");
    {
        let mut package = cfb::create(&path).unwrap();
        package.create_stream("\u{5}SummaryInformation").unwrap();
        package.flush().unwrap();
    }

    match Inspector::new(service()).inspect_path(&path) {
        InspectionOutcome::Failure(failure) => assert_eq!(failure.kind, FailureKind::LoadFailure),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_truncated_signature_fails_to_load() {
    let data = fs::read(sample_file_path(SIGNED_EXE)).unwrap();
    let dir = TempDir::new().unwrap();
    // Cut into the certificate table.
    let path = write_file(dir.path(), "cut.exe", &data[..900]);

    match Inspector::new(service()).inspect_path(&path) {
        InspectionOutcome::Failure(failure) => {
            assert_eq!(failure.kind, FailureKind::LoadFailure, "{}", failure.detail)
        }
        other => panic!("unexpected {other:?}"),
    }
}
