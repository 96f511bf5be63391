//! Shared helpers for building directory trees and faking the certificate
//! service.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use siginspect::authenticode::{CertificateError, CertificateRecord, CertificateService, Result};
use siginspect::discovery::Discovery;
use tempfile::TempDir;

/// Creates `names` (relative, `/`-separated) as small files under a fresh
/// temporary directory.
pub fn create_tree(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        write_file(dir.path(), name, b"MZ");
    }
    dir
}

pub fn write_file(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Paths yielded by a walk, relative to `root`, panicking on errors.
pub fn relative_paths(root: &Path, walk: Discovery) -> Vec<String> {
    walk.map(|item| {
        let path = item.unwrap();
        path.strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/")
    })
    .collect()
}

pub fn relative_set(root: &Path, walk: Discovery) -> BTreeSet<String> {
    relative_paths(root, walk).into_iter().collect()
}

pub fn fake_record(path: &Path) -> CertificateRecord {
    CertificateRecord {
        path: path.to_path_buf(),
        issuer: "CN=Fake Issuer, O=Tests".into(),
        subject: "CN=Fake Subject, O=Tests".into(),
        not_before: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
        not_after: Utc.with_ymd_and_hms(2031, 3, 4, 5, 6, 7).unwrap(),
        serial_number: "0A0B0C".into(),
        thumbprint: "12".repeat(20),
        handle: 1024,
        version: 3,
        archived: false,
        valid: true,
    }
}

/// Succeeds for files whose name is in `signed`, fails to load the rest.
/// Records every path it is asked about.
#[derive(Default)]
pub struct FakeService {
    signed: BTreeSet<String>,
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeService {
    pub fn signing(names: &[&str]) -> Self {
        Self {
            signed: names.iter().map(|n| n.to_string()).collect(),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl CertificateService for FakeService {
    fn inspect(&self, path: &Path) -> Result<CertificateRecord> {
        self.calls.borrow_mut().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.signed.contains(&name) {
            Ok(fake_record(path))
        } else {
            Err(CertificateError::UnsupportedContainer)
        }
    }
}
