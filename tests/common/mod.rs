//! Common test utilities and helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub mod test_utils;

/// Get the full path to a sample file
pub fn sample_file_path<P: AsRef<Path>>(relative_path: P) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .join(relative_path)
}

/// Signed sample files
pub mod test_data {
    /// PE32+ image signed by a self-signed certificate valid 2020 to 2049
    pub const SIGNED_EXE: &str = "signed/signed.exe";

    /// DLL signed by a certificate that expired in 2010
    pub const EXPIRED_DLL: &str = "signed/expired.dll";

    /// PE32+ image without a certificate table
    pub const UNSIGNED_EXE: &str = "signed/unsigned.exe";

    /// Plain text file
    pub const README_TXT: &str = "signed/readme.txt";

    /// Offset and length of the PKCS#7 blob inside `SIGNED_EXE`
    pub const SIGNED_EXE_BLOB: (usize, usize) = (336, 1496);
}
