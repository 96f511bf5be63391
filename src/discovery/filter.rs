use std::ffi::OsStr;
use std::path::Path;

/// Extensions kept when only binaries are wanted. Matched case-sensitively.
pub const BINARY_EXTENSIONS: [&str; 3] = ["exe", "dll", "msi"];

/// Whether `path` should be inspected.
pub fn is_eligible(path: &Path, binaries_only: bool) -> bool {
    !binaries_only
        || path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext))
}
