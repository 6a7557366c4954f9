use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Extension given to compressed files.
pub const COMPRESSED_EXT: &str = "pcb";

const DECOMPRESSED_PREFIX: &str = "decompressed_";
const TEMP_SUFFIX: &str = ".tmp";

/// Extension of `path` without the dot, or an empty string. Extensions
/// that are not UTF-8 are refused rather than stored lossily.
pub fn extension_of(path: &Path) -> io::Result<String> {
    match path.extension() {
        None => Ok(String::new()),
        Some(ext) => ext.to_str().map(str::to_string).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("extension of {} is not valid UTF-8", path.display()),
            )
        }),
    }
}

/// `dir/name.txt` compresses to `dir/name.pcb`.
pub fn compressed_path(input: &Path) -> PathBuf {
    input.with_extension(COMPRESSED_EXT)
}

/// `dir/name.pcb` with extension `txt` decompresses to
/// `dir/decompressed_name.txt`. Path separators and NUL in the extension
/// become `_`, so the result always stays next to `compressed`.
pub fn decompressed_path(compressed: &Path, extension: &str) -> PathBuf {
    let stem = compressed
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}{}", DECOMPRESSED_PREFIX, stem);
    if !extension.is_empty() {
        name.push('.');
        name.extend(extension.chars().map(|c| {
            if matches!(c, '/' | '\\' | '\0') {
                '_'
            } else {
                c
            }
        }));
    }
    compressed.with_file_name(name)
}

/// Sibling path used while `path` is being written.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
