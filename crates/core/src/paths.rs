//! Output file naming.

use std::path::{Path, PathBuf};

/// Directory translated documents are written to by default.
pub const DEFAULT_OUTPUT_DIR: &str = "PDFoutput";

const SUFFIX: &str = "_translated";
const DEFAULT_EXTENSION: &str = "pdf";

/// `<output_dir>/<basename>_translated.<ext>` for `input`.
///
/// The extension of the input is kept; inputs without one get `.pdf`.
pub fn translated_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    output_dir.join(format!("{stem}{SUFFIX}.{extension}"))
}
