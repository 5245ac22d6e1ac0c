// ============================================================================
// FILE I/O — reading sources, writing exports, native dialogs
// ============================================================================
//
// Decoding and encoding are the engine's job; this module only moves bytes
// and drives the `rfd` dialogs for the GUI paths.
// ============================================================================

use std::path::{Path, PathBuf};

use rfd::FileDialog;

use crate::engine::ExportFormat;

/// Fixed default filename for exports, as the save button has always
/// produced.
pub const DEFAULT_EXPORT_NAME: &str = "edited-image.png";

/// Extensions offered in the open dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tga", "ico", "tiff"];

/// Full-quality JPEG for exports; the CLI may lower it.
pub const EXPORT_JPEG_QUALITY: u8 = 100;

pub fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("could not read '{}': {}", path.display(), e))
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("could not create '{}': {}", parent.display(), e))?;
    }
    std::fs::write(path, bytes)
        .map_err(|e| format!("could not write '{}': {}", path.display(), e))
}

/// Map an output path to an export format by extension. Unknown or missing
/// extensions fall back to full-quality PNG.
pub fn format_for_path(path: &Path, jpeg_quality: u8) -> ExportFormat {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => ExportFormat::Jpeg {
            quality: jpeg_quality,
        },
        _ => ExportFormat::Png,
    }
}

/// Native open dialog filtered to supported raster formats.
pub fn pick_image_to_open() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// Native save dialog pre-filled with the default export name.
pub fn pick_export_path() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("PNG", &["png"])
        .add_filter("JPEG", &["jpg", "jpeg"])
        .set_file_name(DEFAULT_EXPORT_NAME)
        .save_file()
}
