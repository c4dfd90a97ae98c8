//! Image decoding with content-based format detection.

use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

use crate::error::TransformError;

/// Decode the image at `path`.
///
/// The format is guessed from the file's leading bytes, falling back to the
/// extension. Every failure (missing file, unknown format, corrupt data) is a
/// [`TransformError::Decode`].
pub fn decode(path: &Path) -> Result<DynamicImage, TransformError> {
    let decode_err = |message: String| TransformError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = ImageReader::open(path)
        .map_err(|e| decode_err(format!("Cannot open file: {}", e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))?;

    if reader.format().is_none() {
        let format = ImageFormat::from_path(path).map_err(|_| {
            decode_err(format!(
                "Unsupported format: {}",
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
            ))
        })?;
        reader.set_format(format);
    }

    reader.decode().map_err(|e| decode_err(e.to_string()))
}
