//! Image loading for raw-sensor and standard formats.
//!
//! Raw files are demosaiced to full color with imagepipe; everything else
//! goes through the image crate. Either way the result lands in the
//! canonical blue-green-red buffer, so downstream feature computation is
//! format-agnostic.

use std::path::Path;

use crate::buffer::BgrImage;
use crate::error::DecodeError;

/// Raw-sensor formats that take the demosaicing path.
pub const RAW_EXTENSIONS: &[&str] = &["cr2", "nef", "arw"];

/// Standard raster formats decoded directly.
pub const STANDARD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Lowercased extension of `path`, if it has one.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Check whether a filename carries a recognized image extension.
///
/// Case-insensitive, over the union of the raw and standard sets. This is
/// the predicate batch enumeration filters with.
pub fn is_image_path(path: &Path) -> bool {
    match extension(path) {
        Some(ext) => {
            RAW_EXTENSIONS.contains(&ext.as_str()) || STANDARD_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Decode `path` into a canonical blue-green-red pixel buffer.
///
/// Fails when the path does not exist, the extension is unrecognized, or the
/// underlying decoder cannot parse the file. No partial buffer is returned
/// on failure.
pub fn load_image(path: &Path) -> Result<BgrImage, DecodeError> {
    if !path.exists() {
        return Err(DecodeError::NotFound(path.to_path_buf()));
    }

    let ext =
        extension(path).ok_or_else(|| DecodeError::UnrecognizedExtension(path.to_path_buf()))?;

    if RAW_EXTENSIONS.contains(&ext.as_str()) {
        load_raw(path)
    } else if STANDARD_EXTENSIONS.contains(&ext.as_str()) {
        load_standard(path)
    } else {
        Err(DecodeError::UnrecognizedExtension(path.to_path_buf()))
    }
}

/// Demosaic a raw-sensor file to full-color 8-bit, then swap the channel
/// order into blue-green-red.
fn load_raw(path: &Path) -> Result<BgrImage, DecodeError> {
    // maxwidth/maxheight of 0 decode at native resolution
    let decoded = imagepipe::simple_decode_8bit(path, 0, 0).map_err(|reason| DecodeError::Raw {
        path: path.to_path_buf(),
        reason,
    })?;

    BgrImage::from_rgb(decoded.width as u32, decoded.height as u32, decoded.data)
        .ok_or_else(|| DecodeError::Empty(path.to_path_buf()))
}

/// Decode a standard raster file and swap into blue-green-red order.
fn load_standard(path: &Path) -> Result<BgrImage, DecodeError> {
    let img = image::ImageReader::open(path)
        .map_err(image::ImageError::IoError)
        .and_then(|reader| {
            reader
                .with_guessed_format()
                .map_err(image::ImageError::IoError)
        })
        .and_then(|reader| reader.decode())
        .map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    BgrImage::from_rgb(width, height, rgb.into_raw())
        .ok_or_else(|| DecodeError::Empty(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_solid_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(4, 4, Rgb(color));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_is_image_path_case_insensitive() {
        assert!(is_image_path(Path::new("photo.jpg")));
        assert!(is_image_path(Path::new("photo.JPEG")));
        assert!(is_image_path(Path::new("photo.CR2")));
        assert!(is_image_path(Path::new("photo.nef")));
        assert!(is_image_path(Path::new("photo.Bmp")));
        assert!(!is_image_path(Path::new("photo.TXT")));
        assert!(!is_image_path(Path::new("photo.tiff")));
        assert!(!is_image_path(Path::new("photo")));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound(_)));
    }

    #[test]
    fn test_unrecognized_extension_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"not an image").unwrap();
        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedExtension(_)));
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();
        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Image { .. }));
    }

    #[test]
    fn test_standard_decode_yields_bgr_order() {
        let dir = tempdir().unwrap();
        // Pure red in RGB must come back as [0, 0, 255] in BGR
        let path = write_solid_png(dir.path(), "red.png", [255, 0, 0]);

        let img = load_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.pixel(0, 0), [0, 0, 255]);
        assert_eq!(img.pixel(3, 3), [0, 0, 255]);
    }

    #[test]
    fn test_uppercase_extension_decodes() {
        let dir = tempdir().unwrap();
        let path = write_solid_png(dir.path(), "shot.PNG", [0, 255, 0]);

        let img = load_image(&path).unwrap();
        assert_eq!(img.pixel(0, 0), [0, 255, 0]);
    }
}
