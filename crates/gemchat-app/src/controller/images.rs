//! Reading image attachments from disk.

use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use gemchat_common::ImageData;

/// Inline request data is capped by the API at 20 MB.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Images that loaded plus one note per image that did not.
#[derive(Debug, Default)]
pub struct LoadedImages {
    pub images: Vec<ImageData>,
    pub notes: Vec<String>,
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub fn load_image(path: &Path) -> io::Result<ImageData> {
    let mime_type = mime_for(path).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "unsupported image type")
    })?;

    let size = std::fs::metadata(path)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("image is {size} bytes, limit is {MAX_IMAGE_BYTES}"),
        ));
    }

    let bytes = std::fs::read(path)?;
    Ok(ImageData {
        data: B64.encode(bytes),
        mime_type: mime_type.to_string(),
    })
}

/// Load every path. A failure never aborts the batch; it becomes a note
/// the caller can append to the outgoing text.
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> LoadedImages {
    let mut loaded = LoadedImages::default();
    for path in paths {
        let path = path.as_ref();
        match load_image(path) {
            Ok(image) => loaded.images.push(image),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
                loaded
                    .notes
                    .push(format!("[image {} could not be attached: {e}]", path.display()));
            }
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_is_encoded_with_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.PNG");
        std::fs::write(&path, b"hello").unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn failures_become_notes() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.jpg");
        std::fs::write(&good, [0xff, 0xd8]).unwrap();
        let missing = dir.path().join("missing.png");
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "x").unwrap();

        let loaded = load_images(&[good, missing, text]);
        assert_eq!(loaded.images.len(), 1);
        assert_eq!(loaded.images[0].mime_type, "image/jpeg");
        assert_eq!(loaded.notes.len(), 2);
        assert!(loaded.notes[1].contains("unsupported image type"));
    }
}
