//! Image parts and the package-wide image registry.
//!
//! Images are content-addressed by the SHA-1 of their bytes: adding the same
//! picture twice, from any slide, yields the same image part.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::part::{BasePart, ImageId, Part};
use crate::ooxml::opc::{OpcError, PackURI};
use crate::ooxml::pptx::format::ImageFormat;
use sha1::{Digest, Sha1};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Partname template for image parts; the extension is appended.
const IMAGE_PARTNAME_STEM: &str = "/ppt/media/image%d";

/// Image bytes to be added to a package, with the filename they came from.
#[derive(Debug, Clone)]
pub struct ImageSource {
    blob: Vec<u8>,
    filename: Option<String>,
}

impl ImageSource {
    /// Read an image file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let blob = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        Ok(Self { blob, filename })
    }

    /// Use in-memory bytes; the format is detected from the content.
    pub fn from_bytes(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: blob.into(),
            filename: None,
        }
    }

    /// Attach a filename whose extension names the format.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    #[inline]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Format and partname extension: a recognised filename extension wins,
    /// otherwise the content is sniffed.
    fn format_and_ext(&self) -> Result<(ImageFormat, String)> {
        let ext = self
            .filename
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        if let Some(ext) = ext
            && let Some(format) = ImageFormat::from_extension(&ext)
        {
            return Ok((format, ext));
        }

        ImageFormat::detect_from_bytes(&self.blob)
            .map(|format| (format, format.extension().to_string()))
            .ok_or_else(|| {
                OoxmlError::InvalidFormat(format!(
                    "unrecognised image format{}",
                    self.filename
                        .as_deref()
                        .map(|name| format!(" for '{}'", name))
                        .unwrap_or_default()
                ))
            })
    }
}

/// Lower-case hex SHA-1 of `bytes`.
pub fn sha1_hex(bytes: &[u8]) -> String {
    let digest = Sha1::digest(bytes);
    let mut hex = String::with_capacity(40);
    for byte in digest.iter() {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// An image part (`/ppt/media/imageN.ext`).
#[derive(Debug, Clone)]
pub struct ImagePart {
    base: BasePart,
    blob: Vec<u8>,
    sha1: String,
}

impl ImagePart {
    /// Wrap loaded or new image bytes.
    pub fn new(base: BasePart, blob: Vec<u8>) -> Self {
        let sha1 = sha1_hex(&blob);
        Self { base, blob, sha1 }
    }

    /// Hex SHA-1 of the image bytes.
    #[inline]
    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// Image format, from the content type or, failing that, the bytes.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_content_type(self.content_type())
            .or_else(|| ImageFormat::detect_from_bytes(&self.blob))
    }
}

impl Part for ImagePart {
    fn base(&self) -> &BasePart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePart {
        &mut self.base
    }

    fn blob(&self) -> crate::ooxml::opc::Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.blob))
    }
}

/// Every image part of a package, deduplicated by SHA-1.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    images: Vec<ImagePart>,
    by_sha1: HashMap<String, ImageId>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the image with the same bytes as `source`, adding a new image
    /// part if there is none.
    pub fn add_image(&mut self, source: &ImageSource) -> Result<ImageId> {
        let sha1 = sha1_hex(source.blob());
        if let Some(&id) = self.by_sha1.get(&sha1) {
            tracing::debug!(%id, sha1 = %sha1, "reusing image part");
            return Ok(id);
        }

        let (format, ext) = source.format_and_ext()?;
        let partname = self.next_image_partname(&ext)?;
        tracing::debug!(partname = %partname, "adding image part");

        let base = BasePart::new(partname, format.content_type());
        Ok(self.insert(ImagePart::new(base, source.blob().to_vec())))
    }

    /// Register an image part read from a package.
    ///
    /// Loaded images are never merged: two identical pictures stored under
    /// different partnames stay two parts. Later additions match the first.
    pub fn insert(&mut self, image: ImagePart) -> ImageId {
        let id = ImageId::new(self.images.len());
        self.by_sha1.entry(image.sha1.clone()).or_insert(id);
        self.images.push(image);
        id
    }

    /// `/ppt/media/image{N}.{ext}` with the lowest N no image uses.
    fn next_image_partname(&self, ext: &str) -> Result<PackURI> {
        let mut used: Vec<u32> = self
            .images
            .iter()
            .filter(|image| image.partname().filename().starts_with("image"))
            .filter_map(|image| image.partname().idx())
            .collect();
        used.sort_unstable();
        used.dedup();

        let mut n = 1u32;
        for idx in used {
            if idx != n {
                break;
            }
            n += 1;
        }

        let template = format!("{}.{}", IMAGE_PARTNAME_STEM, ext);
        PackURI::from_template(&template, n)
            .map_err(|e| OoxmlError::Opc(OpcError::InvalidPackUri(e)))
    }

    pub fn get(&self, id: ImageId) -> Option<&ImagePart> {
        self.images.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImagePart> {
        self.images.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use std::io::Write;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 9, 9, 9];

    #[test]
    fn test_sha1_hex() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_add_image_dedups_by_content() {
        let mut registry = ImageRegistry::new();
        let first = registry.add_image(&ImageSource::from_bytes(PNG_BYTES)).unwrap();
        let again = registry
            .add_image(&ImageSource::from_bytes(PNG_BYTES).with_filename("copy.png"))
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(registry.len(), 1);

        let image = registry.get(first).unwrap();
        assert_eq!(image.partname().as_str(), "/ppt/media/image1.png");
        assert_eq!(image.content_type(), ct::PNG);
        assert_eq!(image.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_partnames_fill_gaps_and_keep_extension() {
        let mut registry = ImageRegistry::new();
        registry.insert(ImagePart::new(
            BasePart::new(PackURI::new("/ppt/media/image2.png").unwrap(), ct::PNG),
            PNG_BYTES.to_vec(),
        ));

        let id = registry
            .add_image(&ImageSource::from_bytes(JPEG_BYTES).with_filename("Photo.JPG"))
            .unwrap();
        assert_eq!(registry.get(id).unwrap().partname().as_str(), "/ppt/media/image1.jpg");

        let id = registry
            .add_image(&ImageSource::from_bytes(b"GIF89a....".to_vec()))
            .unwrap();
        assert_eq!(registry.get(id).unwrap().partname().as_str(), "/ppt/media/image3.gif");
    }

    #[test]
    fn test_unrecognised_image_is_rejected() {
        let mut registry = ImageRegistry::new();
        let result = registry.add_image(&ImageSource::from_bytes(b"not an image".to_vec()));
        assert!(matches!(result, Err(OoxmlError::InvalidFormat(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(PNG_BYTES).unwrap();

        let source = ImageSource::from_path(file.path()).unwrap();
        assert_eq!(source.blob(), PNG_BYTES);
        assert!(source.filename().unwrap().ends_with(".png"));

        assert!(matches!(
            ImageSource::from_path(file.path().with_extension("missing")),
            Err(OoxmlError::Io(_))
        ));
    }
}
