//! Image files selected for upload.

use std::path::Path;

use uuid::Uuid;

/// An image picked by the admin, held in memory until uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extension of the original file name, without the dot.
    ///
    /// Only ASCII alphanumeric extensions count; anything else would need
    /// escaping in the object URL.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.bytes().all(|b| b.is_ascii_alphanumeric()))
    }

    /// MIME type guessed from the extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        let ext = self.extension().map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            Some("avif") => "image/avif",
            _ => "application/octet-stream",
        }
    }

    /// A fresh object key: a random UUID plus the original extension, if any.
    ///
    /// Collisions are practically impossible but not checked.
    #[must_use]
    pub fn upload_key(&self) -> String {
        let id = Uuid::new_v4();
        match self.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}
