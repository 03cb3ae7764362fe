//! Upload Preview
//!
//! Drag-and-drop picker state with an inline image preview.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A file offered by the host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Inline preview of an accepted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("nothing was dropped")]
    EmptyDrop,
}

/// Picker state machine. Rejected files leave the current preview in
/// place.
#[derive(Debug, Default)]
pub struct UploadPreview {
    drag_active: bool,
    preview: Option<Preview>,
}

impl UploadPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Take the first offered file. The drag flag clears whether or not
    /// the drop is usable.
    pub fn drop_files(&mut self, files: Vec<PickedFile>) -> Result<(), UploadError> {
        self.drag_active = false;
        let Some(file) = files.into_iter().next() else {
            return Err(UploadError::EmptyDrop);
        };
        self.pick(file)
    }

    /// Accept one file directly. Only `image/*` MIME types are usable.
    pub fn pick(&mut self, file: PickedFile) -> Result<(), UploadError> {
        if !file.mime.starts_with("image/") {
            return Err(UploadError::NotAnImage(file.name));
        }
        self.preview = Some(Preview {
            data_url: data_url(&file.mime, &file.bytes),
            file_name: file.name,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.drag_active = false;
        self.preview = None;
    }
}

/// Inline `data:` URL for raw bytes.
fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
