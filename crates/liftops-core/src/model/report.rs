// Completion payload.

/// Reference to an uploaded photo (backend attachment id or URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef(pub String);

/// What the technician hands in when completing a visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReport {
    pub photos: Vec<PhotoRef>,
    pub note: Option<String>,
}

impl CompletionReport {
    pub fn photo_count(&self) -> u32 {
        u32::try_from(self.photos.len()).unwrap_or(u32::MAX)
    }
}
