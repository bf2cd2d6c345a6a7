use serde::{Deserialize, Serialize};

use crate::assets::source::{ContentId, ImageSource};
use crate::filters::catalog::ORIGINAL_FILTER;
use crate::foundation::error::SnapResult;
use crate::placement::candidates::merge_candidates;

/// Media kind, derived from the MIME type at ingestion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    #[default]
    Image,
    /// Video file; kept in the gallery but never composed.
    Video,
}

impl MediaKind {
    /// `video/*` maps to [`MediaKind::Video`], everything else to [`MediaKind::Image`].
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Per-image state shared between the gallery and the composition surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Content id of the encoded bytes, assigned at ingestion.
    pub id: ContentId,
    /// Encoded image as a `data:` URL.
    pub file_url: String,
    /// Image or video.
    pub file_type: MediaKind,
    /// Caption text (empty when the caption service failed).
    #[serde(default)]
    pub caption: String,
    /// Longer description of the image content.
    #[serde(default)]
    pub image_description: String,
    /// Decorations suggested by the caption service.
    #[serde(default)]
    pub suggested_emojis: Vec<String>,
    /// Decorations derived locally from caption keywords.
    #[serde(default)]
    pub keyword_emojis: Vec<String>,
    /// Set once auto-placement put at least one decoration on the image.
    #[serde(default)]
    pub emojis_placed: bool,
    /// Active filter id.
    #[serde(default = "default_filter_id")]
    pub filter_id: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Owner, if a profile was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_filter_id() -> String {
    ORIGINAL_FILTER.to_string()
}

impl MediaRecord {
    /// Fresh record for `source` with no caption data.
    pub fn new(source: &ImageSource, created_at: u64) -> Self {
        Self {
            id: source.id(),
            file_url: source.to_data_url(),
            file_type: MediaKind::from_mime(source.mime()),
            caption: String::new(),
            image_description: String::new(),
            suggested_emojis: Vec::new(),
            keyword_emojis: Vec::new(),
            emojis_placed: false,
            filter_id: default_filter_id(),
            created_at,
            user_id: None,
        }
    }

    /// Decoration candidates: server suggestions first, then keyword matches, de-duplicated.
    pub fn candidates(&self) -> Vec<String> {
        merge_candidates(&self.suggested_emojis, &self.keyword_emojis)
    }

    /// Decode the stored data URL back into an image source.
    pub fn source(&self) -> SnapResult<ImageSource> {
        ImageSource::from_data_url(&self.file_url)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/record.rs"]
mod tests;
