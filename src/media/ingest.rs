use crate::assets::source::ImageSource;
use crate::caption::client::CaptionService;
use crate::foundation::error::SnapResult;
use crate::media::record::MediaRecord;
use crate::media::store::MediaStore;
use crate::placement::candidates::keyword_emojis;

/// Result of [`ingest`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ingested {
    /// The stored record.
    pub record: MediaRecord,
    /// `false` when the source was already known and the stored record was reused.
    pub created: bool,
    /// Caption service failure, if the record was created without server data.
    pub caption_error: Option<String>,
}

/// Find or create the media record for `source`. `context` goes to the caption service.
///
/// A caption service failure is not an error: the record is created with an empty caption and
/// only keyword-derived candidates, and the failure message is reported in the result.
#[tracing::instrument(skip_all, fields(id = %source.id()))]
pub fn ingest(
    source: &ImageSource,
    service: &dyn CaptionService,
    store: &mut dyn MediaStore,
    context: Option<&str>,
    now_ms: u64,
) -> SnapResult<Ingested> {
    if let Some(existing) = store.find_by_source(source) {
        tracing::debug!(record = %existing.id, "source already ingested");
        return Ok(Ingested {
            record: existing.clone(),
            created: false,
            caption_error: None,
        });
    }

    let mut record = MediaRecord::new(source, now_ms);
    record.user_id = store.profile().map(|p| p.id.clone());

    let caption_error = match service.generate_caption(source, context) {
        Ok(resp) => {
            record.caption = resp.caption;
            record.image_description = resp.image_description;
            record.suggested_emojis = resp.suggested_emojis;
            None
        }
        Err(err) => {
            tracing::warn!(%err, "caption service failed, continuing without caption");
            Some(err.to_string())
        }
    };
    record.keyword_emojis = keyword_emojis([
        record.caption.as_str(),
        record.image_description.as_str(),
    ]);

    store.insert(record.clone())?;
    tracing::info!(record = %record.id, candidates = record.candidates().len(), "ingested media");
    Ok(Ingested {
        record,
        created: true,
        caption_error,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/ingest.rs"]
mod tests;
