use std::cell::{Cell, RefCell};
use std::io::Cursor;

use super::*;
use crate::caption::client::{CaptionResponse, HealthResponse};
use crate::foundation::error::SnapError;
use crate::media::store::{InMemoryStore, UserProfile};

struct FakeService {
    reply: Option<CaptionResponse>,
    calls: Cell<usize>,
    context: RefCell<Option<String>>,
}

impl CaptionService for FakeService {
    fn generate_caption(
        &self,
        _: &ImageSource,
        context: Option<&str>,
    ) -> SnapResult<CaptionResponse> {
        self.calls.set(self.calls.get() + 1);
        *self.context.borrow_mut() = context.map(str::to_string);
        self.reply
            .clone()
            .ok_or_else(|| SnapError::collaborator("service down"))
    }

    fn health(&self) -> SnapResult<HealthResponse> {
        Err(SnapError::collaborator("service down"))
    }
}

fn png_source() -> ImageSource {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(buf)
}

#[test]
fn creates_record_from_caption_and_keywords() {
    let service = FakeService {
        reply: Some(CaptionResponse {
            caption: "Golden hour".into(),
            image_description: "a dog running on the beach".into(),
            suggested_emojis: vec!["✨".into()],
            success: true,
            error: None,
        }),
        calls: Cell::new(0),
        context: RefCell::new(None),
    };
    let mut store = InMemoryStore::new();
    store
        .set_profile(Some(UserProfile::login("me@site", "Me", 9)))
        .unwrap();

    let out = ingest(&png_source(), &service, &mut store, None, 100).unwrap();
    assert!(out.created);
    assert!(out.caption_error.is_none());
    assert_eq!(out.record.caption, "Golden hour");
    assert_eq!(out.record.keyword_emojis, vec!["🐶", "🏖️"]);
    assert_eq!(out.record.candidates(), vec!["✨", "🐶", "🏖️"]);
    assert_eq!(out.record.user_id.as_deref(), Some("9"));
    assert_eq!(store.list().len(), 1);
}

#[test]
fn known_source_is_not_captioned_again() {
    let service = FakeService {
        reply: Some(CaptionResponse::default()),
        calls: Cell::new(0),
        context: RefCell::new(None),
    };
    let mut store = InMemoryStore::new();
    let src = png_source();
    ingest(&src, &service, &mut store, None, 1).unwrap();
    let again = ingest(&src, &service, &mut store, None, 2).unwrap();
    assert!(!again.created);
    assert_eq!(again.record.created_at, 1);
    assert_eq!(service.calls.get(), 1);
    assert_eq!(store.list().len(), 1);
}

#[test]
fn caption_failure_falls_back_to_empty_text() {
    let service = FakeService {
        reply: None,
        calls: Cell::new(0),
        context: RefCell::new(None),
    };
    let mut store = InMemoryStore::new();
    let out = ingest(&png_source(), &service, &mut store, None, 1).unwrap();
    assert!(out.created);
    assert!(out.caption_error.unwrap().contains("service down"));
    assert!(out.record.caption.is_empty());
    assert!(out.record.candidates().is_empty());
}

#[test]
fn context_is_forwarded_to_the_caption_service() {
    let service = FakeService {
        reply: Some(CaptionResponse::default()),
        calls: Cell::new(0),
        context: RefCell::new(None),
    };
    let mut store = InMemoryStore::new();
    ingest(&png_source(), &service, &mut store, Some("wedding"), 1).unwrap();
    assert_eq!(service.context.borrow().as_deref(), Some("wedding"));
}
