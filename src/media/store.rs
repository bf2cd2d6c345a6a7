use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::source::{ContentId, ImageSource};
use crate::foundation::error::SnapResult;
use crate::media::record::MediaRecord;

/// Characters of the data URL compared by the fallback duplicate check.
pub const TAIL_MATCH_CHARS: usize = 100;

/// Role of the local profile. There is no authentication behind it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user.
    #[default]
    User,
    /// Administrator.
    Admin,
}

/// Lightweight local profile stored next to the media records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Profile id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: UserRole,
}

impl UserProfile {
    /// Profile for a sign-in with `email`/`name` at `now_ms`; emails containing `admin` get the
    /// admin role.
    pub fn login(email: &str, name: &str, now_ms: u64) -> Self {
        Self {
            id: now_ms.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: if email.contains("admin") {
                UserRole::Admin
            } else {
                UserRole::User
            },
        }
    }
}

/// Source and sink for media records. The core does not know the storage medium.
pub trait MediaStore {
    /// All records, newest first.
    fn list(&self) -> &[MediaRecord];

    /// Insert `record` at the front. A record with the same id is replaced.
    fn insert(&mut self, record: MediaRecord) -> SnapResult<()>;

    /// Replace the record with `record.id`. Returns `false` if there was none.
    fn update(&mut self, record: MediaRecord) -> SnapResult<bool>;

    /// Remove and return the record with `id`.
    fn remove(&mut self, id: ContentId) -> SnapResult<Option<MediaRecord>>;

    /// Current profile, if any.
    fn profile(&self) -> Option<&UserProfile>;

    /// Replace (or clear) the profile.
    fn set_profile(&mut self, profile: Option<UserProfile>) -> SnapResult<()>;

    /// Record with `id`.
    fn get(&self, id: ContentId) -> Option<&MediaRecord> {
        self.list().iter().find(|r| r.id == id)
    }

    /// Record for `source`: exact content id first, then a match on the data URL tail.
    fn find_by_source(&self, source: &ImageSource) -> Option<&MediaRecord> {
        if let Some(r) = self.get(source.id()) {
            return Some(r);
        }
        let url = source.to_data_url();
        let tail = url_tail(&url);
        self.list().iter().find(|r| url_tail(&r.file_url) == tail)
    }
}

fn url_tail(url: &str) -> &str {
    let start = url.len().saturating_sub(TAIL_MATCH_CHARS);
    url.get(start..).unwrap_or(url)
}

/// Persisted document: the record list plus the profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Records, newest first.
    #[serde(default)]
    pub records: Vec<MediaRecord>,
    /// Local profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl StoreDocument {
    fn insert(&mut self, record: MediaRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.insert(0, record);
    }

    fn update(&mut self, record: MediaRecord) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: ContentId) -> Option<MediaRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }
}

/// Store kept in memory only.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    doc: StoreDocument,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaStore for InMemoryStore {
    fn list(&self) -> &[MediaRecord] {
        &self.doc.records
    }

    fn insert(&mut self, record: MediaRecord) -> SnapResult<()> {
        self.doc.insert(record);
        Ok(())
    }

    fn update(&mut self, record: MediaRecord) -> SnapResult<bool> {
        Ok(self.doc.update(record))
    }

    fn remove(&mut self, id: ContentId) -> SnapResult<Option<MediaRecord>> {
        Ok(self.doc.remove(id))
    }

    fn profile(&self) -> Option<&UserProfile> {
        self.doc.profile.as_ref()
    }

    fn set_profile(&mut self, profile: Option<UserProfile>) -> SnapResult<()> {
        self.doc.profile = profile;
        Ok(())
    }
}

/// Store backed by one JSON document, read at open and rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl JsonFileStore {
    /// Open `path`; a missing or empty file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> SnapResult<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = match std::fs::read_to_string(&path) {
            Ok(s) if s.trim().is_empty() => StoreDocument::default(),
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read store '{}'", path.display()))
                    .into());
            }
        };
        tracing::debug!(path = %path.display(), records = doc.records.len(), "opened media store");
        Ok(Self { path, doc })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> SnapResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store dir '{}'", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(&self.doc)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write store '{}'", self.path.display()))?;
        Ok(())
    }
}

impl MediaStore for JsonFileStore {
    fn list(&self) -> &[MediaRecord] {
        &self.doc.records
    }

    fn insert(&mut self, record: MediaRecord) -> SnapResult<()> {
        self.doc.insert(record);
        self.persist()
    }

    fn update(&mut self, record: MediaRecord) -> SnapResult<bool> {
        let found = self.doc.update(record);
        if found {
            self.persist()?;
        }
        Ok(found)
    }

    fn remove(&mut self, id: ContentId) -> SnapResult<Option<MediaRecord>> {
        let removed = self.doc.remove(id);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    fn profile(&self) -> Option<&UserProfile> {
        self.doc.profile.as_ref()
    }

    fn set_profile(&mut self, profile: Option<UserProfile>) -> SnapResult<()> {
        self.doc.profile = profile;
        self.persist()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/store.rs"]
mod tests;
