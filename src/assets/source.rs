use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::assets::decode::{Bitmap, decode_image};
use crate::foundation::error::{SnapError, SnapResult};

/// Stable content identifier assigned at ingestion (xxh3 of the encoded bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId(pub u64);

impl ContentId {
    /// Hash encoded image bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(bytes))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s.trim(), 16)
            .map(Self)
            .map_err(|_| SnapError::validation(format!("invalid content id \"{s}\"")))
    }
}

impl serde::Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable reference to an original encoded image.
///
/// Cheap to clone; the bytes are shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSource {
    id: ContentId,
    mime: String,
    encoded: Arc<[u8]>,
}

impl ImageSource {
    /// Wrap encoded bytes. The MIME type is sniffed from the bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let encoded: Arc<[u8]> = bytes.into();
        let mime = image::guess_format(&encoded)
            .map(|f| f.to_mime_type().to_owned())
            .unwrap_or_else(|_| "application/octet-stream".to_owned());
        Self {
            id: ContentId::of_bytes(&encoded),
            mime,
            encoded,
        }
    }

    /// Read a file into a source.
    pub fn from_path(path: impl AsRef<Path>) -> SnapResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> SnapResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| SnapError::validation("data url must start with \"data:\""))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| SnapError::validation("data url is missing ','"))?;
        let Some(mime) = header.strip_suffix(";base64") else {
            return Err(SnapError::validation("only base64 data urls are supported"));
        };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| SnapError::decode(format!("invalid base64 payload: {e}")))?;
        let mut out = Self::from_bytes(bytes);
        if !mime.is_empty() {
            out.mime = mime.to_owned();
        }
        Ok(out)
    }

    /// Encode as a base64 data URL (the persisted representation).
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.encoded))
    }

    /// Content identifier.
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Sniffed or declared MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Original encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Decode a fresh bitmap from the original bytes.
    pub fn decode(&self) -> SnapResult<Bitmap> {
        decode_image(&self.encoded)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
