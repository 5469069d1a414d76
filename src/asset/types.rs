//! Resource identifiers and decoded assets.

use bytes::Bytes;
use std::fmt;

/// Cache key uniquely identifying a fetchable resource.
///
/// Derived from the URL string; two identical URL strings always map to the
/// same identifier. Surrounding whitespace is not significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Derives an identifier from a URL string.
    pub fn new(url: &str) -> Self {
        Self(url.trim().to_string())
    }

    /// Returns the normalized URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded result of a successful fetch.
///
/// Immutable once produced; shared as `Arc<Asset>` between the cache and any
/// display callbacks currently using it. Payload bytes are either decoded
/// RGBA8 pixels (with dimensions) or the raw response body, depending on the
/// decoder in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    data: Bytes,
    dimensions: Option<(u32, u32)>,
}

impl Asset {
    /// Creates an asset from raw payload bytes with no pixel dimensions.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            dimensions: None,
        }
    }

    /// Creates an asset from decoded pixel data.
    pub fn with_dimensions(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            dimensions: Some((width, height)),
        }
    }

    /// Returns the payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns pixel dimensions as `(width, height)`, when known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
}
