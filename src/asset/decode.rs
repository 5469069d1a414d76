//! Decoding response bytes into assets.

use super::types::Asset;
use crate::transport::FetchError;
use bytes::Bytes;

/// Turns fetched body bytes into a decoded [`Asset`].
///
/// Decode failure is reported as [`FetchError::Decode`], never a panic.
pub trait AssetDecoder: Send + Sync {
    /// Decodes body bytes into an asset.
    fn decode(&self, data: Bytes) -> Result<Asset, FetchError>;
}

/// Identity decoder: the asset payload is the raw response body.
///
/// This is the default decoder; it never fails on non-empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl AssetDecoder for RawDecoder {
    fn decode(&self, data: Bytes) -> Result<Asset, FetchError> {
        Ok(Asset::from_bytes(data))
    }
}

/// Decoder for encoded images (PNG, JPEG, ...).
///
/// Produces RGBA8 pixel data with dimensions. Format detection is based on
/// the byte content, not the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl AssetDecoder for ImageDecoder {
    fn decode(&self, data: Bytes) -> Result<Asset, FetchError> {
        let decoded =
            image::load_from_memory(&data).map_err(|e| FetchError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Asset::with_dimensions(rgba.into_raw(), width, height))
    }
}
