//! Resource identity, decoded assets, and decoders.

mod decode;
mod types;

pub use decode::{AssetDecoder, ImageDecoder, RawDecoder};
pub use types::{Asset, ResourceId};
