//! Photo records, loading, and decoding.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// JSON photo manifests.
pub mod manifest;
/// Source photo records and loaders.
pub mod photos;
