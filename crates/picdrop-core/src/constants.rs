//! Application-wide constants.

/// Maximum accepted file size for a single upload (5 MiB).
/// Files larger than this are rejected before any network call.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME type prefix a file must carry to be accepted as an image.
pub const IMAGE_MIME_PREFIX: &str = "image/";
