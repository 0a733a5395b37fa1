//! Long-text cell support.
//!
//! Long-text cells store markdown together with a short plain-text preview
//! and the image and link fragments found in it. [`extract_preview`] derives
//! those fields from the markdown alone.

mod preview;

pub use preview::{extract_preview, LongText, PreviewContent, PREVIEW_LENGTH};
