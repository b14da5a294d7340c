//! Text rendering helpers shared by the transcript and input widgets.
//!
//! - [`render_markdown`] turns an assistant reply into styled Lines
//! - [`wrap_text`] / [`wrap_indented`] fit plain and styled text to a width
//! - [`visual_width`] / [`truncate_to_width`] measure terminal cells

mod markdown;
mod styles;
mod width;
mod wrap;

pub use markdown::render_markdown;
pub use width::{truncate_to_width, visual_width};
pub use wrap::{wrap_indented, wrap_text};
