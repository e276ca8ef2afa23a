// Change-suppression filter for the referee command stream

mod filter;
mod format;

pub use filter::{RefereeFilter, RefereeLine, RefereeSnapshot};
pub use format::{render_raw_line, render_referee_line, FormatError};
