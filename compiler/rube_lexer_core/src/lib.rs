//! Line-oriented input for the Rube scanner.
//!
//! Standalone: no `rube_*` dependencies, so tools that only need to walk
//! source lines (highlighters, line counters) can use it directly.
//!
//! - [`LineSource`]: the collaborator that produces physical lines
//! - [`LineCursor`]: byte cursor over the current line, with heredoc
//!   save/restore

mod line_cursor;
mod line_source;

pub use line_cursor::{LineCursor, SavedLine};
pub use line_source::{LineSource, ReaderLines, StrLines};
