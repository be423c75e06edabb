//! Diagnostic system for the Rube front end.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Source line (where it went wrong)
//! - Notes (why it's wrong)
//!
//! Lexical errors abort a parse; scope and semantic errors are queued and
//! parsing continues; warnings never block.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;

pub use diagnostic::{duplicated_argument, shadowing_outer_local, syntax_error, Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
