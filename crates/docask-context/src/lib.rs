//! docask-context
//!
//! Turns a ranked chunk sequence into a budget-bounded prompt fragment with
//! a parallel source list, and renders the final user message. See the
//! `assembler`, `prompt`, and `template` modules.

pub mod assembler;
pub mod prompt;
pub mod template;

pub use assembler::{assemble, AssembledContext, SourceRef, NO_CONTEXT_MARKER};
pub use prompt::build_user_message;
pub use template::FileTemplateCache;
