//! Prompt crate for the HackRx QA service.
//!
//! Holds the fixed instructional template used for answer synthesis and the
//! canonical "information not available" phrase callers may pattern-match.

pub mod template;

pub use template::{QaPrompt, NOT_AVAILABLE_PHRASE};
