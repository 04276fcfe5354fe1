//! Bidirectional text engine for the shell's display surfaces.
//!
//! Everything the shell prints: prompts, echoed input, pipeline output,
//! diagnostics: flows through this crate before it reaches the terminal.
//! The pipeline is: logical text -> embedding levels ([`bidi`]) -> contextual
//! Arabic forms ([`shape`]) -> visual reordering -> host terminal. Storage and
//! parsing always stay in logical order; only [`display`] produces visual
//! strings.

pub mod bidi;
pub mod class;
pub mod conformance;
pub mod display;
pub mod shape;

pub use bidi::{reorder_visual, BaseLevel, BidiEngine, Paragraph, Run, MAX_DEPTH};
pub use class::{bidi_class, bracket_info, joining_class, BidiClass, BracketKind, JoiningClass};
pub use display::DisplayFormatter;
pub use shape::shape;
