//! Input mapping: raw key events resolve to flag changes or one-shot actions.
//!
//! # Invariants
//! - The viewer consumes `InputCommand`s, never raw key codes.
//! - Held flags change on both press and release; actions fire on release only.

pub mod action;
pub mod bindings;
pub mod flags;
pub mod key;

pub use action::Action;
pub use bindings::{Binding, InputCommand, KeyBindings};
pub use flags::{InputFlag, InputFlags};
pub use key::{Key, KeyEvent, Modifiers};
