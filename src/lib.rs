// Assembling
pub mod isa;
mod assembler;
pub use assembler::{assemble, to_text, Assembler, DIVIDER};
pub mod program;

// Running
mod runtime;
pub use runtime::Vm;
mod state;
pub use state::State;
pub mod debugger;
pub use debugger::{Debugger, DebuggerOptions};

mod error;
pub use error::{AsmError, AsmErrorKind, Fault, VmError};

pub mod output;

/// Insertion-ordered map with a fast hasher, used for labels and breakpoints.
pub type FxMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

/// Amount of lines to show as context around a diagnostic.
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;
