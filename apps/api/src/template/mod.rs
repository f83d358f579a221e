// Placeholder engine: token scanning and padded substitution.
// Pure functions over in-memory strings. No I/O, no shared state.

pub mod scanner;
pub mod substitution;

pub use scanner::extract_variables;
pub use substitution::{substitute, ValueMap};
