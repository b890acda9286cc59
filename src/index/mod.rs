//! Read-only indices over one topic map.
//!
//! An index borrows the system and answers lookups straight from the
//! store, so it is always current and costs nothing to build. Callers
//! create one where they need it and drop it when done; the borrow keeps
//! the map from being mutated while an index is alive.
//!
//! | Index | Answers |
//! |---|---|
//! | [`TypeInstanceIndex`] | topics by type, statements by type |
//! | [`ScopedIndex`] | statements by theme |
//! | [`LiteralIndex`] | names by value, occurrences and variants by literal |

mod literal;
mod scoped;
mod type_instance;

pub use literal::LiteralIndex;
pub use scoped::ScopedIndex;
pub use type_instance::TypeInstanceIndex;
