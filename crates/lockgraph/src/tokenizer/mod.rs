//! Line-oriented tokenizers shared by the text lockfile parsers.
//!
//! [`LineSplitter`] feeds the yarn v1 reader directly; [`IndentedPairs`] builds on
//! it to give the pnpm and Berry readers `key: value` pairs with their nesting path.

mod lines;
mod pairs;

pub use lines::LineSplitter;
pub use pairs::{IndentedPairs, Pair};

pub(crate) use pairs::unquote;
