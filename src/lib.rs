pub mod script;
pub mod trie;

pub use script::{Command, Outcome, ScriptError};
pub use trie::{Trie, TrieError};
