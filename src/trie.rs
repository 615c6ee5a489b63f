use std::fmt;

use simple_log::debug;
use thiserror::Error;

const ALPHABET_SIZE: usize = 26;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrieError {
    #[error("invalid character {ch:?} at position {position}, only 'a'..='z' can be stored")]
    InvalidCharacter { ch: char, position: usize },
}

fn letter_index(ch: char) -> Option<usize> {
    if ch.is_ascii_lowercase() {
        Some((ch as u8 - b'a') as usize)
    } else {
        None
    }
}

fn letter_indices(word: &str) -> Result<Vec<usize>, TrieError> {
    word.chars()
        .enumerate()
        .map(|(position, ch)| letter_index(ch).ok_or(TrieError::InvalidCharacter { ch, position }))
        .collect()
}

#[derive(Default)]
pub struct TrieNode {
    children: [Option<Box<TrieNode>>; ALPHABET_SIZE],
    // populated slots in `children`
    child_count: usize,
    is_word: bool,
}

impl TrieNode {
    fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    fn without_children(&self) -> Self {
        TrieNode {
            children: Default::default(),
            child_count: self.child_count,
            is_word: self.is_word,
        }
    }
}

// Clone, PartialEq and Debug walk with an explicit stack, like Drop below.
impl Clone for TrieNode {
    fn clone(&self) -> Self {
        let mut copy = self.without_children();
        let mut pending: Vec<(&TrieNode, &mut TrieNode)> = vec![(self, &mut copy)];
        while let Some((source, target)) = pending.pop() {
            for (from, to) in source.children.iter().zip(target.children.iter_mut()) {
                if let Some(from) = from.as_deref() {
                    let child = to.insert(Box::new(from.without_children()));
                    pending.push((from, &mut **child));
                }
            }
        }
        copy
    }
}

impl PartialEq for TrieNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.is_word != right.is_word || left.child_count != right.child_count {
                return false;
            }
            for (l, r) in left.children.iter().zip(right.children.iter()) {
                match (l.as_deref(), r.as_deref()) {
                    (Some(l), Some(r)) => pending.push((l, r)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for TrieNode {}

impl fmt::Debug for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = self
            .children
            .iter()
            .zip('a'..='z')
            .filter(|(child, _)| child.is_some())
            .map(|(_, letter)| letter)
            .collect();
        f.debug_struct("TrieNode")
            .field("is_word", &self.is_word)
            .field("children", &letters)
            .finish()
    }
}

impl Drop for TrieNode {
    // Unlinks descendants onto a stack so long words don't recurse through drop.
    fn drop(&mut self) {
        let mut pending: Vec<Box<TrieNode>> =
            self.children.iter_mut().filter_map(Option::take).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.iter_mut().filter_map(Option::take));
        }
    }
}

/// What `delete` must do, decided by a read-only walk before anything is touched.
#[derive(Debug, PartialEq, Eq)]
enum Removal {
    Absent,
    ClearFlag,
    /// Drop `children[index]` of the node `depth` letters below the root.
    Detach { depth: usize, index: usize },
}

/// A set of lowercase words stored as a 26-way prefix tree.
///
/// Every operation accepts `&str` or `None`; `None` stands for absent input
/// and is always a no-op (or `false` for [`Trie::search`]).
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Trie {
    root: Option<Box<TrieNode>>,
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trie")
            .field("nodes", &self.node_count())
            .field("root", &self.root)
            .finish()
    }
}

impl Trie {
    pub fn new() -> Self {
        Trie { root: None }
    }

    /// Stores `word`. The word is validated up front, so a rejected word
    /// leaves the trie exactly as it was.
    pub fn insert<'a>(&mut self, word: impl Into<Option<&'a str>>) -> Result<(), TrieError> {
        let Some(word) = word.into() else {
            return Ok(());
        };
        let indices = letter_indices(word)?;

        let mut node = self.root.get_or_insert_with(Box::default);
        for index in indices {
            if node.children[index].is_none() {
                node.child_count += 1;
            }
            node = node.children[index].get_or_insert_with(Box::default);
        }
        node.is_word = true;
        Ok(())
    }

    pub fn search<'a>(&self, word: impl Into<Option<&'a str>>) -> bool {
        let Some(word) = word.into() else {
            return false;
        };
        let Some(mut node) = self.root.as_deref() else {
            return false;
        };
        for ch in word.chars() {
            let Some(index) = letter_index(ch) else {
                return false;
            };
            match node.children[index].as_deref() {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.is_word
    }

    /// Removes `word` and prunes every node that only existed for it.
    ///
    /// Words that are not stored, including prefixes of stored words, leave
    /// the trie untouched.
    pub fn delete<'a>(&mut self, word: impl Into<Option<&'a str>>) {
        let Some(word) = word.into() else {
            return;
        };
        let Ok(indices) = letter_indices(word) else {
            debug!("delete {:?}: not a storable word", word);
            return;
        };

        match self.plan_removal(&indices) {
            Removal::Absent => {
                debug!("delete {:?}: not stored", word);
            }
            Removal::ClearFlag => {
                if let Some(node) = self.node_at_mut(&indices) {
                    node.is_word = false;
                }
            }
            Removal::Detach { depth, index } => {
                if let Some(node) = self.node_at_mut(&indices[..depth]) {
                    if node.children[index].take().is_some() {
                        node.child_count -= 1;
                    }
                    debug!("delete {:?}: pruned below depth {}", word, depth);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    pub fn is_empty(&self) -> bool {
        self.root
            .as_deref()
            .map_or(true, |root| !root.is_word && root.is_leaf())
    }

    /// Allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&TrieNode> = self.root.as_deref().into_iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter().filter_map(|child| child.as_deref()));
        }
        count
    }

    fn plan_removal(&self, indices: &[usize]) -> Removal {
        let Some(mut node) = self.root.as_deref() else {
            return Removal::Absent;
        };

        // deepest node on the path that has to survive, and the branch to cut
        // below it; `None` only for the empty word
        let mut cut = indices.first().map(|&index| (0, index));
        for (depth, &index) in indices.iter().enumerate() {
            let Some(child) = node.children[index].as_deref() else {
                return Removal::Absent;
            };
            // `index` is populated, so any second child is a sibling branch
            if node.child_count > 1 || node.is_word {
                cut = Some((depth, index));
            }
            node = child;
        }

        if !node.is_word {
            return Removal::Absent;
        }
        match cut {
            Some((depth, index)) if node.is_leaf() => Removal::Detach { depth, index },
            _ => Removal::ClearFlag,
        }
    }

    fn node_at_mut(&mut self, indices: &[usize]) -> Option<&mut TrieNode> {
        let mut node = self.root.as_deref_mut()?;
        for &index in indices {
            node = node.children[index].as_deref_mut()?;
        }
        Some(node)
    }
}
