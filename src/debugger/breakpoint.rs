use crate::{isa::Word, FxMap};

/// Original words of every patched instruction, keyed by address.
///
/// An address is present if and only if memory at that address holds the
/// breakpoint sentinel. Kept in insertion order, for listing.
#[derive(Debug, Default)]
pub struct Breakpoints(FxMap<usize, Word>);

impl Breakpoints {
    /// Original word at `address`, if a breakpoint is set there.
    pub fn get(&self, address: usize) -> Option<Word> {
        self.0.get(&address).copied()
    }

    pub fn contains(&self, address: usize) -> bool {
        self.0.contains_key(&address)
    }

    /// Set or update the original word at `address`, returning the previous one.
    pub(super) fn insert(&mut self, address: usize, original: Word) -> Option<Word> {
        self.0.insert(address, original)
    }

    /// Returns the original word, if a breakpoint was set at `address`.
    pub(super) fn remove(&mut self, address: usize) -> Option<Word> {
        self.0.shift_remove(&address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Word)> + '_ {
        self.0.iter().map(|(address, word)| (*address, *word))
    }
}
