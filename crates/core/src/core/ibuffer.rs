//! Instruction buffer: the pre-populated instruction-word oracle.
//!
//! A random-access map from program counter to 32-bit instruction word,
//! filled before simulation starts. A missing address simply yields no
//! instruction — the fetch stage retries the same PC until a word appears
//! or the run ends.

use std::collections::HashMap;

/// Address-indexed instruction memory.
#[derive(Debug, Default)]
pub struct InstructionBuffer {
    words: HashMap<u32, u32>,
}

impl InstructionBuffer {
    /// Creates an empty instruction buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a word at the given PC, replacing any previous word.
    pub fn load(&mut self, pc: u32, word: u32) {
        let _ = self.words.insert(pc, word);
    }

    /// Looks up the word at the given PC.
    pub fn fetch(&self, pc: u32) -> Option<u32> {
        self.words.get(&pc).copied()
    }

    /// Number of loaded words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Removes all loaded words.
    pub fn clear(&mut self) {
        self.words.clear();
    }
}
