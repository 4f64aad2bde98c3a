// src/encode/huffman/table.rs

//! Symbol ⇄ code lookup tables.

use super::bits::Code;
use super::tree::SYMBOL_COUNT;
use crate::utils::error::{CodecError, Result};
use std::collections::HashMap;

/// Symbol → code, indexed by byte value. Unused symbols have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; SYMBOL_COUNT],
}

impl Default for CodeTable {
    fn default() -> Self {
        Self {
            codes: [None; SYMBOL_COUNT],
        }
    }
}

impl CodeTable {
    #[inline]
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    pub(crate) fn insert(&mut self, symbol: u8, code: Code) {
        self.codes[symbol as usize] = Some(code);
    }

    /// Present entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(|c| c.is_none())
    }

    pub fn max_code_len(&self) -> u8 {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Total encoded size of a stream with the given histogram, in bits.
    pub fn encoded_bits(&self, frequencies: &[u64; SYMBOL_COUNT]) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies[symbol as usize] * code.len() as u64)
            .sum()
    }
}

/// Code → symbol, the inverse of a [`CodeTable`].
///
/// Construction rejects any table a Huffman tree could not have produced:
/// a symbol listed twice, a code listed twice, or one code being a prefix of
/// another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeTable {
    map: HashMap<Code, u8>,
    max_len: u8,
}

impl DecodeTable {
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        Self::from_entries(table.iter())
    }

    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, Code)>,
    {
        let mut map = HashMap::new();
        let mut seen = [false; SYMBOL_COUNT];

        for (symbol, code) in entries {
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(CodecError::malformed(format!(
                    "symbol {} has more than one code",
                    symbol
                )));
            }
            if let Some(other) = map.insert(code, symbol) {
                return Err(CodecError::malformed(format!(
                    "code {} assigned to both {} and {}",
                    code, other, symbol
                )));
            }
        }

        let codes: Vec<Code> = map.keys().copied().collect();
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                if a.is_prefix_of(b) || b.is_prefix_of(a) {
                    return Err(CodecError::malformed(format!(
                        "code {} is a prefix of {}",
                        a.min(b),
                        a.max(b)
                    )));
                }
            }
        }

        let max_len = codes.iter().map(|c| c.len()).max().unwrap_or(0);
        Ok(DecodeTable { map, max_len })
    }

    #[inline]
    pub fn get(&self, code: &Code) -> Option<u8> {
        self.map.get(code).copied()
    }

    /// All `(symbol, code)` pairs sorted by symbol.
    pub fn entries(&self) -> Vec<(u8, Code)> {
        let mut entries: Vec<(u8, Code)> = self.map.iter().map(|(&c, &s)| (s, c)).collect();
        entries.sort_unstable_by_key(|&(s, _)| s);
        entries
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Length of the longest code; 0 for an empty table.
    pub fn max_code_len(&self) -> u8 {
        self.max_len
    }
}
