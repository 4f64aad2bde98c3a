// src/encode/huffman/tree.rs

//! Symbol statistics and Huffman tree construction.

use super::bits::Code;
use super::table::CodeTable;
use crate::utils::error::{CodecError, Result};
use crate::utils::threads::WorkerPool;
use log::debug;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Number of distinct byte symbols.
pub const SYMBOL_COUNT: usize = 256;

/// Byte histogram over a whole stream.
pub type Frequencies = [u64; SYMBOL_COUNT];

/// Counts every byte value in `bytes`.
///
/// Each worker fills a local histogram for its contiguous chunk; the
/// histograms are summed once at the end.
pub fn count_frequencies(bytes: &[u8], pool: &WorkerPool) -> Frequencies {
    let chunk_len = pool.chunk_len_for(bytes.len());
    pool.fold_chunks(
        bytes,
        chunk_len,
        || [0u64; SYMBOL_COUNT],
        |mut hist, chunk| {
            for &b in chunk {
                hist[b as usize] += 1;
            }
            hist
        },
        |mut a, b| {
            for (dst, src) in a.iter_mut().zip(b.iter()) {
                *dst += src;
            }
            a
        },
    )
}

/// A node of the code tree. Internal nodes own exactly two children.
#[derive(Debug)]
pub enum HuffmanNode {
    Leaf {
        symbol: u8,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        /// Reached by a 1 bit.
        one: Box<HuffmanNode>,
        /// Reached by a 0 bit.
        zero: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub fn frequency(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { frequency, .. } => *frequency,
            HuffmanNode::Internal { frequency, .. } => *frequency,
        }
    }
}

/// A Huffman tree over the symbols with non-zero frequency.
#[derive(Debug)]
pub struct HuffmanTree {
    root: HuffmanNode,
    symbols: usize,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// Nodes are keyed by `(frequency, creation order)`: leaves are created
    /// in symbol order, merged nodes after them, so ties always resolve the
    /// same way. The lighter of the two popped nodes becomes the 0 child.
    ///
    /// Returns `None` when every frequency is zero.
    pub fn build(frequencies: &Frequencies) -> Option<Self> {
        let mut nodes: Vec<Option<HuffmanNode>> = Vec::with_capacity(2 * SYMBOL_COUNT);
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();

        for (symbol, &frequency) in frequencies.iter().enumerate() {
            if frequency > 0 {
                heap.push(Reverse((frequency, nodes.len())));
                nodes.push(Some(HuffmanNode::Leaf {
                    symbol: symbol as u8,
                    frequency,
                }));
            }
        }
        let symbols = nodes.len();

        while heap.len() > 1 {
            let (Some(Reverse((f1, i1))), Some(Reverse((f2, i2)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let (Some(lighter), Some(heavier)) = (nodes[i1].take(), nodes[i2].take()) else {
                break;
            };

            heap.push(Reverse((f1 + f2, nodes.len())));
            nodes.push(Some(HuffmanNode::Internal {
                frequency: f1 + f2,
                one: Box::new(heavier),
                zero: Box::new(lighter),
            }));
        }

        let Reverse((_, root)) = heap.pop()?;
        let root = nodes[root].take()?;

        debug!(
            "Built Huffman tree over {} symbols, total weight {}",
            symbols,
            root.frequency()
        );
        Some(HuffmanTree { root, symbols })
    }

    /// Number of leaves.
    pub fn symbol_count(&self) -> usize {
        self.symbols
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }

    /// Derives every leaf's code with one iterative depth-first walk.
    ///
    /// A tree that is a single leaf yields the 1-bit code `1`.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::default();

        if let HuffmanNode::Leaf { symbol, .. } = &self.root {
            table.insert(*symbol, Code::new(1, 1)?);
            return Ok(table);
        }

        let mut stack: Vec<(&HuffmanNode, Code)> = vec![(&self.root, Code::EMPTY)];
        while let Some((node, code)) = stack.pop() {
            match node {
                HuffmanNode::Leaf { symbol, .. } => {
                    table.insert(*symbol, code);
                }
                HuffmanNode::Internal { one, zero, .. } => {
                    if code.len() >= Code::MAX_LEN {
                        return Err(CodecError::malformed(format!(
                            "tree deeper than {} levels",
                            Code::MAX_LEN
                        )));
                    }
                    stack.push((&**zero, code.push(false)));
                    stack.push((&**one, code.push(true)));
                }
            }
        }

        Ok(table)
    }
}
