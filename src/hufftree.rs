use std::cmp::Ordering;

use log::{log_enabled, trace, Level};

use crate::codebook::{Code, CodeBook};
use crate::error::{CodecError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        symbol: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(symbol: u8, weight: u64) -> Self {
        HuffNode::Leaf { weight, symbol }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn merge(a: Self, b: Self) -> Self {
        // a is the smaller node
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    fn generate_table(&self, code_book: &mut CodeBook, code: Code) {
        match self {
            HuffNode::Leaf { symbol, .. } => {
                code_book.insert(*symbol, code);
            }
            HuffNode::Internal { left, right, .. } => {
                // Left = 0, Right = 1
                left.generate_table(code_book, code.with_bit(false));
                right.generate_table(code_book, code.with_bit(true));
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

// Heap entry: ties on weight fall back to the order nodes entered the queue,
// so the same frequencies always give the same tree.
#[derive(Debug)]
struct QueuedNode {
    node: HuffNode,
    sequence: usize,
}

impl QueuedNode {
    fn key(&self) -> (u64, usize) {
        (self.node.weight(), self.sequence)
    }
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn from_samples(samples: &[u8]) -> Result<Self> {
        let frequencies = FrequencyTable::build(samples)?;
        HuffmanTree::build(&frequencies)
    }

    /// Greedy merge of the two lightest nodes until one remains.
    ///
    /// Leaves are queued in ascending symbol order; each merged node is queued
    /// after everything before it.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        let leaves: Vec<QueuedNode> = frequencies
            .iter()
            .enumerate()
            .map(|(sequence, (symbol, count))| QueuedNode {
                node: HuffNode::new(symbol, count),
                sequence,
            })
            .collect();

        let mut next_sequence = leaves.len();
        let mut heap = MinHeap::build(leaves);

        loop {
            let x = heap.extract_min().ok_or(CodecError::EmptyInput)?;
            let Some(y) = heap.extract_min() else {
                let tree = HuffmanTree { root: x.node };
                trace!(
                    "built huffman tree: {} leaves, depth {}",
                    tree.leaf_count(),
                    tree.depth()
                );
                return Ok(tree);
            };

            heap.insert(QueuedNode {
                node: HuffNode::merge(x.node, y.node),
                sequence: next_sequence,
            });
            next_sequence += 1;
        }
    }

    /// Codes for every leaf. A lone leaf gets the one-bit code `0`.
    pub fn generate_code_book(&self) -> CodeBook {
        let mut code_book = CodeBook::new();
        match &self.root {
            HuffNode::Leaf { symbol, .. } => {
                code_book.insert(*symbol, Code::new().with_bit(false));
            }
            internal => internal.generate_table(&mut code_book, Code::new()),
        }
        code_book
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn total_weight(&self) -> u64 {
        self.root.weight()
    }

    /// Dump the tree shape at trace level
    pub fn log_structure(&self) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        trace!("Huffman tree structure:");
        Self::log_node(&self.root, 0, "root");
    }

    fn log_node(node: &HuffNode, depth: usize, label: &str) {
        let indent = "  ".repeat(depth);
        match node {
            HuffNode::Leaf { symbol, weight } => {
                trace!("{}{}-> Leaf: {} [weight: {}]", indent, label, symbol, weight);
            }
            HuffNode::Internal { weight, left, right } => {
                trace!("{}{}-> Internal [weight: {}]", indent, label, weight);
                Self::log_node(left, depth + 1, "L");
                Self::log_node(right, depth + 1, "R");
            }
        }
    }
}
