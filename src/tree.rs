use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;

/// One node of a Huffman tree. Children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Joins two nodes; `left` is the one popped first.
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// Structural equality: same leaf/internal layout and same symbols,
    /// ignoring weights.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf { symbol: a, .. }, Node::Leaf { symbol: b, .. }) => a == b,
            (
                Node::Internal {
                    left: l1,
                    right: r1,
                    ..
                },
                Node::Internal {
                    left: l2,
                    right: r2,
                    ..
                },
            ) => l1.same_shape(l2) && r1.same_shape(r2),
            _ => false,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

// Heap entry. `seq` is the push order, so equal weights pop first-in first-out.
struct Queued {
    weight: u64,
    seq: u64,
    node: Node,
}

impl Eq for Queued {}
impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys so BinaryHeap behaves as a min-heap.
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: Node,
}

impl HuffmanTree {
    /// Builds the tree for `freqs`.
    ///
    /// Leaves enter the queue in ascending symbol order and every push takes
    /// the next sequence number, so the same table always yields the same
    /// tree. A table with one symbol yields a lone leaf.
    pub fn build(freqs: &FrequencyTable) -> Result<Self> {
        if freqs.is_empty() {
            return Err(HuffError::EmptyInput);
        }

        let mut heap = BinaryHeap::with_capacity(freqs.len());
        let mut seq = 0u64;
        for (symbol, weight) in freqs.iter() {
            heap.push(Queued {
                weight,
                seq,
                node: Node::leaf(symbol, weight),
            });
            seq += 1;
        }

        while heap.len() > 1 {
            let (Some(first), Some(second)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let node = Node::merge(first.node, second.node);
            heap.push(Queued {
                weight: node.weight(),
                seq,
                node,
            });
            seq += 1;
        }

        let root = heap.pop().ok_or(HuffError::EmptyInput)?.node;
        let tree = HuffmanTree { root };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            weight = tree.root.weight(),
            "built huffman tree"
        );
        Ok(tree)
    }

    pub fn from_root(root: Node) -> Self {
        HuffmanTree { root }
    }

    pub fn same_shape(&self, other: &HuffmanTree) -> bool {
        self.root.same_shape(&other.root)
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_symbol(node: &Node) -> Option<u8> {
        match node {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    fn children(node: &Node) -> (&Node, &Node) {
        match node {
            Node::Internal { left, right, .. } => (left, right),
            Node::Leaf { .. } => panic!("expected internal node"),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = HuffmanTree::build(&FrequencyTable::from_bytes(&[])).unwrap_err();
        assert!(matches!(err, HuffError::EmptyInput));
    }

    #[test]
    fn single_symbol_is_a_lone_leaf() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0x41; 100])).unwrap();
        assert_eq!(tree.root, Node::leaf(0x41, 100));
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn lowest_weights_merge_first() {
        let freqs: FrequencyTable = [(b'A', 5), (b'B', 9), (b'C', 12), (b'D', 13), (b'E', 16), (b'F', 45)]
            .into_iter()
            .collect();
        let tree = HuffmanTree::build(&freqs).unwrap();
        assert_eq!(tree.root.weight(), 100);

        let (f, rest) = children(&tree.root);
        assert_eq!(leaf_symbol(f), Some(b'F'));
        assert_eq!(rest.weight(), 55);

        let (cd, abe) = children(rest);
        assert_eq!(cd.weight(), 25);
        assert_eq!(abe.weight(), 30);
        let (c, d) = children(cd);
        assert_eq!((leaf_symbol(c), leaf_symbol(d)), (Some(b'C'), Some(b'D')));
        let (ab, e) = children(abe);
        assert_eq!(leaf_symbol(e), Some(b'E'));
        let (a, b) = children(ab);
        assert_eq!((leaf_symbol(a), leaf_symbol(b)), (Some(b'A'), Some(b'B')));
    }

    #[test]
    fn equal_leaf_weights_pop_in_symbol_order() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"cab")).unwrap();
        // a and b carry the two lowest sequence numbers and merge first; c is
        // lighter than the merged node and pops ahead of it.
        let (first, second) = children(&tree.root);
        assert_eq!(leaf_symbol(first), Some(b'c'));
        let (a, b) = children(second);
        assert_eq!((leaf_symbol(a), leaf_symbol(b)), (Some(b'a'), Some(b'b')));
    }

    #[test]
    fn leaf_pops_before_later_merged_node_of_equal_weight() {
        // a:1 (seq 0), b:1 (seq 1), c:2 (seq 2); a+b merges into weight 2 with
        // seq 3, so c leaves the queue first and becomes the left child.
        let freqs: FrequencyTable = [(b'a', 1), (b'b', 1), (b'c', 2)].into_iter().collect();
        let tree = HuffmanTree::build(&freqs).unwrap();
        let expected = Node::merge(
            Node::leaf(b'c', 2),
            Node::merge(Node::leaf(b'a', 1), Node::leaf(b'b', 1)),
        );
        assert_eq!(tree.root, expected);
    }

    #[test]
    fn builds_are_deterministic() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7 * 3 + i % 13) as u8).collect();
        let freqs = FrequencyTable::from_bytes(&data);
        let first = HuffmanTree::build(&freqs).unwrap();
        for _ in 0..5 {
            let again = HuffmanTree::build(&freqs).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn full_alphabet_stays_shallow() {
        let data: Vec<u8> = (0..=255u8).collect();
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&data)).unwrap();
        assert_eq!(tree.leaf_count(), 256);
        assert_eq!(tree.depth(), 8);
    }

    #[test]
    fn same_shape_ignores_weights() {
        let a = Node::merge(Node::leaf(1, 3), Node::leaf(2, 4));
        let b = Node::merge(Node::leaf(1, 0), Node::leaf(2, 0));
        let c = Node::merge(Node::leaf(2, 0), Node::leaf(1, 0));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(!a.same_shape(&Node::leaf(1, 3)));
    }
}
