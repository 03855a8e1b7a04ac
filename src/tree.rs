use bitvec::prelude::*;
use derivative::Derivative;
use log::trace;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{Error, Result};
use crate::symbol_table::SymbolTable;

/// Root-to-leaf path, left = 0 and right = 1, first step in the first bit.
pub type Code = BitVec<u8, Msb0>;

pub type CodeTable = HashMap<u8, Code>;

/// Min-queue of nodes ordered by `(weight, rank)`.
pub type NodeQueue = BinaryHeap<Reverse<Node>>;

/// A Huffman tree node.
///
/// Ordering only looks at `(weight, rank)`. Leaves rank by their symbol and
/// merged nodes rank after every leaf in creation order, so equal weights
/// always pop leaves first, lower symbols first, older merges first.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
pub struct Node {
    weight: u64,

    rank: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    symbol: Option<u8>,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    left: Option<Box<Node>>,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    right: Option<Box<Node>>,
}

impl Node {
    pub(crate) fn leaf(symbol: u8, weight: u64) -> Self {
        Self {
            weight,
            rank: usize::from(symbol),
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    fn from_children(left: Node, right: Node, rank: usize) -> Self {
        Self {
            weight: left.weight + right.weight,
            rank,
            symbol: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// An unweighted node with no symbol and no children, the starting
    /// point for rebuilding a tree from stored codes.
    pub(crate) fn empty() -> Self {
        Self {
            weight: 0,
            rank: 0,
            symbol: None,
            left: None,
            right: None,
        }
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn symbol(&self) -> Option<u8> {
        self.symbol
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The child a single code bit leads to.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        if bit {
            self.right.as_deref()
        } else {
            self.left.as_deref()
        }
    }

    /// Walks (creating as needed) the path spelled by `code` and stores
    /// `symbol` at its end.
    pub(crate) fn insert_path(&mut self, symbol: u8, code: &BitSlice<u8, Msb0>) -> Result<()> {
        let mut cursor = self;
        for bit in code.iter().by_vals() {
            if let Some(other) = cursor.symbol {
                return Err(Error::CorruptTree(format!(
                    "code for symbol {symbol:#04x} runs through the leaf of {other:#04x}"
                )));
            }
            let child = if bit {
                &mut cursor.right
            } else {
                &mut cursor.left
            };
            cursor = &mut **child.get_or_insert_with(|| Box::new(Node::empty()));
        }

        if let Some(other) = cursor.symbol {
            return Err(Error::CorruptTree(format!(
                "symbols {other:#04x} and {symbol:#04x} share the code {}",
                bit_string(code)
            )));
        }
        if !cursor.is_leaf() {
            return Err(Error::CorruptTree(format!(
                "code {} of symbol {symbol:#04x} is a prefix of another code",
                bit_string(code)
            )));
        }

        cursor.symbol = Some(symbol);
        Ok(())
    }

    /// Assigns every leaf the path leading to it from this node.
    ///
    /// A lone leaf gets the empty code.
    pub fn assign_codes(&self) -> CodeTable {
        fn traverse(node: &Node, path: &mut Code, codes: &mut CodeTable) {
            // symbol nodes have no children
            if let Some(sym) = node.symbol {
                codes.insert(sym, path.clone());
                return;
            }

            if let Some(left) = &node.left {
                path.push(false);
                traverse(left, path, codes);
                path.pop();
            }

            if let Some(right) = &node.right {
                path.push(true);
                traverse(right, path, codes);
                path.pop();
            }
        }

        let mut path = Code::new();
        let mut codes = HashMap::new();
        traverse(self, &mut path, &mut codes);

        codes
    }
}

fn bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|b| if b { '1' } else { '0' })
        .collect()
}

/// A fresh queue holding one leaf per symbol present in `table`.
pub fn leaf_queue(table: &SymbolTable) -> NodeQueue {
    table.leaves().map(Reverse).collect()
}

/// Greedily merges the two lightest nodes until one remains.
///
/// Returns `None` when the table holds no symbols. A single symbol comes
/// back as a bare leaf without any merges.
pub fn build_tree(table: &SymbolTable) -> Option<Node> {
    let mut queue = leaf_queue(table);
    let first_merge_rank = table.domain().size();

    let mut merges = 0;
    loop {
        let Reverse(left) = queue.pop()?;
        let Some(Reverse(right)) = queue.pop() else {
            trace!("built tree after {merges} merges, weight {}", left.weight);
            return Some(left);
        };
        queue.push(Reverse(Node::from_children(
            left,
            right,
            first_merge_rank + merges,
        )));
        merges += 1;
    }
}

/// Leaves of `table` drained from their own queue, lightest first.
pub fn emission_order(table: &SymbolTable) -> impl Iterator<Item = Node> {
    let mut queue = leaf_queue(table);
    std::iter::from_fn(move || queue.pop().map(|Reverse(node)| node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbolDomain;
    use proptest::prelude::*;

    fn table_of(input: &[u8]) -> SymbolTable {
        let mut t = SymbolTable::new(SymbolDomain::Ascii);
        t.count_from(input).unwrap();
        t
    }

    fn code(bits: &str) -> Code {
        bits.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn node_leaf() {
        let n = Node::leaf(b'q', 7);
        assert_eq!(n.weight(), 7);
        assert_eq!(n.symbol(), Some(b'q'));
        assert!(n.is_leaf());
        assert!(n.child(false).is_none());
        assert!(n.child(true).is_none());
    }

    #[test]
    fn node_from_children() {
        let left = Node::leaf(b'a', 5);
        let right = Node::leaf(b'b', 3);

        let n = Node::from_children(left, right, 128);

        assert_eq!(n.weight(), 8);
        assert_eq!(n.symbol(), None);
        assert!(!n.is_leaf());
        assert_eq!(n.child(false).and_then(Node::symbol), Some(b'a'));
        assert_eq!(n.child(true).and_then(Node::symbol), Some(b'b'));
    }

    #[test]
    fn node_compare_weight_then_rank() {
        let light = Node::leaf(b'z', 1);
        let heavy = Node::leaf(b'a', 2);
        assert!(light < heavy);

        let low_symbol = Node::leaf(b'a', 4);
        let high_symbol = Node::leaf(b'b', 4);
        assert!(low_symbol < high_symbol);

        let merged = Node::from_children(Node::leaf(0, 2), Node::leaf(1, 2), 128);
        assert!(Node::leaf(127, 4) < merged);
    }

    #[test]
    fn empty_table_has_no_tree() {
        assert!(build_tree(&table_of(b"")).is_none());
    }

    #[test]
    fn single_symbol_is_bare_leaf_with_empty_code() {
        let root = build_tree(&table_of(b"zzzz")).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.weight(), 4);

        let codes = root.assign_codes();
        assert_eq!(codes.len(), 1);
        assert!(codes[&b'z'].is_empty());
    }

    #[test]
    fn aaabbc_codes() {
        let root = build_tree(&table_of(b"aaabbc")).unwrap();
        assert_eq!(root.weight(), 6);

        let codes = root.assign_codes();
        assert_eq!(codes[&b'a'], code("0"));
        assert_eq!(codes[&b'c'], code("10"));
        assert_eq!(codes[&b'b'], code("11"));
    }

    #[test]
    fn classic_weights_total() {
        // weights from the OpenDSA Huffman walkthrough
        let input: Vec<u8> = [
            (b'Z', 2),
            (b'K', 7),
            (b'M', 24),
            (b'C', 32),
            (b'U', 37),
            (b'D', 42),
            (b'L', 42),
            (b'E', 120),
        ]
        .iter()
        .flat_map(|&(sym, n)| std::iter::repeat(sym).take(n))
        .collect();

        let root = build_tree(&table_of(&input)).unwrap();
        assert_eq!(root.weight(), 306);

        let codes = root.assign_codes();
        assert_eq!(codes[&b'E'].len(), 1);
        assert_eq!(codes[&b'Z'].len(), 6);
        assert_eq!(codes[&b'K'].len(), 6);
    }

    #[test]
    fn emission_order_is_ascending_weight_then_symbol() {
        let order: Vec<_> = emission_order(&table_of(b"aaabbcdd"))
            .filter_map(|n| n.symbol())
            .collect();
        assert_eq!(order, b"cbda".to_vec());
    }

    #[test]
    fn replayed_paths_rebuild_the_tree() {
        let root = build_tree(&table_of(b"abracadabra")).unwrap();
        let codes = root.assign_codes();

        let mut rebuilt = Node::empty();
        for (&sym, c) in &codes {
            rebuilt.insert_path(sym, c).unwrap();
        }

        assert_eq!(rebuilt.assign_codes(), codes);
    }

    #[test]
    fn empty_path_places_symbol_at_root() {
        let mut root = Node::empty();
        root.insert_path(b'x', &Code::new()).unwrap();

        assert!(root.is_leaf());
        assert_eq!(root.symbol(), Some(b'x'));
    }

    #[test]
    fn duplicate_path_is_corrupt() {
        let mut root = Node::empty();
        root.insert_path(b'a', &code("01")).unwrap();
        let err = root.insert_path(b'b', &code("01")).unwrap_err();
        assert!(matches!(err, Error::CorruptTree(_)));
    }

    #[test]
    fn path_through_leaf_is_corrupt() {
        let mut root = Node::empty();
        root.insert_path(b'a', &code("0")).unwrap();
        let err = root.insert_path(b'b', &code("01")).unwrap_err();
        assert!(matches!(err, Error::CorruptTree(_)));
    }

    #[test]
    fn path_ending_on_internal_node_is_corrupt() {
        let mut root = Node::empty();
        root.insert_path(b'a', &code("01")).unwrap();
        let err = root.insert_path(b'b', &code("0")).unwrap_err();
        assert!(matches!(err, Error::CorruptTree(_)));
    }

    proptest! {
        #[test]
        fn codes_are_prefix_free(input in prop::collection::vec(0u8..128, 1..512)) {
            let root = build_tree(&table_of(&input)).unwrap();
            let codes: Vec<Code> = root.assign_codes().into_values().collect();

            for (i, a) in codes.iter().enumerate() {
                for (j, b) in codes.iter().enumerate() {
                    if i != j {
                        prop_assert!(!b.starts_with(a.as_bitslice()));
                    }
                }
            }
        }

        #[test]
        fn root_weight_is_input_length(input in prop::collection::vec(0u8..128, 1..512)) {
            let root = build_tree(&table_of(&input)).unwrap();
            prop_assert_eq!(root.weight(), input.len() as u64);
        }
    }
}
