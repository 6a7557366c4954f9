use std::collections::BTreeMap;
use std::fmt;

use crate::tree::{HuffmanTree, Node};

/// A code word, first bit first. `false` is a left branch, `true` a right one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code(Vec<bool>);

impl Code {
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to code word, one entry per leaf of the tree it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Walks `tree`, appending `0` on the way left and `1` on the way right.
    /// A tree that is a single leaf gives that symbol the code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        match &tree.root {
            Node::Leaf { symbol, .. } => {
                codes.insert(*symbol, Code(vec![false]));
            }
            root => build_codes_recursive(root, &mut Vec::new(), &mut codes),
        }
        CodeTable { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(symbol, code)| (*symbol, code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn build_codes_recursive(node: &Node, prefix: &mut Vec<bool>, codes: &mut BTreeMap<u8, Code>) {
    match node {
        Node::Leaf { symbol, .. } => {
            codes.insert(*symbol, Code(prefix.clone()));
        }
        Node::Internal { left, right, .. } => {
            prefix.push(false);
            build_codes_recursive(left, prefix, codes);
            prefix.pop();

            prefix.push(true);
            build_codes_recursive(right, prefix, codes);
            prefix.pop();
        }
    }
}
