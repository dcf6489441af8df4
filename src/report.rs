//! Summary statistics for a built tree, backing a report page.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::tree::GameTree;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    /// All positions, root included.
    pub nodes: usize,
    /// Variation endpoints (terminal positions).
    pub leaves: usize,
    pub max_depth: u32,
    /// Leaf count per depth.
    pub depth_histogram: BTreeMap<u32, usize>,
    /// Node count per number of alternative continuations.
    pub alternatives_histogram: BTreeMap<usize, usize>,
}

impl TreeReport {
    pub fn new(tree: &GameTree) -> TreeReport {
        let mut leaves = 0;
        let mut depth_histogram = BTreeMap::new();
        let mut alternatives_histogram = BTreeMap::new();

        for node in tree.iter() {
            if node.is_terminal() {
                leaves += 1;
                *depth_histogram.entry(node.depth()).or_insert(0) += 1;
            }
            *alternatives_histogram
                .entry(node.alternatives().len())
                .or_insert(0) += 1;
        }

        TreeReport {
            nodes: tree.len(),
            leaves,
            max_depth: tree.max_depth(),
            depth_histogram,
            alternatives_histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::TreeReport;
    use crate::tree::GameTree;

    #[test]
    fn counts_for_a_small_repertoire() {
        let tree = GameTree::from_pgn("1. e4 e5 (1... c5) 2. Nf3").unwrap();
        let report = TreeReport::new(&tree);

        // root, e4, e5, c5, Nf3
        assert_eq!(report.nodes, 5);
        // c5 and Nf3 are terminal.
        assert_eq!(report.leaves, 2);
        assert_eq!(report.max_depth, 3);
        assert_eq!(report.depth_histogram.get(&2), Some(&1));
        assert_eq!(report.depth_histogram.get(&3), Some(&1));
        // Exactly one node (e4) has one alternative continuation.
        assert_eq!(report.alternatives_histogram.get(&1), Some(&1));
        assert_eq!(report.alternatives_histogram.get(&0), Some(&4));
    }
}
