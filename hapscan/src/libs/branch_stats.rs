use statrs::statistics::Statistics;

use crate::merge_tree::{MergeTree, Node};

/// Shape of a merge tree summarized by its branch lengths.
///
/// A degenerate tree with zero height (all haplotypes identical) has every statistic at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BranchStats {
    pub tree_height: f64,
    /// Mean merge distance relative to the tree height, in [0, 1]
    pub avg_branch_length: f64,
    /// Longest branch anywhere in the tree
    pub top_branch_length: f64,
    /// `top_branch_length` relative to twice the tree height
    pub norm_top_branch_length: f64,
}

impl BranchStats {
    pub fn from_tree(tree: &MergeTree) -> Self {
        let tree_height = tree.height();

        if tree.is_empty() || tree_height <= 0.0 {
            return Self::default();
        }

        let avg_branch_length = tree.merges().iter().map(|m| m.distance).mean() / tree_height;

        let top_branch_length = (0..tree.len())
            .map(|step| branch_length(tree, step))
            .fold(f64::NEG_INFINITY, f64::max);

        Self {
            tree_height,
            avg_branch_length,
            top_branch_length,
            norm_top_branch_length: top_branch_length / (2.0 * tree_height),
        }
    }
}

/// Twice the merge distance of a step minus the heights of the merged children
pub fn branch_length(tree: &MergeTree, step: usize) -> f64 {
    let merge = &tree.merges()[step];
    2.0 * merge.distance - (child_height(tree, merge.left) + child_height(tree, merge.right))
}

fn child_height(tree: &MergeTree, node: Node) -> f64 {
    match node {
        Node::Leaf(_) => 0.0,
        node => tree.node_height(node),
    }
}

/// Branch length of the root merge alone
pub fn root_branch_length(tree: &MergeTree) -> f64 {
    match tree.len() {
        0 => 0.0,
        len => branch_length(tree, len - 1),
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use ndarray::array;

    fn example_tree() -> MergeTree {
        let linkage = array![[1., 3., 0., 2.], [2., 4., 1., 3.], [0., 5., 3.10818511, 4.]];
        MergeTree::from_linkage(linkage.view()).unwrap()
    }

    #[test]
    fn test_branch_lengths() {
        let tree = example_tree();
        assert_eq!(branch_length(&tree, 0), 0.0);
        assert_eq!(branch_length(&tree, 1), 2.0);
        assert!((branch_length(&tree, 2) - 5.21637022).abs() < 1e-8);
        assert_eq!(root_branch_length(&tree), branch_length(&tree, 2));
    }

    #[test]
    fn test_branch_stats() {
        let stats = BranchStats::from_tree(&example_tree());
        assert_eq!(stats.tree_height, 3.10818511);
        assert!((stats.top_branch_length - 5.216).abs() < 1e-3);
        assert!((stats.norm_top_branch_length - 0.839).abs() < 1e-3);
        assert!((stats.avg_branch_length - 4.10818511 / 3.0 / 3.10818511).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&stats.avg_branch_length));
    }

    #[test]
    fn test_longest_branch_below_root() {
        // A deep early merge joined by a root barely above it
        let linkage = array![[0., 1., 4., 2.], [2., 3., 1., 2.], [4., 5., 4.5, 4.]];
        let tree = MergeTree::from_linkage(linkage.view()).unwrap();
        let stats = BranchStats::from_tree(&tree);

        assert_eq!(branch_length(&tree, 0), 8.0);
        assert_eq!(root_branch_length(&tree), 4.0);
        assert_eq!(stats.top_branch_length, 8.0);
        assert_eq!(stats.norm_top_branch_length, 8.0 / 9.0);
    }

    #[test]
    fn test_zero_height() {
        let linkage = array![[0., 1., 0., 2.], [2., 3., 0., 3.]];
        let stats = BranchStats::from_tree(&MergeTree::from_linkage(linkage.view()).unwrap());
        assert_eq!(stats, BranchStats::default());
    }

    #[test]
    fn test_equal_distances() {
        let linkage = array![[0., 1., 2., 2.], [2., 3., 2., 3.]];
        let stats = BranchStats::from_tree(&MergeTree::from_linkage(linkage.view()).unwrap());
        assert_eq!(stats.avg_branch_length, 1.0);
    }
}
