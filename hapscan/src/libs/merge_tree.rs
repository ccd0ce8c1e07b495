use std::path::Path;

use color_eyre::{eyre::eyre, Result};
use ndarray::{Array2, ArrayView2};

use crate::error::Error;

/// A child of a merge. Leaves are haplotypes, clusters point to the merge step that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Leaf(usize),
    Cluster(usize),
}

impl Node {
    /// Resolve a linkage id, where ids below `nleaves` are leaves and id `nleaves + i` is the
    /// cluster created at step `i`
    pub fn from_id(id: usize, nleaves: usize) -> Self {
        match id < nleaves {
            true => Self::Leaf(id),
            false => Self::Cluster(id - nleaves),
        }
    }

    pub fn id(&self, nleaves: usize) -> usize {
        match *self {
            Self::Leaf(idx) => idx,
            Self::Cluster(step) => nleaves + step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: Node,
    pub right: Node,
    pub distance: f64,
    pub size: usize,
}

/// The ordered merge steps of a hierarchical clustering, the last step being the root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeTree {
    nleaves: usize,
    merges: Vec<Merge>,
}

impl MergeTree {
    pub fn new(nleaves: usize, merges: Vec<Merge>) -> Self {
        Self { nleaves, merges }
    }

    /// Read a linkage array with rows `[id_a, id_b, distance, size]`
    pub fn from_linkage(linkage: ArrayView2<f64>) -> Result<Self> {
        let invalid = |msg: String| eyre!(Error::Computation { msg });

        if linkage.ncols() != 4 {
            return Err(invalid(format!(
                "a linkage array has 4 columns, found {}",
                linkage.ncols()
            )));
        }

        let nleaves = linkage.nrows() + 1;
        let mut sizes: Vec<usize> = vec![1; nleaves];
        // Every leaf and cluster is merged at most once
        let mut merged = vec![false; 2 * nleaves - 1];
        let mut merges = Vec::with_capacity(linkage.nrows());

        for (step, row) in linkage.rows().into_iter().enumerate() {
            let mut children = [Node::Leaf(0); 2];

            for (child, value) in children.iter_mut().zip([row[0], row[1]]) {
                if value < 0.0 || value.fract() != 0.0 || value as usize >= nleaves + step {
                    return Err(invalid(format!(
                        "step {step} refers to {value}, which does not exist yet"
                    )));
                }
                *child = Node::from_id(value as usize, nleaves);
            }

            for child in children {
                let id = child.id(nleaves);
                if merged[id] {
                    return Err(invalid(format!("step {step} merges {id}, which is already merged")));
                }
                merged[id] = true;
            }

            let distance = row[2];
            if !distance.is_finite() || distance < 0.0 {
                return Err(invalid(format!("step {step} has distance {distance}")));
            }

            let size = sizes[children[0].id(nleaves)] + sizes[children[1].id(nleaves)];
            if row[3] != size as f64 {
                return Err(invalid(format!(
                    "step {step} merges {size} leaves, but reports {}",
                    row[3]
                )));
            }
            sizes.push(size);

            merges.push(Merge {
                left: children[0],
                right: children[1],
                distance,
                size,
            });
        }

        if let Some(root) = merges.last() {
            if root.size != nleaves {
                return Err(invalid(format!(
                    "the root merges {} of {nleaves} leaves",
                    root.size
                )));
            }
        }

        Ok(Self::new(nleaves, merges))
    }

    pub fn to_linkage(&self) -> Array2<f64> {
        let mut linkage = Array2::zeros((self.merges.len(), 4));

        for (mut row, merge) in linkage.rows_mut().into_iter().zip(&self.merges) {
            row[0] = merge.left.id(self.nleaves) as f64;
            row[1] = merge.right.id(self.nleaves) as f64;
            row[2] = merge.distance;
            row[3] = merge.size as f64;
        }

        linkage
    }

    pub fn nleaves(&self) -> usize {
        self.nleaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn root(&self) -> Option<&Merge> {
        self.merges.last()
    }

    /// Distance of the root merge
    pub fn height(&self) -> f64 {
        self.root().map_or(0.0, |root| root.distance)
    }

    pub fn node_height(&self, node: Node) -> f64 {
        match node {
            Node::Leaf(_) => 0.0,
            Node::Cluster(step) => self.merges[step].distance,
        }
    }

    pub fn write_npy(&self, path: &Path) -> Result<()> {
        ndarray_npy::write_npy(path, &self.to_linkage())?;
        Ok(())
    }

    pub fn read_npy(path: &Path) -> Result<Self> {
        let linkage: Array2<f64> = ndarray_npy::read_npy(path)?;
        Self::from_linkage(linkage.view())
    }
}
