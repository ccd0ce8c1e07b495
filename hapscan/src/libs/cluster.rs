use color_eyre::{eyre::eyre, Result};
use ndarray::ArrayView1;

use crate::error::Error;
use crate::matrix::HaplotypeMatrix;
use crate::merge_tree::{Merge, MergeTree, Node};

/// Condensed upper triangle of a symmetric distance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Pairwise euclidean distances between the haplotypes
    pub fn from_haplotypes(matrix: &HaplotypeMatrix) -> Self {
        let n = matrix.nhaplotypes();
        let mut data = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for i in 0..n {
            let a = matrix.haplotype(i);
            for j in (i + 1)..n {
                data.push(euclidean(a, matrix.haplotype(j)));
            }
        }

        Self { n, data }
    }

    pub fn from_condensed(n: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n * n.saturating_sub(1) / 2 {
            return Err(eyre!(Error::Computation {
                msg: format!("{} distances do not form a condensed matrix of {n} items", data.len()),
            }));
        }

        if data.iter().any(|d| !d.is_finite()) {
            return Err(eyre!(Error::Computation {
                msg: "the distance matrix contains non-finite values".to_string(),
            }));
        }

        Ok(Self { n, data })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }
}

pub fn euclidean(a: ArrayView1<u8>, b: ArrayView1<u8>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// UPGMA tree of the haplotypes of a window
pub fn average_linkage(matrix: &HaplotypeMatrix) -> Result<MergeTree> {
    if matrix.nhaplotypes() < 2 {
        return Err(eyre!(Error::Computation {
            msg: format!(
                "at least 2 haplotypes are needed for clustering, found {}",
                matrix.nhaplotypes()
            ),
        }));
    }

    linkage(DistanceMatrix::from_haplotypes(matrix))
}

/// Average linkage by the nearest-neighbor chain algorithm.
///
/// Ties are resolved deterministically: the chain keeps its predecessor over an equally
/// distant cluster, and otherwise the lowest cluster index wins. Merges are sorted by
/// distance (stable) and relabeled so that a new cluster created at step `i` gets the id
/// `n + i`, the child with the smaller id being listed first.
pub fn linkage(mut distances: DistanceMatrix) -> Result<MergeTree> {
    let n = distances.len();
    if n < 2 {
        return Err(eyre!(Error::Computation {
            msg: format!("at least 2 items are needed for clustering, found {n}"),
        }));
    }

    // Cluster sizes by slot, zero once a slot has been merged away
    let mut size = vec![1usize; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut steps: Vec<(usize, usize, f64)> = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        if chain.is_empty() {
            // At least two slots are active, so there is always a first one
            if let Some(first) = size.iter().position(|&s| s > 0) {
                chain.push(first);
            }
        }

        let (x, y, distance) = loop {
            let x = chain[chain.len() - 1];
            let prev = chain.len().checked_sub(2).map(|i| chain[i]);

            let (mut y, mut current) = match prev {
                Some(p) => (p, distances.get(x, p)),
                None => (x, f64::INFINITY),
            };

            for i in (0..n).filter(|&i| i != x && size[i] > 0) {
                let d = distances.get(x, i);
                if d < current {
                    current = d;
                    y = i;
                }
            }

            if prev == Some(y) {
                chain.truncate(chain.len() - 2);
                break (x, y, current);
            }

            chain.push(y);
        };

        let (x, y) = if x < y { (x, y) } else { (y, x) };
        let (nx, ny) = (size[x], size[y]);
        steps.push((x, y, distance));

        // The merged cluster takes over slot y
        size[x] = 0;
        size[y] = nx + ny;

        for i in (0..n).filter(|&i| i != y && size[i] > 0) {
            let d = (nx as f64 * distances.get(i, x) + ny as f64 * distances.get(i, y))
                / (nx + ny) as f64;
            distances.set(i, y, d);
        }
    }

    steps.sort_by(|a, b| a.2.total_cmp(&b.2));

    Ok(label_steps(n, &steps))
}

// Rewrite slot ids into cluster ids with a union find
fn label_steps(n: usize, steps: &[(usize, usize, f64)]) -> MergeTree {
    let mut parent: Vec<usize> = (0..2 * n - 1).collect();
    let mut sizes: Vec<usize> = vec![1; 2 * n - 1];

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        let mut root = x;
        while parent[root] != root {
            root = parent[root];
        }
        while parent[x] != root {
            let next = parent[x];
            parent[x] = root;
            x = next;
        }
        root
    }

    let merges = steps
        .iter()
        .enumerate()
        .map(|(step, &(x, y, distance))| {
            let rx = find(&mut parent, x);
            let ry = find(&mut parent, y);
            let (a, b) = if rx < ry { (rx, ry) } else { (ry, rx) };

            let label = n + step;
            parent[a] = label;
            parent[b] = label;
            sizes[label] = sizes[a] + sizes[b];

            Merge {
                left: Node::from_id(a, n),
                right: Node::from_id(b, n),
                distance,
                size: sizes[label],
            }
        })
        .collect();

    MergeTree::new(n, merges)
}
