use itertools::Itertools;

use crate::matrix::HaplotypeMatrix;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HapCount {
    pub unique: usize,
    pub total: usize,
}

impl HapCount {
    /// Exact row deduplication, two haplotypes are equal only if every allele matches
    pub fn from_matrix(matrix: &HaplotypeMatrix) -> Self {
        Self {
            unique: haplotype_counts(matrix).len(),
            total: matrix.nhaplotypes(),
        }
    }
}

/// Distinct haplotypes in ascending order along with how many times each occurs
pub fn haplotype_counts(matrix: &HaplotypeMatrix) -> Vec<(usize, Vec<u8>)> {
    matrix
        .haplotypes()
        .map(|hap| hap.to_vec())
        .sorted_unstable()
        .dedup_with_count()
        .collect()
}
