// HAPSCAN - Windowed haplotype structure scans
// Copyright (C) 2024  Osma S. Rautila
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! HAPSCAN - Windowed haplotype structure scans
//!
//! Sliding window scans over phased, biallelic VCFs. Each window is turned into a
//! haplotype matrix which is then summarized either by the shape of an average linkage
//! (UPGMA) tree or by the number of distinct haplotypes. Regions with unusual genealogies,
//! such as common inversions, stand out from the genome-wide background in both.
//!
//! HAPSCAN commands
//!
//! * UPGMA scan: average and longest branch length, tree height
//! * Haplotype count scan: distinct haplotypes per window
//! * Heterozygosity scan: per sample heterozygosity per window
//! * Branch statistics from dumped merge trees
//!
//! ## Running HAPSCAN
//!
//! ```bash
//! hapscan upgma-scan chr17.vcf.gz --unit bp --windows 3000:1500 -o results
//!
//! hapscan hapcount-scan chr*.vcf.gz --unit snp --windows 1000:100 10000:1000 -t 8 -o results
//!
//! hapscan upgma-scan chr17.vcf.gz --unit snp --windows 100:100 --dump-trees -o results
//! hapscan branch-stats results/trees/chr17_SNPwindow100_SNPstep100 -o results
//! ```

#[doc(hidden)]
pub mod args;

#[doc(hidden)]
pub mod io;

/// Streaming reader for phased VCF text
pub mod read_vcf;

/// Record count and genomic span windows
pub mod windows;

/// Haplotype matrices built from windows
pub mod matrix;

/// Average linkage clustering
pub mod cluster;

/// Merge trees produced by the clustering
pub mod merge_tree;

/// Branch length statistics of merge trees
pub mod branch_stats;

/// Distinct haplotype counting
pub mod hapcount;

/// Per window result rows
pub mod emitter;

#[doc(hidden)]
pub mod utils;

#[doc(hidden)]
pub mod error;

#[cfg(feature = "clap")]
pub mod clap;
