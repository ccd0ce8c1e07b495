use std::io::Write;

use color_eyre::{eyre::eyre, Result};
use csv::Writer;

use crate::branch_stats::BranchStats;
use crate::hapcount::HapCount;
use crate::windows::Window;

/// A result row in the csv output of a scan
pub trait CsvRow {
    fn to_csv_row(&self) -> Vec<String>;
}

/// Writes the header and then one row per window, in the order the windows are emitted
pub struct WindowEmitter<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl<W: Write> WindowEmitter<W> {
    pub fn new<H: AsRef<[u8]>>(mut writer: Writer<W>, header: &[H]) -> Result<Self> {
        writer.write_record(header)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn emit<R: CsvRow>(&mut self, row: &R) -> Result<()> {
        self.writer.write_record(row.to_csv_row())?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close the output, returning the number of rows written
    pub fn finish(self) -> Result<usize> {
        let rows = self.rows;
        self.into_inner()?;
        Ok(rows)
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| eyre!("Failed to flush the output: {}", e.error()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgmaRow {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub stats: BranchStats,
    pub snp_density: f64,
}

impl UpgmaRow {
    pub const HEADER: [&'static str; 7] = [
        "CHROM",
        "START",
        "END",
        "AVG_branch_length",
        "LONGEST_branch_length",
        "Tree_Height",
        "SNP_density",
    ];

    /// Empty windows are reported with zeroed statistics
    pub fn new(window: &Window, stats: BranchStats) -> Self {
        Self {
            contig: window.contig.clone(),
            start: window.start,
            end: window.end,
            stats,
            snp_density: window.snp_density(),
        }
    }
}

impl CsvRow for UpgmaRow {
    fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.contig.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.stats.avg_branch_length.to_string(),
            self.stats.norm_top_branch_length.to_string(),
            self.stats.tree_height.to_string(),
            self.snp_density.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HapcountRow {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub count: HapCount,
    pub snp_density: f64,
}

impl HapcountRow {
    pub const HEADER: [&'static str; 6] = [
        "CHROM",
        "START",
        "END",
        "NUM_uniq_haps",
        "sample_size",
        "SNP_density",
    ];

    pub fn new(window: &Window, count: HapCount) -> Self {
        Self {
            contig: window.contig.clone(),
            start: window.start,
            end: window.end,
            count,
            snp_density: window.snp_density(),
        }
    }
}

impl CsvRow for HapcountRow {
    fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.contig.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.count.unique.to_string(),
            self.count.total.to_string(),
            self.snp_density.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HetRow {
    pub contig: String,
    pub pos: u64,
    pub heterozygosity: Vec<f64>,
    pub geometric_mean: f64,
    pub p10_mean: f64,
}

impl HetRow {
    pub fn header(samples: &[String]) -> Vec<String> {
        let mut header = vec!["CHROM".to_string(), "POS".to_string()];
        header.extend(samples.iter().cloned());
        header.push("Geometric_mean".to_string());
        header.push("p10_mean".to_string());
        header
    }
}

impl CsvRow for HetRow {
    fn to_csv_row(&self) -> Vec<String> {
        let mut row = vec![self.contig.clone(), self.pos.to_string()];
        row.extend(self.heterozygosity.iter().map(f64::to_string));
        row.push(self.geometric_mean.to_string());
        row.push(self.p10_mean.to_string());
        row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchStatsRow {
    pub window: usize,
    pub pos: u64,
    pub stats: BranchStats,
}

impl BranchStatsRow {
    pub const HEADER: [&'static str; 4] =
        ["WIN", "POS", "LONGEST_branch_length", "AVG_branch_length"];
}

impl CsvRow for BranchStatsRow {
    fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.window.to_string(),
            self.pos.to_string(),
            self.stats.norm_top_branch_length.to_string(),
            self.stats.avg_branch_length.to_string(),
        ]
    }
}
