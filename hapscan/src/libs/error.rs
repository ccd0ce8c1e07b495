use std::path::PathBuf;

use thiserror::Error as ThisError;

#[rustfmt::skip]
#[derive(ThisError, Debug, PartialEq)]
pub enum Error {
    #[error("Failed to open file: {path:?}")]
    Io { path: PathBuf },

    #[error("Malformed VCF record at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("The VCF file is not sorted: {prev_pos} > {pos} at {contig}")]
    Order { prev_pos: u64, pos: u64, contig: String },

    #[error("Record at {pos} precedes the first window starting at {start}")]
    BeforeWindowStart { pos: u64, start: u64 },

    #[error("Contig changed from {prev} to {contig} at {pos}. Split the VCF by contig before scanning.")]
    ContigChanged { prev: String, contig: String, pos: u64 },

    #[error("Record at {pos} has {found} samples, but the window started with {expected}")]
    Shape { pos: u64, expected: usize, found: usize },

    #[error("Clustering failed: {msg}")]
    Computation { msg: String },

    #[error("Invalid window configuration: {msg}")]
    WindowConfig { msg: String },

    #[error("No file type extension in path: {path}")]
    NoFileType { path: PathBuf },

    #[error("File type: {ext} is not supported")]
    FileNotSupported { ext: String },

    #[error("Cannot parse window coordinates from tree file name: {path}")]
    TreeFileName { path: PathBuf },
}

impl Error {
    /// Non-monotonic positions, a record before the scan origin or a contig switch
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::Order { .. } | Self::BeforeWindowStart { .. } | Self::ContigChanged { .. }
        )
    }
}
