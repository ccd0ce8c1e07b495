#![allow(dead_code)]
use std::path::{Path, PathBuf};

use hapscan::args::{ScanArgs, WindowUnit};

pub const TEST_VCF: &str = "tests/data/chr21_test.vcf";
pub const DUPLICATE_PAIRS_VCF: &str = "tests/data/duplicate_pairs.vcf";
pub const UPGMA_EXAMPLE_VCF: &str = "tests/data/upgma_example.vcf";
pub const UNSORTED_VCF: &str = "tests/data/unsorted.vcf";
pub const OUTDIR: &str = "tests/results";

/// Scan arguments writing into their own directory under tests/results
pub fn scan_args(file: &str, outdir: &str, unit: WindowUnit, windows: &[(u64, u64)]) -> ScanArgs {
    let output = PathBuf::from(OUTDIR).join(outdir);
    hapscan::io::create_dir(&output).unwrap();

    ScanArgs {
        files: vec![PathBuf::from(file)],
        output,
        prefix: None,
        unit,
        windows: windows.to_vec(),
        start: 1,
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Column `idx` of every data row parsed as a float
pub fn float_column(lines: &[String], idx: usize) -> Vec<f64> {
    lines
        .iter()
        .skip(1)
        .map(|line| line.split(',').nth(idx).unwrap().parse::<f64>().unwrap())
        .collect()
}

#[cfg(feature = "clap")]
pub fn silent_verbosity() -> hapscan::clap::LogAndVerbosity {
    hapscan::clap::LogAndVerbosity {
        verbosity: 1,
        log_file: None,
        silent: false,
    }
}
