use std::path::PathBuf;

#[cfg(feature = "clap")]
use crate::utils::parse_window;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ScanArgs {
    /// Phased VCF files, one contig per file
    #[cfg_attr(feature = "clap", arg(required = true, num_args = 1..))]
    pub files: Vec<PathBuf>,

    /// Output directory
    #[cfg_attr(feature = "clap", arg(short = 'o', long="outdir", default_value_os_t = PathBuf::from("./"), value_hint = clap::ValueHint::DirPath))]
    pub output: PathBuf,

    /// Output filename prefix
    #[cfg_attr(feature = "clap", arg(short = 'p', long))]
    pub prefix: Option<String>,

    /// Slide windows by a number of variants or by basepairs
    #[cfg_attr(feature = "clap", arg(short = 'u', long, value_enum, default_value_t = WindowUnit::Snp))]
    pub unit: WindowUnit,

    /// Window sizes and steps as SIZE:STEP, i.e. 3000:1500. Every file is scanned with every window
    #[cfg_attr(feature = "clap", arg(short = 'w', long, value_delimiter = ' ', num_args = 1.., value_parser = parse_window, default_value = "1000:100"))]
    pub windows: Vec<(u64, u64)>,

    /// First coordinate of the first basepair window
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 1))]
    pub start: u64,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            files: vec![],
            output: PathBuf::from("./"),
            prefix: None,
            unit: WindowUnit::Snp,
            windows: vec![(1000, 100)],
            start: 1,
        }
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum WindowUnit {
    #[default]
    /// Windows contain a fixed number of variants
    Snp,
    /// Windows span a fixed number of basepairs, empty windows are reported too
    Bp,
}

impl std::fmt::Display for WindowUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Snp => write!(f, "SNP"),
            Self::Bp => write!(f, "BP"),
        }
    }
}
