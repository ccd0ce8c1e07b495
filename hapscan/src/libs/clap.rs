use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::OffsetTime;

use crate::args::ScanArgs;
use crate::io::create_dir;
use crate::subcommands::{branch_stats, hapcount_scan, het_scan, upgma_scan};

#[derive(Parser, Debug)]
#[command(author, version, about, styles=get_styles())]
pub struct Arguments {
    #[command(subcommand)]
    cmd: SubCommand,
}

#[derive(Args, Debug, Clone)]
pub struct LogAndVerbosity {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,

    /// A file path to save logs to
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Silence all warning and info messages
    #[arg(long)]
    pub silent: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Cluster the haplotypes of each window (UPGMA) and report branch lengths and tree height
    UpgmaScan {
        #[command(flatten)]
        args: ScanArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,

        /// Save the merge tree of each window as .npy into <OUTDIR>/trees
        #[arg(long)]
        dump_trees: bool,
    },

    /// Count the distinct haplotypes of each window
    HapcountScan {
        #[command(flatten)]
        args: ScanArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,
    },

    /// Per sample heterozygosity in windows of a fixed number of variants
    HetScan {
        #[command(flatten)]
        args: ScanArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,
    },

    /// Recompute the longest and average branch lengths from dumped merge trees
    BranchStats {
        /// Directory of .npy merge trees written by upgma-scan --dump-trees
        trees: PathBuf,

        /// Output directory
        #[arg(short = 'o', long = "outdir", default_value_os_t = PathBuf::from("./"), value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,

        /// Output filename prefix
        #[arg(short = 'p', long)]
        prefix: Option<String>,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,
    },
}

impl SubCommand {
    pub fn threads(&self) -> usize {
        match self {
            SubCommand::UpgmaScan { threads, .. }
            | SubCommand::HapcountScan { threads, .. }
            | SubCommand::HetScan { threads, .. }
            | SubCommand::BranchStats { threads, .. } => (*threads).max(1),
        }
    }

    #[rustfmt::skip]
    pub fn log_and_verbosity(&self) -> (u8, &Option<PathBuf>, bool) {
        match self {
            SubCommand::UpgmaScan { log_and_verbosity, .. }
            | SubCommand::HapcountScan { log_and_verbosity, .. }
            | SubCommand::HetScan { log_and_verbosity, .. }
            | SubCommand::BranchStats { log_and_verbosity, .. }
            => (log_and_verbosity.verbosity, &log_and_verbosity.log_file, log_and_verbosity.silent),
        }
    }

    #[rustfmt::skip]
    pub fn output(&self) -> PathBuf {
        match self {
            SubCommand::UpgmaScan { args: ScanArgs { output, .. }, .. }
            | SubCommand::HapcountScan { args: ScanArgs { output, .. }, .. }
            | SubCommand::HetScan { args: ScanArgs { output, .. }, .. }
            | SubCommand::BranchStats { output, .. }
            => output.clone(),
        }
    }
}

pub fn run_args(args: Arguments) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cmd.threads())
        .build_global()?;

    let (verbosity, log_file, is_silent) = args.cmd.log_and_verbosity();

    let (level, wrtr, _guard) = init_tracing(verbosity, log_file, is_silent)?;

    let timer = time::format_description::parse("[hour]:[minute]:[second].[subsecond digits:3]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(time_offset, timer);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(wrtr)
        .with_timer(timer)
        .init();

    create_dir(&args.cmd.output())?;

    run_cmd(args.cmd)?;

    Ok(())
}

#[rustfmt::skip]
pub fn run_cmd(cmd: SubCommand) -> Result<()> {
    match cmd {
        SubCommand::UpgmaScan { args, dump_trees, .. } => upgma_scan::run(args, dump_trees)?,
        SubCommand::HapcountScan { args, .. } => hapcount_scan::run(args)?,
        SubCommand::HetScan { args, .. } => het_scan::run(args)?,
        SubCommand::BranchStats { trees, output, prefix, .. } => branch_stats::run(trees, output, prefix)?,
    };
    Ok(())
}

pub fn init_tracing(
    verbosity: u8,
    log_file: &Option<PathBuf>,
    is_silent: bool,
) -> Result<(Level, NonBlocking, WorkerGuard)> {
    let level = if is_silent {
        Level::ERROR
    } else {
        match verbosity {
            0 | 1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            5..=u8::MAX => Level::TRACE,
        }
    };

    // Write logs to stderr or file
    let (wrtr, _guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    Ok((level, wrtr, _guard))
}

pub fn get_styles() -> clap::builder::Styles {
    let yellow = Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow));
    let green = Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green));
    let red = Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red));

    clap::builder::Styles::styled()
        .usage(anstyle::Style::new().bold().underline().fg_color(yellow))
        .header(anstyle::Style::new().bold().underline().fg_color(yellow))
        .literal(anstyle::Style::new().fg_color(green))
        .invalid(anstyle::Style::new().bold().fg_color(red))
        .error(anstyle::Style::new().bold().fg_color(red))
        .valid(anstyle::Style::new().bold().underline().fg_color(green))
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::WindowUnit;

    fn log_and_verbosity() -> LogAndVerbosity {
        LogAndVerbosity {
            verbosity: 0,
            log_file: None,
            silent: false,
        }
    }

    #[test]
    fn test_init_tracing() {
        let (level, _, _) = init_tracing(1, &None, false).unwrap();
        assert_eq!(Level::ERROR, level);
        let (level, _, _) = init_tracing(2, &None, false).unwrap();
        assert_eq!(Level::WARN, level);
        let (level, _, _) = init_tracing(3, &None, false).unwrap();
        assert_eq!(Level::INFO, level);
        let (level, _, _) = init_tracing(4, &None, false).unwrap();
        assert_eq!(Level::DEBUG, level);
        let (level, _, _) = init_tracing(5, &None, false).unwrap();
        assert_eq!(Level::TRACE, level);
        let (level, _, _) = init_tracing(5, &None, true).unwrap();
        assert_eq!(Level::ERROR, level);
    }

    #[test]
    fn test_threads() {
        let subcommand = SubCommand::HapcountScan {
            args: ScanArgs::default(),
            log_and_verbosity: log_and_verbosity(),
            threads: 0,
        };
        assert_eq!(1, subcommand.threads());

        let subcommand = SubCommand::BranchStats {
            trees: PathBuf::from("trees"),
            output: PathBuf::from("results"),
            prefix: None,
            log_and_verbosity: log_and_verbosity(),
            threads: 4,
        };
        assert_eq!(4, subcommand.threads());
        assert_eq!(PathBuf::from("results"), subcommand.output());
    }

    #[test]
    fn test_parse_arguments() {
        let args = Arguments::try_parse_from([
            "hapscan", "upgma-scan", "chr1.vcf.gz", "chr2.vcf.gz",
            "--unit", "bp", "--windows", "3000:1500", "100:50", "-o", "out", "--dump-trees",
        ])
        .unwrap();

        match args.cmd {
            SubCommand::UpgmaScan { args, dump_trees, threads, log_and_verbosity } => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.unit, WindowUnit::Bp);
                assert_eq!(args.windows, vec![(3000, 1500), (100, 50)]);
                assert_eq!(args.output, PathBuf::from("out"));
                assert_eq!(args.start, 1);
                assert!(dump_trees);
                assert_eq!(threads, 8);
                assert_eq!(log_and_verbosity.verbosity, 3);
            }
            cmd => panic!("Parsed the wrong subcommand: {cmd:?}"),
        }

        assert!(Arguments::try_parse_from(["hapscan", "hapcount-scan", "chr1.vcf", "-w", "10"]).is_err());
        assert!(Arguments::try_parse_from(["hapscan", "hapcount-scan"]).is_err());
    }
}
