use std::path::PathBuf;

use color_eyre::{
    eyre::{ensure, eyre, WrapErr},
    Result,
};
use itertools::Itertools;
use rayon::prelude::*;

use crate::args::ScanArgs;
use crate::io::{push_to_output, vcf_stem};
use crate::windows::WindowConfig;

/// Average linkage clustering scan
pub mod upgma_scan;

/// Distinct haplotype count scan
pub mod hapcount_scan;

/// Individual level heterozygosity scan
pub mod het_scan;

/// Branch statistics from merge trees saved by the clustering scan
pub mod branch_stats;

/// One input file scanned with one window configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTask {
    pub file: PathBuf,
    pub stem: String,
    pub config: WindowConfig,
}

impl ScanTask {
    /// Task specific name, i.e. `chr17_SNPwindow1000_SNPstep100`
    pub fn name(&self) -> String {
        format!("{}_{}", self.stem, self.config.label())
    }

    pub fn output(&self, args: &ScanArgs, metric: &str) -> PathBuf {
        let mut output = args.output.clone();
        push_to_output(
            &args.prefix,
            &mut output,
            &format!("{}_{metric}", self.name()),
            "csv",
        );
        output
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub file: PathBuf,
    pub label: String,
    pub output: PathBuf,
    pub windows: usize,
    pub empty: usize,
}

/// Every input file paired with every window configuration
pub fn build_tasks(args: &ScanArgs) -> Result<Vec<ScanTask>> {
    ensure!(!args.files.is_empty(), "No input files given");
    ensure!(!args.windows.is_empty(), "No window configurations given");

    let configs = args
        .windows
        .iter()
        .map(|(size, step)| WindowConfig::new(args.unit, *size, *step, args.start))
        .collect::<Result<Vec<WindowConfig>>>()?
        .into_iter()
        .unique()
        .collect_vec();

    // Outputs are named by the file stem, so equal stems would overwrite each other
    if let Some(stem) = args.files.iter().map(|f| vcf_stem(f)).duplicates().next() {
        return Err(eyre!(
            "Multiple input files are named {stem}, their outputs would overwrite each other"
        ));
    }

    let tasks = args
        .files
        .iter()
        .cartesian_product(configs.iter())
        .map(|(file, config)| ScanTask {
            file: file.clone(),
            stem: vcf_stem(file),
            config: *config,
        })
        .collect();

    Ok(tasks)
}

/// Run the tasks on the global thread pool. The first failing task fails the whole scan.
pub fn run_tasks<F>(tasks: &[ScanTask], scan: F) -> Result<Vec<TaskSummary>>
where
    F: Fn(&ScanTask) -> Result<TaskSummary> + Sync + Send,
{
    tracing::info!("Running {} scan tasks", tasks.len());

    let mut summaries = tasks
        .par_iter()
        .map(|task| {
            scan(task).wrap_err_with(|| {
                format!("Scanning {:?} with {} failed", task.file, task.config.label())
            })
        })
        .collect::<Result<Vec<TaskSummary>>>()?;

    summaries.sort_by(|a, b| {
        alphanumeric_sort::compare_path(&a.file, &b.file)
            .then_with(|| alphanumeric_sort::compare_str(&a.label, &b.label))
    });

    for summary in &summaries {
        tracing::info!(
            "{:?} {}: {} windows ({} empty) written to {:?}",
            summary.file,
            summary.label,
            summary.windows,
            summary.empty,
            summary.output
        );
    }

    Ok(summaries)
}
