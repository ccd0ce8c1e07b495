use color_eyre::{eyre::eyre, Result};
use statrs::statistics::Statistics;

use crate::args::{ScanArgs, WindowUnit};
use crate::emitter::{HetRow, WindowEmitter};
use crate::error::Error;
use crate::io::open_csv_writer;
use crate::read_vcf::VcfReader;
use crate::subcommands::{build_tasks, run_tasks, ScanTask, TaskSummary};
use crate::windows::Window;

#[doc(hidden)]
pub fn run(args: ScanArgs) -> Result<()> {
    if args.unit != WindowUnit::Snp {
        return Err(eyre!(Error::WindowConfig {
            msg: "heterozygosity is scanned in windows of a fixed number of variants (--unit snp)"
                .to_string(),
        }));
    }

    let tasks = build_tasks(&args)?;
    run_tasks(&tasks, |task| scan(task, &args))?;
    Ok(())
}

/// Heterozygous sites per basepair for every sample of a window
pub fn heterozygosity(window: &Window) -> Result<Vec<f64>> {
    let (Some(first), Some(last)) = (window.records.first(), window.records.last()) else {
        return Ok(vec![]);
    };

    let length = (last.position - first.position + 1) as f64;
    let mut hets = vec![0usize; first.nsamples()];

    for record in &window.records {
        if record.nsamples() != hets.len() {
            return Err(eyre!(Error::Shape {
                pos: record.position,
                expected: hets.len(),
                found: record.nsamples(),
            }));
        }

        for (count, gt) in hets.iter_mut().zip(record.genotypes.iter()) {
            if gt.is_het() {
                *count += 1;
            }
        }
    }

    Ok(hets.into_iter().map(|n| n as f64 / length).collect())
}

/// Geometric mean of the positive values, 0 if there are none
pub fn positive_geometric_mean(values: &[f64]) -> f64 {
    let positive = values.iter().copied().filter(|v| *v > 0.0).collect::<Vec<f64>>();

    match positive.is_empty() {
        true => 0.0,
        false => positive.geometric_mean(),
    }
}

/// Power mean with exponent `p`
pub fn power_mean(values: &[f64], p: f64) -> f64 {
    match values.is_empty() {
        true => 0.0,
        false => values.iter().map(|v| v.powf(p)).mean().powf(1.0 / p),
    }
}

pub fn scan(task: &ScanTask, args: &ScanArgs) -> Result<TaskSummary> {
    let output = task.output(args, "heterozygosity");
    tracing::info!("Heterozygosity of {:?} in windows of {}", task.file, task.config.label());

    let reader = VcfReader::from_path(&task.file)?;
    let header = HetRow::header(reader.samples());
    let mut emitter = WindowEmitter::new(open_csv_writer(output.clone())?, &header)?;

    for window in task.config.windows(reader) {
        let window = window?;
        let heterozygosity = heterozygosity(&window)?;

        let row = HetRow {
            contig: window.contig.clone(),
            pos: (window.start + window.end - 1) / 2,
            geometric_mean: positive_geometric_mean(&heterozygosity),
            p10_mean: power_mean(&heterozygosity, 10.0),
            heterozygosity,
        };

        emitter.emit(&row)?;
    }

    let windows = emitter.finish()?;

    Ok(TaskSummary {
        file: task.file.clone(),
        label: task.config.label(),
        output,
        windows,
        empty: 0,
    })
}
