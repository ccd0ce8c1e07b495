use std::path::PathBuf;

use color_eyre::Result;

use crate::args::ScanArgs;
use crate::branch_stats::BranchStats;
use crate::cluster::average_linkage;
use crate::emitter::{UpgmaRow, WindowEmitter};
use crate::io::{create_dir, open_csv_writer, push_to_output};
use crate::matrix::HaplotypeMatrix;
use crate::read_vcf::VcfReader;
use crate::subcommands::{build_tasks, run_tasks, ScanTask, TaskSummary};
use crate::windows::Window;

#[doc(hidden)]
pub fn run(args: ScanArgs, dump_trees: bool) -> Result<()> {
    let tasks = build_tasks(&args)?;

    if dump_trees {
        for task in &tasks {
            create_dir(&tree_dir(&args, task))?;
        }
    }

    run_tasks(&tasks, |task| scan(task, &args, dump_trees))?;

    Ok(())
}

/// Directory of the merge trees of one task, i.e. `results/trees/chr17_SNPwindow100_SNPstep100`
pub fn tree_dir(args: &ScanArgs, task: &ScanTask) -> PathBuf {
    let mut output = args.output.join("trees");
    match crate::utils::strip_prefix(args.prefix.clone()) {
        Some(prefix) => output.push(format!("{prefix}_{}", task.name())),
        None => output.push(task.name()),
    }
    output
}

pub fn tree_file(args: &ScanArgs, task: &ScanTask, idx: usize, window: &Window) -> PathBuf {
    let mut output = tree_dir(args, task);
    let name = format!(
        "win{idx}_windowsize{}_from_{}_to_{}_{}",
        task.config.size, window.start, window.end, task.stem
    );
    push_to_output(&None, &mut output, &name, "npy");
    output
}

pub fn scan(task: &ScanTask, args: &ScanArgs, dump_trees: bool) -> Result<TaskSummary> {
    let output = task.output(args, "avg_branch_len");
    tracing::info!("Clustering {:?} in windows of {}", task.file, task.config.label());

    let reader = VcfReader::from_path(&task.file)?;
    let writer = open_csv_writer(output.clone())?;
    let mut emitter = WindowEmitter::new(writer, &UpgmaRow::HEADER)?;
    let mut empty = 0;

    for (idx, window) in task.config.windows(reader).enumerate() {
        let window = window?;

        let stats = match window.is_empty() {
            true => {
                empty += 1;
                BranchStats::default()
            }
            false => {
                let matrix = HaplotypeMatrix::from_window(&window)?;
                let tree = average_linkage(&matrix)?;

                if dump_trees {
                    tree.write_npy(&tree_file(args, task, idx, &window))?;
                }

                BranchStats::from_tree(&tree)
            }
        };

        tracing::debug!(
            "{} window {idx} [{}, {}]: {} sites, tree height {}",
            task.name(),
            window.start,
            window.end,
            window.nsites(),
            stats.tree_height
        );

        emitter.emit(&UpgmaRow::new(&window, stats))?;
    }

    let windows = emitter.finish()?;

    Ok(TaskSummary {
        file: task.file.clone(),
        label: task.config.label(),
        output,
        windows,
        empty,
    })
}
