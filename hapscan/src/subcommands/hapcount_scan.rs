use color_eyre::Result;

use crate::args::ScanArgs;
use crate::emitter::{HapcountRow, WindowEmitter};
use crate::hapcount::HapCount;
use crate::io::open_csv_writer;
use crate::matrix::HaplotypeMatrix;
use crate::read_vcf::VcfReader;
use crate::subcommands::{build_tasks, run_tasks, ScanTask, TaskSummary};

#[doc(hidden)]
pub fn run(args: ScanArgs) -> Result<()> {
    let tasks = build_tasks(&args)?;
    run_tasks(&tasks, |task| scan(task, &args))?;
    Ok(())
}

pub fn scan(task: &ScanTask, args: &ScanArgs) -> Result<TaskSummary> {
    let output = task.output(args, "hap_counts");
    tracing::info!("Counting haplotypes of {:?} in windows of {}", task.file, task.config.label());

    let reader = VcfReader::from_path(&task.file)?;
    let mut emitter = WindowEmitter::new(open_csv_writer(output.clone())?, &HapcountRow::HEADER)?;
    let mut empty = 0;

    for window in task.config.windows(reader) {
        let window = window?;

        // Empty windows report zero haplotypes out of zero
        let count = match window.is_empty() {
            true => {
                empty += 1;
                HapCount::default()
            }
            false => HapCount::from_matrix(&HaplotypeMatrix::from_window(&window)?),
        };

        emitter.emit(&HapcountRow::new(&window, count))?;
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
