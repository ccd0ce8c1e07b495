use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use color_eyre::{
    eyre::{eyre, OptionExt, WrapErr},
    Result,
};
use itertools::Itertools;
use rayon::prelude::*;

use crate::branch_stats::BranchStats;
use crate::emitter::{BranchStatsRow, WindowEmitter};
use crate::error::Error;
use crate::io::{open_csv_writer, push_to_output, FileType};
use crate::merge_tree::MergeTree;

/// A merge tree file `win{idx}_windowsize{size}_from_{start}_to_{end}_{name}.npy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: PathBuf,
    pub window: usize,
    pub start: u64,
    pub end: u64,
}

impl TreeFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let invalid = || Error::TreeFileName {
            path: path.to_path_buf(),
        };

        let name = path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_eyre(invalid())?;
        let fields = name.split('_').collect::<Vec<&str>>();

        let window = fields
            .first()
            .and_then(|f| f.strip_prefix("win"))
            .and_then(|idx| idx.parse::<usize>().ok())
            .ok_or_eyre(invalid())?;

        let value_after = |key: &str| -> Option<u64> {
            fields
                .iter()
                .tuple_windows()
                .find(|(k, _)| **k == key)
                .and_then(|(_, v)| v.parse::<u64>().ok())
        };

        let (Some(start), Some(end)) = (value_after("from"), value_after("to")) else {
            return Err(eyre!(invalid()));
        };

        Ok(Self {
            path: path.to_path_buf(),
            window,
            start,
            end,
        })
    }

    pub fn midpoint(&self) -> u64 {
        (self.start + self.end) / 2
    }
}

/// Merge tree files of a directory ordered by window index
pub fn read_tree_dir(dir: &Path) -> Result<Vec<TreeFile>> {
    let mut trees = vec![];

    for entry in std::fs::read_dir(dir).wrap_err(Error::Io {
        path: dir.to_path_buf(),
    })? {
        let path = entry?.path();

        match FileType::from_path(&path) {
            Ok(FileType::NPY) => trees.push(TreeFile::from_path(&path)?),
            _ => tracing::debug!("Skipping {path:?}"),
        }
    }

    trees.sort_by_key(|t| t.window);

    if let Some(window) = trees.iter().map(|t| t.window).duplicates().next() {
        return Err(eyre!("Multiple merge trees for window {window} in {dir:?}"));
    }

    Ok(trees)
}

#[doc(hidden)]
pub fn run(trees: PathBuf, mut output: PathBuf, prefix: Option<String>) -> Result<()> {
    let files = read_tree_dir(&trees)?;
    tracing::info!("Found {} merge trees in {trees:?}", files.len());

    let rows = files
        .par_iter()
        .map(|file| -> Result<BranchStatsRow> {
            let tree = MergeTree::read_npy(&file.path)
                .wrap_err_with(|| format!("Failed to read a merge tree from {:?}", file.path))?;

            Ok(BranchStatsRow {
                window: file.window,
                pos: file.midpoint(),
                stats: BranchStats::from_tree(&tree),
            })
        })
        .collect::<Result<Vec<BranchStatsRow>>>()?;

    let name = trees
        .file_name()
        .and_then(OsStr::to_str)
        .map(|dir| format!("LongestAvg_branch_lengths_{dir}"))
        .unwrap_or_else(|| "LongestAvg_branch_lengths".to_string());
    push_to_output(&prefix, &mut output, &name, "csv");

    let mut emitter = WindowEmitter::new(open_csv_writer(output.clone())?, &BranchStatsRow::HEADER)?;
    for row in &rows {
        emitter.emit(row)?;
    }
    let nrows = emitter.finish()?;

    tracing::info!("Wrote branch statistics of {nrows} windows to {output:?}");
    Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_tree_file_name() {
        let file = TreeFile::from_path(Path::new("trees/win12_windowsize100_from_1001_to_2000_phased_chr17.npy")).unwrap();
        assert_eq!(file.window, 12);
        assert_eq!((file.start, file.end), (1001, 2000));
        assert_eq!(file.midpoint(), 1500);

        let err = TreeFile::from_path(Path::new("trees/tree12_from_1_to_2.npy")).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::TreeFileName { .. })));
        assert!(TreeFile::from_path(Path::new("trees/win1_windowsize100_from_1.npy")).is_err());
    }
}
