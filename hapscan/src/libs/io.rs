use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, OptionExt, WrapErr};
use color_eyre::Result;
use csv::{Writer, WriterBuilder};

use crate::error::Error;
use crate::utils::strip_prefix;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    VCF,
    NPY,
}

impl FileType {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension: &str = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_eyre(Error::NoFileType {
                path: path.to_path_buf(),
            })?;

        let ext = match extension {
            "gz" | "bgz" => return_double_extension_filetype(path, extension)?,
            _ => extension.to_string(),
        };

        Ok(match ext.as_str() {
            "vcf.gz" | "vcf.bgz" | "vcf" => Self::VCF,
            "npy" => Self::NPY,
            _ => return Err(eyre!(Error::FileNotSupported { ext })),
        })
    }
}

pub fn return_double_extension_filetype(path: &Path, e1: &str) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_eyre(Error::NoFileType {
            path: path.to_path_buf(),
        })?;

    let e2 = Path::new(&stem)
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_eyre(Error::FileNotSupported {
            ext: format!("{path:?}"),
        })?;

    Ok(format!("{e2}.{e1}"))
}

/// File name without the VCF extensions, i.e. `chr17` from `/data/chr17.vcf.gz`
pub fn vcf_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("stdin");

    [".vcf.gz", ".vcf.bgz", ".vcf"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
        .to_string()
}

pub fn push_to_output(prefix: &Option<String>, output: &mut PathBuf, name: &str, suffix: &str) {
    match strip_prefix(prefix.clone()) {
        Some(prefix) => output.push(format!("{prefix}_{name}.{suffix}")),
        None => output.push(format!("{name}.{suffix}")),
    }
}

pub fn create_dir(output: &Path) -> Result<()> {
    if let Err(e) = std::fs::create_dir_all(output) {
        match e.kind() {
            io::ErrorKind::AlreadyExists => (),
            _ => return Err(eyre!("Error creating directory {output:?}")),
        }
    }
    Ok(())
}

pub fn get_csv_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_writer(output)
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            Some(name) => {
                let (reader, _format) = niffler::from_path(name)
                    .map_err(|err| eyre!("Failed to open {name:?}: {err}"))?;
                Box::new(reader)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

pub fn get_output(filename: Option<PathBuf>) -> Result<Box<dyn io::Write>> {
    let output: Box<dyn io::Write> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdout()),
            Some(path) => Box::new(
                std::fs::File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .wrap_err(Error::Io {
                        path: PathBuf::from(path),
                    })?,
            ),
            None => return Err(eyre!("Output path {name:?} is not valid UTF-8")),
        },
        None => Box::new(io::stdout()),
    };
    Ok(output)
}

pub fn open_csv_writer(name: PathBuf) -> Result<Writer<Box<dyn io::Write>>> {
    Ok(get_csv_writer(get_output(Some(name))?))
}
