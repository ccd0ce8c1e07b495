use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::error::Error;

//NOTE: This should be parsed by clap automatically, but Option<String> parsing is not supported out of the box as of now
pub fn strip_prefix(prefix: Option<String>) -> Option<String> {
    if let Some(prefix) = prefix {
        match prefix.as_ref() {
            "" => None,
            "\\0" => None,
            v => Some(v.to_string()),
        }
    } else {
        None
    }
}

// Window configs are in the format [size]:[step]
pub fn parse_window(value: &str) -> Result<(u64, u64)> {
    let mut split = value.split(':');

    match (split.next(), split.next(), split.next()) {
        (Some(size), Some(step), None) => {
            let size = size
                .parse::<u64>()
                .wrap_err(eyre!("Window size {size:?} is not an integer in {value}"))?;
            let step = step
                .parse::<u64>()
                .wrap_err(eyre!("Window step {step:?} is not an integer in {value}"))?;
            Ok((size, step))
        }
        _ => Err(eyre!(Error::WindowConfig {
            msg: format!("{value:?} is not in the format SIZE:STEP"),
        })),
    }
}
