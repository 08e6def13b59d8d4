use std::{io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    dataset::open_file,
    errors::{Error, Result},
    hmm::{smoother::SmoothOpt, trainer::TrainOpt},
};

/// Training and smoothing parameters, loadable from a JSON file.
///
/// ```json
/// { "train": { "denoising": true }, "smooth": { "blocked_tags": ["ART", "$."] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub train: TrainOpt,
    pub smooth: SmoothOpt,
}

impl Options {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = open_file(path.as_ref())?;
        let opts = serde_json::from_reader(BufReader::new(f))?;
        log::info!("read options from {}", path.as_ref().display());
        Ok(opts)
    }

    /// Applies a dotted parameter such as `train.denoising=1`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name.split_once('.') {
            Some(("train", key)) => self.train.set(key, value),
            Some(("smooth", key)) => self.smooth.set(key, value),
            _ => Err(Error::invalid_parameter(
                name,
                "expected train.<name> or smooth.<name>",
            )),
        }
    }

    /// Applies a `name=value` string.
    pub fn apply(&mut self, param: &str) -> Result<()> {
        match param.split_once('=') {
            Some((name, value)) => self.set(name.trim(), value.trim()),
            None => Err(Error::invalid_parameter(param, "expected name=value")),
        }
    }
}
