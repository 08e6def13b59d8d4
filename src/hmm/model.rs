use std::{
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{
    smoother::{self, SmoothOpt},
    table::{EmissionTable, ProbTable, TransitionTable},
    tagger::Tagger,
};
use crate::{
    dataset::{create_file, open_file},
    errors::{Error, Result},
};

/// A trained bigram HMM: tag transitions and tag-conditioned emissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HmmModel {
    pub transitions: TransitionTable,
    pub emissions: EmissionTable,
}

impl HmmModel {
    pub fn new(transitions: TransitionTable, emissions: EmissionTable) -> Self {
        Self {
            transitions,
            emissions,
        }
    }

    /// Returns a decoder borrowing this model.
    pub fn tagger(&self) -> Tagger<'_> {
        Tagger::new(self)
    }

    /// Backfills missing shape buckets. Must run before any tagger is built.
    pub fn smooth(&mut self, opt: &SmoothOpt) {
        smoother::smooth(&mut self.emissions, opt);
    }

    /// Loads a model persisted as a pair of tab-separated tables.
    pub fn from_tables<P: AsRef<Path>, Q: AsRef<Path>>(transitions: P, emissions: Q) -> Result<Self> {
        Ok(Self::new(
            TransitionTable::from_path(transitions)?,
            EmissionTable::from_path(emissions)?,
        ))
    }

    pub fn save_tables<P: AsRef<Path>, Q: AsRef<Path>>(&self, transitions: P, emissions: Q) -> Result<()> {
        self.transitions.save(transitions)?;
        self.emissions.save(emissions)
    }

    /// Loads a model written by [`save_json`](Self::save_json).
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = open_file(path.as_ref())?;
        let model: Self = serde_json::from_reader(BufReader::new(f))?;
        log::info!(
            "loaded model from {} ({} transitions, {} emissions)",
            path.as_ref().display(),
            model.transitions.len(),
            model.emissions.len()
        );
        Ok(model)
    }

    /// Writes the model as JSON.
    ///
    /// JSON has no spelling for infinities or NaN, so a table holding one is
    /// rejected before the file is created. Use [`save_tables`](Self::save_tables)
    /// for such models.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        check_finite("transitions", &self.transitions)?;
        check_finite("emissions", &self.emissions)?;
        let f = create_file(path.as_ref())?;
        let mut writer = BufWriter::new(f);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        log::info!("write model to {}", path.as_ref().display());
        Ok(())
    }
}

fn check_finite(name: &str, table: &ProbTable) -> Result<()> {
    for (outer, row) in table.rows() {
        for (inner, lp) in row {
            if !lp.is_finite() {
                return Err(Error::invalid_parameter(
                    name,
                    format!("{outer} -> {inner} is {lp}, which JSON cannot store"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rejects_infinite_log_prob() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let mut model = HmmModel::default();
        model.transitions.insert("START", "ART", 0.0);
        model.emissions.insert("ART", "Der", f64::NEG_INFINITY);
        match model.save_json(&path) {
            Err(Error::InvalidParameter { name, msg }) => {
                assert_eq!(name, "emissions");
                assert!(msg.contains("ART -> Der"), "{msg}");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!path.exists());

        model.emissions.insert("ART", "Der", 0.0);
        model.save_json(&path).unwrap();
        assert_eq!(HmmModel::from_json(&path).unwrap(), model);
    }
}
