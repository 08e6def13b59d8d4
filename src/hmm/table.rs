use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    dataset::{create_file, open_file},
    errors::{Error, Result},
};

/// Two-level table of log-probabilities: outer key -> inner key -> ln p.
///
/// A missing entry stands for probability zero, i.e. ln p = -inf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbTable {
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

/// `TransitionTable[previous tag][next tag]`.
pub type TransitionTable = ProbTable;

/// `EmissionTable[tag][word or pseudo-word]`.
pub type EmissionTable = ProbTable;

impl ProbTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<O: Into<String>, I: Into<String>>(&mut self, outer: O, inner: I, log_prob: f64) {
        self.rows
            .entry(outer.into())
            .or_default()
            .insert(inner.into(), log_prob);
    }

    #[inline]
    pub fn get(&self, outer: &str, inner: &str) -> Option<f64> {
        self.rows.get(outer)?.get(inner).copied()
    }

    /// Like [`get`](Self::get) but reads a missing entry as -inf.
    #[inline]
    pub fn log_prob(&self, outer: &str, inner: &str) -> f64 {
        self.get(outer, inner).unwrap_or(f64::NEG_INFINITY)
    }

    pub fn row(&self, outer: &str) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(outer)
    }

    pub(crate) fn row_mut(&mut self, outer: &str) -> Option<&mut BTreeMap<String, f64>> {
        self.rows.get_mut(outer)
    }

    pub fn rows(&self) -> btree_map::Iter<'_, String, BTreeMap<String, f64>> {
        self.rows.iter()
    }

    pub fn outer_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Every inner key of every row.
    pub fn inner_keys(&self) -> BTreeSet<&str> {
        self.rows
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Total probability mass of a row, in probability space.
    pub fn row_mass(&self, outer: &str) -> Option<f64> {
        self.rows
            .get(outer)
            .map(|row| row.values().map(|lp| lp.exp()).sum())
    }

    /// Number of entries over all rows.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `logprob<TAB>outer<TAB>inner` lines; blank lines are skipped.
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                return Err(Error::invalid_format(
                    i + 1,
                    format!("expected 3 tab-separated fields, got {}", fields.len()),
                ));
            }
            let log_prob: f64 = fields[0].parse().map_err(|_| {
                Error::invalid_format(i + 1, format!("not a probability: {:?}", fields[0]))
            })?;
            table.insert(fields[1], fields[2], log_prob);
        }
        Ok(table)
    }

    /// Writes one `logprob<TAB>outer<TAB>inner` line per entry.
    ///
    /// Floats use the shortest representation that parses back to the same
    /// bits, so [`read`](Self::read) restores the table exactly.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for (outer, row) in &self.rows {
            for (inner, log_prob) in row {
                writeln!(writer, "{log_prob}\t{outer}\t{inner}")?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = open_file(path)?;
        let table = Self::read(BufReader::new(f))?;
        log::info!("read {} entries from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let f = create_file(path)?;
        self.write(BufWriter::new(f))?;
        log::info!("wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProbTable {
        let mut t = ProbTable::new();
        t.insert("START", "ART", (2.0f64 / 3.0).ln());
        t.insert("START", "PPER", (1.0f64 / 3.0).ln());
        t.insert("ART", "NN", 0.0);
        t
    }

    #[test]
    fn lookups() {
        let t = sample();
        assert_eq!(t.get("ART", "NN"), Some(0.0));
        assert_eq!(t.get("ART", "VVFIN"), None);
        assert_eq!(t.get("NN", "ART"), None);
        assert_eq!(t.log_prob("NN", "ART"), f64::NEG_INFINITY);
        assert_eq!(t.len(), 3);
        assert_eq!(t.outer_keys().collect::<Vec<_>>(), vec!["ART", "START"]);
        assert_eq!(
            t.inner_keys().into_iter().collect::<Vec<_>>(),
            vec!["ART", "NN", "PPER"]
        );
    }

    #[test]
    fn row_mass() {
        let t = sample();
        assert!((t.row_mass("START").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(t.row_mass("VVFIN"), None);
    }

    #[test]
    fn write_then_read_is_exact() {
        let mut t = sample();
        t.insert("NN", "$.", 0.1f64.ln());
        t.insert("NN", "Straße", -1e-300);
        let mut buf = Vec::new();
        t.write(&mut buf).unwrap();
        let back = ProbTable::read(buf.as_slice()).unwrap();
        assert_eq!(back, t);
        for (outer, row) in t.rows() {
            for (inner, lp) in row {
                assert_eq!(back.get(outer, inner).unwrap().to_bits(), lp.to_bits());
            }
        }
    }

    #[test]
    fn reads_foreign_float_spellings() {
        let text = "-0.6931471805599453\tSTART\tART\n0.0\tART\tNN\n\n-inf\tNN\tX\n";
        let t = ProbTable::read(text.as_bytes()).unwrap();
        assert_eq!(t.get("ART", "NN"), Some(0.0));
        assert_eq!(t.get("NN", "X"), Some(f64::NEG_INFINITY));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let text = "0.0\tART\tNN\n-1.0\tART\n";
        match ProbTable::read(text.as_bytes()) {
            Err(Error::InvalidFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_probability() {
        let text = "abc\tART\tNN\n";
        match ProbTable::read(text.as_bytes()) {
            Err(Error::InvalidFormat { line, msg }) => {
                assert_eq!(line, 1);
                assert!(msg.contains("abc"), "{msg}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
