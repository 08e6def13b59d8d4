use std::{
    collections::BTreeMap,
    fmt::Display,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use similar::TextDiff;

use crate::{
    dataset::{create_file, open_file},
    errors::Result,
};

/// Label-wise performance values.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /** Number of occurrences of the label in the reference data. */
    pub num_observation: usize,
    /** Number of predictions. */
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl LabelMeasure {
    fn finish(&mut self) {
        self.precision = 0.0;
        self.recall = 0.0;
        self.fmeasure = 0.0;
        if self.num_prediction > 0 {
            self.precision = self.num_correct as f64 / self.num_prediction as f64;
        }
        if self.num_observation > 0 {
            self.recall = self.num_correct as f64 / self.num_observation as f64;
        }
        if self.precision + self.recall > 0.0 {
            self.fmeasure = self.precision * self.recall * 2.0 / (self.precision + self.recall);
        }
    }
}

/// A line where candidate and reference differ. `None` marks a line past
/// the end of the shorter file.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// 1-based line number.
    pub line: usize,
    pub candidate: Option<String>,
    pub reference: Option<String>,
}

/// Line-aligned comparison of a tagged candidate file against a reference.
#[derive(Debug, Default)]
pub struct Evaluation {
    /** Label-wise evaluations, over `word<TAB>tag` line pairs. */
    tbl: BTreeMap<String, LabelMeasure>,
    /** Number of identical lines. */
    num_equal: usize,
    num_candidate: usize,
    num_reference: usize,
    mismatches: Vec<Mismatch>,
    /** Both files, kept for the unified diff. */
    candidate: Vec<String>,
    reference: Vec<String>,
    /** File names printed in the diff header. */
    candidate_name: String,
    reference_name: String,

    /** Macro-averaged precision. */
    macro_precision: f64,
    /** Macro-averaged recall. */
    macro_recall: f64,
    /** Macro-averaged F1 score. */
    macro_fmeasure: f64,
}

fn tag_of(line: &str) -> Option<&str> {
    line.split_once('\t').map(|(_, tag)| tag)
}

impl Evaluation {
    pub fn compare<C: BufRead, R: BufRead>(candidate: C, reference: R) -> Result<Self> {
        let candidate = candidate.lines().collect::<std::io::Result<Vec<_>>>()?;
        let reference = reference.lines().collect::<std::io::Result<Vec<_>>>()?;
        let mut eval = Evaluation {
            num_candidate: candidate.len(),
            num_reference: reference.len(),
            candidate_name: "candidate".to_string(),
            reference_name: "reference".to_string(),
            ..Default::default()
        };
        if candidate.len() != reference.len() {
            log::warn!(
                "candidate has {} lines but reference has {}",
                candidate.len(),
                reference.len()
            );
        }

        for i in 0..candidate.len().max(reference.len()) {
            let c = candidate.get(i).map(|s| s.trim_end());
            let r = reference.get(i).map(|s| s.trim_end());
            if let (Some(c), Some(r)) = (c, r) {
                eval.accumulate(c, r);
                if c == r {
                    eval.num_equal += 1;
                    continue;
                }
            }
            eval.mismatches.push(Mismatch {
                line: i + 1,
                candidate: c.map(String::from),
                reference: r.map(String::from),
            });
        }
        eval.evaluate();
        eval.candidate = candidate;
        eval.reference = reference;
        Ok(eval)
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(candidate: P, reference: Q) -> Result<Self> {
        let c = BufReader::new(open_file(candidate.as_ref())?);
        let r = BufReader::new(open_file(reference.as_ref())?);
        let mut eval = Self::compare(c, r)?;
        eval.candidate_name = candidate.as_ref().display().to_string();
        eval.reference_name = reference.as_ref().display().to_string();
        Ok(eval)
    }

    fn accumulate(&mut self, candidate: &str, reference: &str) {
        let (Some(p), Some(r)) = (tag_of(candidate), tag_of(reference)) else {
            return;
        };
        self.tbl.entry(r.to_string()).or_default().num_observation += 1;
        self.tbl.entry(p.to_string()).or_default().num_prediction += 1;
        if p == r {
            self.tbl.entry(r.to_string()).or_default().num_correct += 1;
        }
    }

    fn evaluate(&mut self) {
        let mut num_labels = 0;
        for lev in self.tbl.values_mut() {
            lev.finish();
            if lev.num_observation == 0 {
                continue;
            }
            num_labels += 1;
            self.macro_precision += lev.precision;
            self.macro_recall += lev.recall;
            self.macro_fmeasure += lev.fmeasure;
        }
        if num_labels > 0 {
            self.macro_precision /= num_labels as f64;
            self.macro_recall /= num_labels as f64;
            self.macro_fmeasure /= num_labels as f64;
        }
    }

    /// Percentage of candidate lines identical to their reference line.
    pub fn accuracy(&self) -> f64 {
        if self.num_candidate == 0 {
            return 0.0;
        }
        self.num_equal as f64 / self.num_candidate as f64 * 100.0
    }

    pub fn num_equal(&self) -> usize {
        self.num_equal
    }

    pub fn num_candidate(&self) -> usize {
        self.num_candidate
    }

    pub fn num_reference(&self) -> usize {
        self.num_reference
    }

    pub fn label(&self, tag: &str) -> Option<&LabelMeasure> {
        self.tbl.get(tag)
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Writes a unified diff from the candidate to the reference.
    ///
    /// Nothing is written when both files are identical.
    pub fn write_diff<W: Write>(&self, mut writer: W) -> Result<()> {
        let candidate = joined(&self.candidate);
        let reference = joined(&self.reference);
        let diff = TextDiff::from_lines(&candidate, &reference);
        write!(
            writer,
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header(&self.candidate_name, &self.reference_name)
        )?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_diff<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = create_file(path.as_ref())?;
        self.write_diff(std::io::BufWriter::new(f))?;
        log::info!(
            "write diff ({} differing lines) to {}",
            self.mismatches.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

fn joined(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in &self.tbl {
            if lev.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    label, lev.num_correct, lev.num_prediction, lev.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label,
                    lev.num_correct,
                    lev.num_prediction,
                    lev.num_observation,
                    lev.precision,
                    lev.recall,
                    lev.fmeasure
                )?;
            }
        }
        writeln!(
            f,
            "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})",
            self.macro_precision, self.macro_recall, self.macro_fmeasure
        )?;
        write!(
            f,
            "Accuracy: {}/{} => {:.2}%",
            self.num_equal,
            self.num_candidate,
            self.accuracy()
        )
    }
}
