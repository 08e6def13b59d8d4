use std::{collections::HashMap, time::Instant};

use serde::{Deserialize, Serialize};

use super::{
    classify::{self, BOUNDARY_MARKER},
    model::HmmModel,
    table::{EmissionTable, TransitionTable},
    START,
};
use crate::{
    dataset::{Dataset, TaggedSentence},
    errors::{parse_flag, Error, Result},
};

/// Count proxy that lets numbers, links and truncations through but skips
/// the shape buckets.
const FREQUENT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOpt {
    /// File numbers, truncations and links under CARD, TRUNC and XY.
    pub denoising: bool,
    /// Fold (word, tag) pairs seen at most once into shape buckets.
    pub fold_rare_words: bool,
}

impl Default for TrainOpt {
    fn default() -> Self {
        Self {
            denoising: false,
            fold_rare_words: true,
        }
    }
}

impl TrainOpt {
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "denoising" => self.denoising = parse_flag(name, value)?,
            "fold_rare_words" => self.fold_rare_words = parse_flag(name, value)?,
            _ => return Err(Error::invalid_parameter(name, "unknown training parameter")),
        }
        Ok(())
    }
}

/// Accumulates counts sentence by sentence and estimates the model.
#[derive(Debug, Default)]
pub struct Trainer {
    opt: TrainOpt,
    /// (word, tag) occurrences; sentence-initial words carry the marker.
    pairs: HashMap<(String, String), usize>,
    unigrams: HashMap<String, usize>,
    bigrams: HashMap<(String, String), usize>,
    num_sentences: usize,
}

impl Trainer {
    pub fn new(opt: TrainOpt) -> Self {
        Self {
            opt,
            ..Default::default()
        }
    }

    pub fn opt(&self) -> &TrainOpt {
        &self.opt
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    /// Counts one sentence. The previous tag restarts at `START`.
    pub fn append(&mut self, seq: &TaggedSentence) {
        if seq.is_empty() {
            return;
        }
        let mut prev: &str = START;
        for (t, (word, tag)) in seq.iter().enumerate() {
            *self.unigrams.entry(tag.to_string()).or_default() += 1;

            let key = if t == 0 {
                *self.unigrams.entry(START.to_string()).or_default() += 1;
                format!("{BOUNDARY_MARKER}{word}")
            } else {
                word.to_string()
            };

            *self
                .bigrams
                .entry((prev.to_string(), tag.to_string()))
                .or_default() += 1;
            *self.pairs.entry((key, tag.to_string())).or_default() += 1;
            prev = tag;
        }
        self.num_sentences += 1;
    }

    /// Replaces rare words, numbers, links and truncations by their buckets.
    ///
    /// Counts are added up exactly, so every tag keeps its total mass.
    fn fold(&self) -> HashMap<(String, String), usize> {
        let mut folded: HashMap<(String, String), usize> = HashMap::with_capacity(self.pairs.len());
        let mut num_folded = 0;
        for ((word, tag), &count) in &self.pairs {
            let proxy = if self.opt.fold_rare_words { count } else { FREQUENT };
            let key = match classify::classify(word, proxy, Some(tag.as_str()), self.opt.denoising) {
                Some((bucket, new_tag)) => {
                    num_folded += 1;
                    (bucket.name(), new_tag.unwrap_or(tag.as_str()).to_string())
                }
                None => (word.clone(), tag.clone()),
            };
            *folded.entry(key).or_default() += count;
        }
        log::debug!(
            "folded {} of {} (word, tag) pairs into pseudo-words",
            num_folded,
            self.pairs.len()
        );
        folded
    }

    fn transitions(&self) -> TransitionTable {
        let mut outgoing: HashMap<&str, usize> = HashMap::new();
        for ((prev, _), &count) in &self.bigrams {
            *outgoing.entry(prev.as_str()).or_default() += count;
        }
        let mut table = TransitionTable::new();
        for ((prev, next), &count) in &self.bigrams {
            let total = outgoing[prev.as_str()];
            table.insert(prev.as_str(), next.as_str(), (count as f64 / total as f64).ln());
        }
        table
    }

    fn emissions(folded: &HashMap<(String, String), usize>) -> EmissionTable {
        let mut per_tag: HashMap<&str, usize> = HashMap::new();
        for ((_, tag), &count) in folded {
            *per_tag.entry(tag.as_str()).or_default() += count;
        }
        let mut table = EmissionTable::new();
        for ((word, tag), &count) in folded {
            let total = per_tag[tag.as_str()];
            table.insert(tag.as_str(), word.as_str(), (count as f64 / total as f64).ln());
        }
        table
    }

    pub fn train(&self) -> HmmModel {
        let begin = Instant::now();
        let folded = self.fold();
        let model = HmmModel::new(self.transitions(), Self::emissions(&folded));
        log::info!(
            "trained on {} sentences: {} (word, tag) pairs, {} tags, {} transitions, {} emissions, time cost: {:?}",
            self.num_sentences,
            self.pairs.len(),
            self.unigrams.len(),
            model.transitions.len(),
            model.emissions.len(),
            begin.elapsed()
        );
        model
    }
}

/// Counts `ds` and estimates the model in one go.
pub fn train(ds: &Dataset, opt: TrainOpt) -> HmmModel {
    log::info!(
        "train (sentences: {}, tokens: {}, denoising: {}, fold_rare_words: {})",
        ds.len(),
        ds.total_items(),
        opt.denoising,
        opt.fold_rare_words
    );
    let mut trainer = Trainer::new(opt);
    for seq in &ds.seqs {
        trainer.append(seq);
    }
    trainer.train()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(pairs: &[(&str, &str)]) -> TaggedSentence {
        pairs.iter().copied().collect()
    }

    #[test]
    fn counts() {
        let mut trainer = Trainer::default();
        trainer.append(&sentence(&[("Der", "ART"), ("Baum", "NN")]));
        trainer.append(&sentence(&[("Der", "ART"), ("Hund", "NN"), ("bellt", "VVFIN")]));
        trainer.append(&TaggedSentence::default());
        assert_eq!(trainer.num_sentences(), 2);
        assert_eq!(trainer.pairs.len(), 4);
        assert_eq!(trainer.unigrams["START"], 2);
        assert_eq!(trainer.unigrams["NN"], 2);
        assert_eq!(trainer.bigrams[&("START".to_string(), "ART".to_string())], 2);
        assert_eq!(trainer.bigrams[&("NN".to_string(), "VVFIN".to_string())], 1);
        assert_eq!(trainer.pairs[&("^Der".to_string(), "ART".to_string())], 2);
        assert!(!trainer.pairs.contains_key(&("Der".to_string(), "ART".to_string())));
    }

    // Known divergence: merges add the pair count, never count + 1.
    #[test]
    fn fold_is_additive() {
        let mut trainer = Trainer::default();
        trainer.append(&sentence(&[("Haus", "NN"), ("Baum", "NN"), ("Baum", "NN"), ("Tür", "NN")]));
        let folded = trainer.fold();
        assert_eq!(folded[&("Baum".to_string(), "NN".to_string())], 2);
        assert_eq!(folded[&("OVV3-CAPITAL".to_string(), "NN".to_string())], 1);
        assert_eq!(folded[&("OVV6-START".to_string(), "NN".to_string())], 1);
        assert_eq!(folded.values().sum::<usize>(), 4);
    }

    #[test]
    fn literal_bucket_names_are_not_lost() {
        let mut trainer = Trainer::default();
        trainer.append(&sentence(&[("x", "XY"), ("OVV6", "XY"), ("ab12", "XY")]));
        let folded = trainer.fold();
        assert_eq!(folded[&("OVV6".to_string(), "XY".to_string())], 2);
        assert_eq!(folded[&("OVV3-START".to_string(), "XY".to_string())], 1);
        assert_eq!(folded.values().sum::<usize>(), 3);
    }

    #[test]
    fn denoising_moves_counts() {
        let opt = TrainOpt {
            denoising: true,
            ..Default::default()
        };
        let mut trainer = Trainer::new(opt);
        trainer.append(&sentence(&[("Im", "APPRART"), ("Jahr", "NN"), ("2019", "NN")]));
        trainer.append(&sentence(&[("2019", "NN")]));
        let model = trainer.train();
        assert_eq!(model.emissions.get("CARD", "NUMBER"), Some(0.0));
        assert_eq!(model.emissions.get("NN", "NUMBER"), None);
        // transitions keep the gold tags
        assert!(model.transitions.get("NN", "NN").is_some());
        assert!(model.transitions.get("NN", "CARD").is_none());
    }

    #[test]
    fn without_rare_word_folding() {
        let opt = TrainOpt {
            fold_rare_words: false,
            ..Default::default()
        };
        let mut trainer = Trainer::new(opt);
        trainer.append(&sentence(&[("Im", "APPRART"), ("Jahr", "NN"), ("2019", "CARD")]));
        let model = trainer.train();
        assert_eq!(model.emissions.get("NN", "Jahr"), Some(0.0));
        assert_eq!(model.emissions.get("APPRART", "^Im"), Some(0.0));
        assert_eq!(model.emissions.get("CARD", "NUMBER"), Some(0.0));
    }

    #[test]
    fn transition_rows_are_normalized() {
        let mut trainer = Trainer::default();
        trainer.append(&sentence(&[("Der", "ART"), ("Baum", "NN"), (".", "$.")]));
        trainer.append(&sentence(&[("Die", "ART"), ("Katze", "NN"), ("schläft", "VVFIN"), (".", "$.")]));
        trainer.append(&sentence(&[("Er", "PPER"), ("schläft", "VVFIN")]));
        let model = trainer.train();
        for (prev, _) in model.transitions.rows() {
            let mass = model.transitions.row_mass(prev).unwrap();
            assert!((mass - 1.0).abs() < 1e-9, "{prev}: {mass}");
        }
        assert!((model.transitions.get("NN", "$.").unwrap() - 0.5f64.ln()).abs() < 1e-12);
        assert!((model.transitions.get("START", "ART").unwrap() - (2.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn options() {
        let mut opt = TrainOpt::default();
        opt.set("denoising", "1").unwrap();
        opt.set("fold_rare_words", "false").unwrap();
        assert!(opt.denoising);
        assert!(!opt.fold_rare_words);
        assert!(opt.set("c2", "0.1").is_err());
    }
}
