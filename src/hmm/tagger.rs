use std::collections::HashSet;

use super::{
    classify::{self, BOUNDARY_MARKER},
    model::HmmModel,
    trellis::{Trellis, START_ID},
    START,
};
use crate::quark::Quark;

/// Count proxy for words the emission table knows: only numbers, links and
/// truncations are rewritten.
const KNOWN: usize = 2;
/// Count proxy for unseen words: every shape bucket applies.
const UNSEEN: usize = 0;

/// Result of decoding one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Log-probability of the best path; -inf when no path exists.
    pub log_prob: f64,
    /// The original tokens paired with their tags.
    pub tokens: Vec<(String, String)>,
}

impl Decoded {
    pub fn is_degenerate(&self) -> bool {
        self.log_prob == f64::NEG_INFINITY
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|(_, tag)| tag.as_str())
    }
}

/// Viterbi decoder over a borrowed model.
///
/// The tagger never mutates the model, so one tagger can serve any number of
/// threads; every call gets its own trellis.
#[derive(Debug)]
pub struct Tagger<'a> {
    model: &'a HmmModel,
    /// `START` first, then every tag of the transition table in sorted order.
    states: Quark,
    /// Dense [L][L] transition log-probabilities.
    trans: Vec<f64>,
    /// Every word and pseudo-word some tag emits.
    vocab: HashSet<&'a str>,
}

impl<'a> Tagger<'a> {
    pub fn new(model: &'a HmmModel) -> Self {
        let mut tags = model.transitions.inner_keys();
        tags.extend(model.transitions.outer_keys());
        tags.remove(START);
        let states: Quark = std::iter::once(START).chain(tags).collect();

        let l = states.len();
        let mut trans = vec![f64::NEG_INFINITY; l * l];
        for (prev, row) in model.transitions.rows() {
            let Some(i) = states.id(prev) else { continue };
            for (next, &lp) in row {
                if let Some(j) = states.id(next) {
                    trans[i * l + j] = lp;
                }
            }
        }

        let vocab = model.emissions.inner_keys().into_iter().collect();
        log::debug!("tagger: {} states", l);
        Self {
            model,
            states,
            trans,
            vocab,
        }
    }

    pub fn model(&self) -> &HmmModel {
        self.model
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// State names in enumeration order, `START` included.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter()
    }

    /// Maps each token onto the symbol the emission table is queried with.
    pub fn observe<S: AsRef<str>>(&self, sentence: &[S]) -> Vec<String> {
        sentence
            .iter()
            .enumerate()
            .map(|(t, token)| {
                let word = if t == 0 {
                    format!("{BOUNDARY_MARKER}{}", token.as_ref())
                } else {
                    token.as_ref().to_string()
                };
                let proxy = if self.vocab.contains(word.as_str()) {
                    KNOWN
                } else {
                    UNSEEN
                };
                match classify::pseudo_word(&word, proxy) {
                    Some(bucket) => bucket.name(),
                    None => word,
                }
            })
            .collect()
    }

    /// Fills the Viterbi lattice of `sentence`.
    pub fn trellis<S: AsRef<str>>(&self, sentence: &[S]) -> Trellis {
        let l = self.states.len();
        let mut trellis = Trellis::new(l, self.observe(sentence));
        let emissions = &self.model.emissions;
        trellis.viterbi(
            |i, j| self.trans[i * l + j],
            |j, symbol| {
                if j == START_ID {
                    return f64::NEG_INFINITY;
                }
                self.states
                    .name(j)
                    .map_or(f64::NEG_INFINITY, |tag| emissions.log_prob(tag, symbol))
            },
        );
        trellis
    }

    /// Tags `sentence` with its most probable tag sequence.
    pub fn decode<S: AsRef<str>>(&self, sentence: &[S]) -> Decoded {
        let trellis = self.trellis(sentence);
        let (log_prob, path) = trellis.best_path();
        let tokens = sentence
            .iter()
            .zip(path)
            .map(|(token, id)| {
                let tag = self.states.name(id).unwrap_or(START);
                (token.as_ref().to_string(), tag.to_string())
            })
            .collect();
        Decoded { log_prob, tokens }
    }
}
