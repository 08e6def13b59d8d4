//! Bigram HMM part-of-speech tagger.
//!
//! Train a [`HmmModel`] from a tagged corpus, optionally [smooth] its
//! pseudo-word emissions and decode sentences with a Viterbi [`Tagger`].
//!
//! ```no_run
//! use hmmtagger::{Dataset, SmoothOpt, TrainOpt};
//!
//! let ds = Dataset::from_path("corpus.tsv")?;
//! let mut model = hmmtagger::train(&ds, TrainOpt::default());
//! model.smooth(&SmoothOpt::default());
//! let decoded = model.tagger().decode(&["Die", "Katze", "schläft", "."]);
//! println!("{:?}", decoded.tokens);
//! # Ok::<(), hmmtagger::Error>(())
//! ```
//!
//! [smooth]: hmm::smoother::smooth

pub mod config;
pub mod dataset;
mod errors;
pub mod evaluation;
pub mod hmm;
pub mod quark;

pub use config::Options;
pub use dataset::{Dataset, TaggedSentence};
pub use errors::{Error, Result};
pub use evaluation::Evaluation;
pub use hmm::{
    classify::{classify, pseudo_word, PseudoWord},
    model::HmmModel,
    smoother::SmoothOpt,
    table::{EmissionTable, ProbTable, TransitionTable},
    tagger::{Decoded, Tagger},
    trainer::{train, TrainOpt, Trainer},
    trellis::Trellis,
    START,
};
