//! Backfills missing shape buckets in an emission table.
//!
//! Rare words are folded into 16 shape buckets during training, but a tag
//! only gets the buckets its own rare words happened to hit. Decoding an
//! unknown word of another shape under that tag would then be impossible.
//! For every tag each length tier gets one representative value (the mean
//! of its present buckets, or the value of the nearest tier with data) and
//! the missing buckets of the tier take that value.

use serde::{Deserialize, Serialize};

use super::{
    classify::{LengthTier, PseudoWord},
    table::EmissionTable,
};
use crate::errors::{Error, Result};

/// Tags that never emit unknown words.
pub const DEFAULT_BLOCKED_TAGS: [&str; 11] = [
    "$(", "ART", "$.", "APPRART", "$,", "PTKNEG", "KOKOM", "VAPP", "VMINF", "PRELAT", "VMPP",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothOpt {
    pub blocked_tags: Vec<String>,
}

impl Default for SmoothOpt {
    fn default() -> Self {
        Self {
            blocked_tags: DEFAULT_BLOCKED_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SmoothOpt {
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "blocked_tags" => {
                self.blocked_tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }
            _ => return Err(Error::invalid_parameter(name, "unknown smoothing parameter")),
        }
        Ok(())
    }

    fn is_blocked(&self, tag: &str) -> bool {
        self.blocked_tags.iter().any(|t| t == tag)
    }
}

/// Mean log-probability of the buckets present in each tier.
fn tier_means<F: Fn(&str) -> Option<f64>>(lookup: F) -> [Option<f64>; 4] {
    let mut sum = [0.0; 4];
    let mut n = [0usize; 4];
    for bucket in PseudoWord::shape_buckets() {
        if let (Some(tier), Some(lp)) = (bucket.tier(), lookup(bucket.name().as_str())) {
            sum[tier as usize] += lp;
            n[tier as usize] += 1;
        }
    }
    let mut means = [None; 4];
    for i in 0..4 {
        if n[i] > 0 {
            means[i] = Some(sum[i] / n[i] as f64);
        }
    }
    means
}

/// Value of tier `i`, or of the nearest tier with data.
///
/// At equal distance the lower tier wins.
fn nearest(means: &[Option<f64>; 4], i: usize) -> Option<f64> {
    if means[i].is_some() {
        return means[i];
    }
    for d in 1..means.len() {
        if let Some(v) = i.checked_sub(d).and_then(|k| means[k]) {
            return Some(v);
        }
        if let Some(v) = means.get(i + d).copied().flatten() {
            return Some(v);
        }
    }
    None
}

/// Representative value of every tier.
///
/// Tiers are resolved from short to huge and each result is written back,
/// so an empty tier can inherit from a lower tier that was itself filled.
fn resolve(means: [Option<f64>; 4]) -> [Option<f64>; 4] {
    let mut reps = means;
    for i in 0..reps.len() {
        if reps[i].is_none() {
            reps[i] = nearest(&reps, i);
        }
    }
    reps
}

/// Fills the missing shape buckets of every tag not blocked by `opt`.
///
/// Buckets already present are left alone, so smoothing twice changes
/// nothing. A tag without any bucket is left as it is.
pub fn smooth(emissions: &mut EmissionTable, opt: &SmoothOpt) {
    let tags: Vec<String> = emissions
        .outer_keys()
        .filter(|tag| !opt.is_blocked(tag))
        .map(String::from)
        .collect();
    let mut num_filled = 0;
    for tag in &tags {
        let Some(row) = emissions.row_mut(tag) else {
            continue;
        };
        let means = tier_means(|bucket| row.get(bucket).copied());
        let reps = resolve(means);
        if reps.iter().all(Option::is_none) {
            log::debug!("{tag}: no shape buckets, left unsmoothed");
            continue;
        }
        for bucket in PseudoWord::shape_buckets() {
            let tier = bucket.tier().unwrap_or(LengthTier::Huge);
            if let Some(rep) = reps[tier as usize] {
                row.entry(bucket.name()).or_insert_with(|| {
                    num_filled += 1;
                    rep
                });
            }
        }
    }
    log::info!(
        "smoothed {} tags ({} blocked), filled {} buckets",
        tags.len(),
        emissions.rows().len() - tags.len(),
        num_filled
    );
}
