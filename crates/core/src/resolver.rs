//! Restores the no-overlap invariant after one moment's range was edited.
//!
//! Moments are sorted by start and walked back to front. The already-resolved
//! moments form a stack whose top has the lowest start seen so far; every
//! incoming moment is reconciled against that top before being pushed.

use std::{fmt, str::FromStr};

use log::debug;

use crate::{
    error::ReviewError,
    types::{KeyMoment, SentenceRange},
};

/// How an overlap between two neighbouring moments is settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Any overlap folds the neighbour into the current moment.
    #[default]
    Fold,
    /// Only enclosed neighbours are folded; a partially overlapped neighbour
    /// has its start pushed past the current moment's end.
    Trim,
}

impl OverlapPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            OverlapPolicy::Fold => "fold",
            OverlapPolicy::Trim => "trim",
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverlapPolicy {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(OverlapPolicy::Fold),
            "trim" => Ok(OverlapPolicy::Trim),
            other => Err(ReviewError::Config {
                reason: format!("unknown overlap policy {other:?} (expected fold or trim)"),
            }),
        }
    }
}

/// Sort `moments` by start and remove every overlap according to `policy`.
pub fn resolve_overlaps(moments: Vec<KeyMoment>, policy: OverlapPolicy) -> Vec<KeyMoment> {
    let tagged = moments.into_iter().map(|m| (m, ())).collect();
    resolve_tagged(tagged, policy, |(), ()| ())
        .into_iter()
        .map(|(m, ())| m)
        .collect()
}

/// [`resolve_overlaps`] with a tag carried alongside each moment. When two
/// moments fold, `combine(kept, absorbed)` gives the tag of the result.
pub fn resolve_tagged<T>(
    mut moments: Vec<(KeyMoment, T)>,
    policy: OverlapPolicy,
    combine: impl Fn(T, T) -> T,
) -> Vec<(KeyMoment, T)> {
    moments.sort_by_key(|(m, _)| m.sentence_range.start);

    let mut stack: Vec<(KeyMoment, T)> = Vec::with_capacity(moments.len());
    for current in moments.into_iter().rev() {
        let resolved = match policy {
            OverlapPolicy::Fold => fold_into(current, &mut stack, &combine),
            OverlapPolicy::Trim => trim_against(current, &mut stack, &combine),
        };
        stack.push(resolved);
    }

    stack.reverse();
    stack
}

/// True when no two moments share a sentence and starts are ascending.
pub fn is_resolved(moments: &[KeyMoment]) -> bool {
    moments
        .windows(2)
        .all(|pair| pair[0].sentence_range.end < pair[1].sentence_range.start)
}

fn fold_into<T>(
    mut current: (KeyMoment, T),
    stack: &mut Vec<(KeyMoment, T)>,
    combine: &impl Fn(T, T) -> T,
) -> (KeyMoment, T) {
    while stack
        .last()
        .is_some_and(|(top, _)| current.0.sentence_range.end >= top.sentence_range.start)
    {
        let Some(top) = stack.pop() else { break };
        let end = current.0.sentence_range.end.max(top.0.sentence_range.end);
        current = absorb(current, top, end, combine);
    }
    current
}

fn trim_against<T>(
    mut current: (KeyMoment, T),
    stack: &mut Vec<(KeyMoment, T)>,
    combine: &impl Fn(T, T) -> T,
) -> (KeyMoment, T) {
    let end = current.0.sentence_range.end;
    while stack.last().is_some_and(|(top, _)| end >= top.sentence_range.end) {
        let Some(top) = stack.pop() else { break };
        current = absorb(current, top, end, combine);
    }

    if let Some((top, _)) = stack.last_mut() {
        if end >= top.sentence_range.start {
            debug!(
                "trimming {:?} start from {} to {}",
                top.title,
                top.sentence_range.start,
                end + 1
            );
            top.sentence_range.start = end + 1;
            top.is_reviewed = false;
        }
    }
    current
}

fn absorb<T>(
    (current, kept): (KeyMoment, T),
    (absorbed, tag): (KeyMoment, T),
    end: usize,
    combine: &impl Fn(T, T) -> T,
) -> (KeyMoment, T) {
    debug!(
        "folding {:?} {:?} into {:?} {:?}",
        absorbed.title, absorbed.sentence_range, current.title, current.sentence_range
    );
    let start = current.sentence_range.start;
    let mut folded = current.merged_with(&absorbed);
    folded.sentence_range = SentenceRange::new(start, end);
    (folded, combine(kept, tag))
}
