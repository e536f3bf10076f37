use crate::types::{KeyMoment, Sentence, SentenceRange, TimeRange};

/// Index of the first sentence that ends at or after `seconds`.
pub fn sentence_at(sentences: &[Sentence], seconds: f64) -> Option<usize> {
    let index = sentences.partition_point(|s| s.time_range.end < seconds);
    (index < sentences.len()).then_some(index)
}

/// Video time covered by a sentence range, from the first sentence's start
/// to the last sentence's end. `None` when either index is out of bounds.
pub fn time_range_of(sentences: &[Sentence], range: SentenceRange) -> Option<TimeRange> {
    let first = sentences.get(range.start)?;
    let last = sentences.get(range.end)?;
    Some(TimeRange::new(first.time_range.start, last.time_range.end))
}

pub fn moment_duration(sentences: &[Sentence], range: SentenceRange) -> Option<f64> {
    time_range_of(sentences, range).map(|t| t.duration())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOwner {
    Moment(usize),
    Unassigned,
}

/// A contiguous run of sentences shown together in the transcript panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceGroup {
    pub owner: GroupOwner,
    pub range: SentenceRange,
}

/// Partition `0..sentence_count` into groups that break exactly at each
/// moment's start and end. Expects `moments` sorted and non-overlapping.
pub fn group_sentences(sentence_count: usize, moments: &[KeyMoment]) -> Vec<SentenceGroup> {
    let mut groups = Vec::with_capacity(moments.len() * 2 + 1);
    let mut next = 0;

    for (index, moment) in moments.iter().enumerate() {
        if next >= sentence_count {
            break;
        }
        let start = moment.sentence_range.start.max(next);
        if start >= sentence_count {
            break;
        }
        let end = moment.sentence_range.end.min(sentence_count - 1);
        if end < start {
            continue;
        }

        if next < start {
            groups.push(SentenceGroup {
                owner: GroupOwner::Unassigned,
                range: SentenceRange::new(next, start - 1),
            });
        }
        groups.push(SentenceGroup {
            owner: GroupOwner::Moment(index),
            range: SentenceRange::new(start, end),
        });
        next = end + 1;
    }

    if next < sentence_count {
        groups.push(SentenceGroup {
            owner: GroupOwner::Unassigned,
            range: SentenceRange::new(next, sentence_count - 1),
        });
    }

    groups
}
