//! Per-item key-moment editor: a closed set of actions and one total
//! transition function over `(cursor, key_moments)`.

use log::{debug, warn};

use crate::{
    resolver::{OverlapPolicy, resolve_tagged},
    types::{KeyMoment, KeyMomentPatch, SentenceRange, VideoInfo},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Move the cursor. The index is not validated.
    Select(usize),
    /// Patch the moment under the cursor, clear its review and re-resolve
    /// overlaps. The cursor follows the edited moment. An inverted range is
    /// ignored.
    Edit(KeyMomentPatch),
    /// Splice a moment in without overlap checking.
    Insert { at: usize, moment: KeyMoment },
    Remove(usize),
    /// Merge the moment at the index with the one right after it.
    Merge(usize),
    MarkReviewed(usize),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Select(_) => "select",
            Action::Edit(_) => "edit",
            Action::Insert { .. } => "insert",
            Action::Remove(_) => "remove",
            Action::Merge(_) => "merge",
            Action::MarkReviewed(_) => "mark_reviewed",
        }
    }

    fn touches_moments(&self) -> bool {
        !matches!(self, Action::Select(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub cursor: Option<usize>,
    pub key_moments: Vec<KeyMoment>,
    /// Position in the initial collection for each moment, `None` for
    /// moments created by insert, merge or fold.
    origins: Vec<Option<usize>>,
}

/// Carried through the resolver by [`Action::Edit`].
#[derive(Debug, Clone, Copy)]
struct EditTag {
    origin: Option<usize>,
    edited: bool,
}

impl EditTag {
    fn fold(kept: EditTag, absorbed: EditTag) -> EditTag {
        EditTag {
            origin: None,
            edited: kept.edited || absorbed.edited,
        }
    }
}

impl EditorState {
    pub fn new(key_moments: Vec<KeyMoment>) -> Self {
        Self {
            cursor: Some(0),
            origins: (0..key_moments.len()).map(Some).collect(),
            key_moments,
        }
    }

    /// Moment under the cursor, if the cursor points at one.
    pub fn selected(&self) -> Option<&KeyMoment> {
        self.cursor.and_then(|i| self.key_moments.get(i))
    }

    /// Where the moment at `index` sat in the initial collection, if it is
    /// still the same moment.
    pub fn origin(&self, index: usize) -> Option<usize> {
        self.origins.get(index).copied().flatten()
    }

    fn clamp_cursor(&mut self) {
        let len = self.key_moments.len();
        self.cursor = match self.cursor {
            Some(_) if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }
}

/// Apply `action` to `state`.
pub fn reduce(mut state: EditorState, action: Action, policy: OverlapPolicy) -> EditorState {
    debug!("reducing {} with cursor {:?}", action.name(), state.cursor);
    state.origins.resize(state.key_moments.len(), None);

    match action {
        Action::Select(index) => {
            state.cursor = Some(index);
        }
        Action::Edit(patch) => {
            let Some(index) = state.cursor.filter(|&i| i < state.key_moments.len()) else {
                return state;
            };
            if patch.sentence_range.is_some_and(|r| r.is_empty()) {
                debug!("ignoring edit to an inverted range");
                return state;
            }
            let moment = &mut state.key_moments[index];
            patch.apply_to(moment);
            moment.is_reviewed = false;

            let tagged = std::mem::take(&mut state.key_moments)
                .into_iter()
                .zip(std::mem::take(&mut state.origins))
                .enumerate()
                .map(|(i, (moment, origin))| {
                    let tag = EditTag {
                        origin,
                        edited: i == index,
                    };
                    (moment, tag)
                })
                .collect();
            let resolved = resolve_tagged(tagged, policy, EditTag::fold);
            state.cursor = resolved.iter().position(|(_, tag)| tag.edited);
            (state.key_moments, state.origins) = resolved
                .into_iter()
                .map(|(moment, tag)| (moment, tag.origin))
                .unzip();
        }
        Action::Insert { at, moment } => {
            let at = at.min(state.key_moments.len());
            state.key_moments.insert(at, moment);
            state.origins.insert(at, None);
        }
        Action::Remove(index) => {
            if index < state.key_moments.len() {
                state.key_moments.remove(index);
                state.origins.remove(index);
                state.clamp_cursor();
            }
        }
        Action::Merge(index) => {
            if index + 1 < state.key_moments.len() {
                let next = state.key_moments.remove(index + 1);
                state.origins.remove(index + 1);
                let merged = state.key_moments[index].merged_with(&next);
                state.key_moments[index] = merged;
                state.origins[index] = None;
                state.clamp_cursor();
            }
        }
        Action::MarkReviewed(index) => {
            if let Some(moment) = state.key_moments.get_mut(index) {
                moment.is_reviewed = true;
            }
        }
    }

    state
}

/// The only sanctioned range for a moment inserted at position `at`: the gap
/// between the preceding moment's end and the following moment's start.
/// Positions past the end mean the end, as they do for [`Action::Insert`].
pub fn insertion_range(
    key_moments: &[KeyMoment],
    at: usize,
    sentence_count: usize,
) -> Option<SentenceRange> {
    let at = at.min(key_moments.len());
    let start = at
        .checked_sub(1)
        .and_then(|prev| key_moments.get(prev))
        .map_or(0, |m| m.sentence_range.end + 1);
    let next_start = key_moments
        .get(at)
        .map_or(sentence_count, |m| m.sentence_range.start);

    (next_start > start).then(|| SentenceRange::new(start, next_start - 1))
}

/// Receives every key-moment change made through a [`KeyMomentStore`].
pub trait KeyMomentSink {
    fn write_back(&mut self, mid: &str, key_moments: &[KeyMoment]);
}

/// Working copy of one item's moments plus the selection cursor.
#[derive(Debug, Clone)]
pub struct KeyMomentStore {
    mid: String,
    sentence_count: usize,
    policy: OverlapPolicy,
    original: Vec<KeyMoment>,
    state: EditorState,
}

impl KeyMomentStore {
    pub fn new(
        mid: impl Into<String>,
        key_moments: Vec<KeyMoment>,
        sentence_count: usize,
        policy: OverlapPolicy,
    ) -> Self {
        Self {
            mid: mid.into(),
            sentence_count,
            policy,
            original: key_moments.clone(),
            state: EditorState::new(key_moments),
        }
    }

    /// Open `video` for editing. Moments are taken as decoded, not re-validated.
    pub fn open(video: &VideoInfo, policy: OverlapPolicy) -> Self {
        Self::new(
            video.mid.clone(),
            video.key_moments.clone(),
            video.sentences.len(),
            policy,
        )
    }

    pub fn mid(&self) -> &str {
        &self.mid
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.cursor
    }

    pub fn key_moments(&self) -> &[KeyMoment] {
        &self.state.key_moments
    }

    pub fn selected(&self) -> Option<&KeyMoment> {
        self.state.selected()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// Sentence count becomes known once the transcript is resolved. Zero
    /// means unknown, and edits are then only checked for inverted ranges.
    pub fn set_sentence_count(&mut self, sentence_count: usize) {
        self.sentence_count = sentence_count;
    }

    /// Apply `action` and write the result through to `sink`. Returns `false`
    /// and changes nothing when an edit's range is inverted or runs past the
    /// transcript.
    pub fn dispatch<S: KeyMomentSink + ?Sized>(&mut self, action: Action, sink: &mut S) -> bool {
        if let Action::Edit(patch) = &action {
            if let Some(range) = patch.sentence_range.filter(|r| !self.fits(r)) {
                warn!(
                    "refusing edit of {} to sentences {}..{} ({} sentences)",
                    self.mid, range.start, range.end, self.sentence_count
                );
                return false;
            }
        }

        let write_through = action.touches_moments();
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action, self.policy);

        if write_through {
            sink.write_back(&self.mid, &self.state.key_moments);
        }
        true
    }

    fn fits(&self, range: &SentenceRange) -> bool {
        !range.is_empty() && (self.sentence_count == 0 || range.end < self.sentence_count)
    }

    pub fn candidate_range(&self, at: usize) -> Option<SentenceRange> {
        insertion_range(&self.state.key_moments, at, self.sentence_count)
    }

    /// Insert a placeholder moment filling the gap at `at`. Returns `false`
    /// and leaves everything untouched when there is no free sentence there.
    pub fn insert_placeholder<S: KeyMomentSink + ?Sized>(&mut self, at: usize, sink: &mut S) -> bool {
        let at = at.min(self.state.key_moments.len());
        let Some(range) = self.candidate_range(at) else {
            warn!("no free sentences at position {at} of {}, insert refused", self.mid);
            return false;
        };
        self.dispatch(
            Action::Insert {
                at,
                moment: KeyMoment::placeholder(range),
            },
            sink,
        )
    }

    /// Restore the selected moment to how it was when the store was opened.
    /// Refused for moments that did not exist then, including the results of
    /// merges and folds. Goes through [`Action::Edit`], so the result is
    /// re-resolved.
    pub fn reset_selected<S: KeyMomentSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let Some(index) = self.state.cursor.filter(|&i| i < self.state.key_moments.len()) else {
            return false;
        };
        let Some(original) = self.state.origin(index).and_then(|o| self.original.get(o)) else {
            warn!("moment {index} of {} has no loaded version to reset to", self.mid);
            return false;
        };
        let patch = KeyMomentPatch::from(original.clone());
        self.dispatch(Action::Edit(patch), sink)
    }
}

/// Sink that drops every change.
impl KeyMomentSink for () {
    fn write_back(&mut self, _mid: &str, _key_moments: &[KeyMoment]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moment(title: &str, start: usize, end: usize) -> KeyMoment {
        KeyMoment {
            title: title.to_string(),
            concept: format!("{title} concept"),
            key_takeaway: format!("{title} takeaway"),
            sentence_range: SentenceRange::new(start, end),
            is_reviewed: true,
        }
    }

    fn state(moments: Vec<KeyMoment>) -> EditorState {
        EditorState::new(moments)
    }

    fn ranges(state: &EditorState) -> Vec<(usize, usize)> {
        state
            .key_moments
            .iter()
            .map(|m| (m.sentence_range.start, m.sentence_range.end))
            .collect()
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(String, Vec<KeyMoment>)>,
    }

    impl KeyMomentSink for RecordingSink {
        fn write_back(&mut self, mid: &str, key_moments: &[KeyMoment]) {
            self.writes.push((mid.to_string(), key_moments.to_vec()));
        }
    }

    #[test]
    fn initial_cursor_is_first_moment() {
        let s = state(vec![moment("A", 0, 1)]);
        assert_eq!(s.cursor, Some(0));
        assert_eq!(s.selected().unwrap().title, "A");

        let empty = state(Vec::new());
        assert_eq!(empty.cursor, Some(0));
        assert!(empty.selected().is_none());
    }

    #[test]
    fn select_is_not_validated() {
        let s = reduce(state(vec![moment("A", 0, 1)]), Action::Select(7), OverlapPolicy::Fold);
        assert_eq!(s.cursor, Some(7));
        assert!(s.selected().is_none());
    }

    #[test]
    fn edit_clears_review_and_keeps_other_fields() {
        let s = reduce(
            state(vec![moment("A", 0, 1), moment("B", 3, 4)]),
            Action::Edit(KeyMomentPatch {
                title: Some("Opening".into()),
                ..KeyMomentPatch::default()
            }),
            OverlapPolicy::Fold,
        );
        assert_eq!(s.key_moments[0].title, "Opening");
        assert_eq!(s.key_moments[0].concept, "A concept");
        assert!(!s.key_moments[0].is_reviewed);
        assert!(s.key_moments[1].is_reviewed);
    }

    #[test]
    fn edit_into_neighbour_folds_both() {
        let s = reduce(
            state(vec![moment("A", 0, 1), moment("B", 3, 4)]),
            Action::Edit(KeyMomentPatch::range(SentenceRange::new(0, 3))),
            OverlapPolicy::Fold,
        );
        assert_eq!(ranges(&s), vec![(0, 4)]);
        assert!(!s.key_moments[0].is_reviewed);
        assert_eq!(s.cursor, Some(0));
    }

    #[test]
    fn edit_that_shrinks_collection_clamps_cursor() {
        let mut s = state(vec![moment("A", 0, 1), moment("B", 3, 4)]);
        s.cursor = Some(1);
        let s = reduce(
            s,
            Action::Edit(KeyMomentPatch::range(SentenceRange::new(1, 4))),
            OverlapPolicy::Fold,
        );
        assert_eq!(ranges(&s), vec![(0, 4)]);
        assert_eq!(s.cursor, Some(0));
    }

    #[test]
    fn edit_without_valid_cursor_is_noop() {
        let mut s = state(vec![moment("A", 0, 1)]);
        s.cursor = Some(3);
        let before = s.clone();
        let s = reduce(s, Action::Edit(KeyMomentPatch::range(SentenceRange::new(0, 9))), OverlapPolicy::Fold);
        assert_eq!(s, before);
    }

    #[test]
    fn insert_splices_without_checks_or_cursor_change() {
        let s = reduce(
            state(vec![moment("A", 0, 1), moment("C", 5, 6)]),
            Action::Insert {
                at: 1,
                moment: moment("B", 2, 4),
            },
            OverlapPolicy::Fold,
        );
        assert_eq!(ranges(&s), vec![(0, 1), (2, 4), (5, 6)]);
        assert_eq!(s.cursor, Some(0));
    }

    #[test]
    fn remove_tail_moves_cursor_back() {
        let mut s = state(vec![moment("A", 0, 1), moment("B", 2, 3), moment("C", 4, 5)]);
        s.cursor = Some(2);
        let s = reduce(s, Action::Remove(2), OverlapPolicy::Fold);
        assert_eq!(s.cursor, Some(1));
        assert_eq!(s.key_moments.len(), 2);
    }

    #[test]
    fn remove_middle_keeps_slot() {
        let mut s = state(vec![moment("A", 0, 1), moment("B", 2, 3), moment("C", 4, 5)]);
        s.cursor = Some(1);
        let s = reduce(s, Action::Remove(1), OverlapPolicy::Fold);
        assert_eq!(s.cursor, Some(1));
        assert_eq!(s.selected().unwrap().title, "C");
    }

    #[test]
    fn removing_last_moment_clears_cursor() {
        let s = reduce(state(vec![moment("A", 0, 1)]), Action::Remove(0), OverlapPolicy::Fold);
        assert!(s.key_moments.is_empty());
        assert_eq!(s.cursor, None);
    }

    #[test]
    fn merge_joins_with_next() {
        let s = reduce(
            state(vec![moment("A", 0, 1), moment("B", 3, 4), moment("C", 6, 7)]),
            Action::Merge(0),
            OverlapPolicy::Fold,
        );
        assert_eq!(ranges(&s), vec![(0, 4), (6, 7)]);
        let merged = &s.key_moments[0];
        assert_eq!(merged.title, "A, B");
        assert_eq!(merged.key_takeaway, "A takeaway, B takeaway");
        assert!(!merged.is_reviewed);
    }

    #[test]
    fn merge_on_last_moment_is_noop() {
        let before = state(vec![moment("A", 0, 1), moment("B", 3, 4)]);
        let after = reduce(before.clone(), Action::Merge(1), OverlapPolicy::Fold);
        assert_eq!(after, before);
    }

    #[test]
    fn mark_reviewed_touches_one_moment() {
        let mut moments = vec![moment("A", 0, 1), moment("B", 3, 4)];
        moments.iter_mut().for_each(|m| m.is_reviewed = false);
        let s = reduce(state(moments), Action::MarkReviewed(1), OverlapPolicy::Fold);
        assert!(!s.key_moments[0].is_reviewed);
        assert!(s.key_moments[1].is_reviewed);
        assert_eq!(s.key_moments[1].title, "B");
    }

    #[test]
    fn insertion_range_fills_gaps() {
        let moments = vec![moment("A", 2, 4), moment("B", 8, 9)];
        assert_eq!(insertion_range(&moments, 0, 12), Some(SentenceRange::new(0, 1)));
        assert_eq!(insertion_range(&moments, 1, 12), Some(SentenceRange::new(5, 7)));
        assert_eq!(insertion_range(&moments, 2, 12), Some(SentenceRange::new(10, 11)));
        assert_eq!(insertion_range(&moments, 2, 10), None);
        assert_eq!(insertion_range(&[], 0, 3), Some(SentenceRange::new(0, 2)));
        assert_eq!(insertion_range(&[], 0, 0), None);
    }

    #[test]
    fn insert_between_adjacent_moments_is_refused() {
        let mut store = KeyMomentStore::new(
            "M1",
            vec![moment("A", 0, 2), moment("B", 3, 5)],
            6,
            OverlapPolicy::Fold,
        );
        let mut sink = RecordingSink::default();
        assert!(!store.insert_placeholder(1, &mut sink));
        assert_eq!(store.key_moments().len(), 2);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn insert_placeholder_uses_gap() {
        let mut store = KeyMomentStore::new("M1", vec![moment("A", 0, 2)], 6, OverlapPolicy::Fold);
        let mut sink = RecordingSink::default();
        assert!(store.insert_placeholder(1, &mut sink));
        let inserted = &store.key_moments()[1];
        assert_eq!(inserted.sentence_range, SentenceRange::new(3, 5));
        assert_eq!(inserted.title, "Title");
        assert!(!inserted.is_reviewed);
        assert_eq!(sink.writes.len(), 1);
    }

    #[test]
    fn dispatch_writes_through_except_for_select() {
        let mut store = KeyMomentStore::new(
            "M7",
            vec![moment("A", 0, 1), moment("B", 3, 4)],
            5,
            OverlapPolicy::Fold,
        );
        let mut sink = RecordingSink::default();
        store.dispatch(Action::Select(1), &mut sink);
        assert!(sink.writes.is_empty());

        store.dispatch(Action::MarkReviewed(0), &mut sink);
        store.dispatch(Action::Merge(0), &mut sink);
        assert_eq!(sink.writes.len(), 2);
        let (mid, moments) = sink.writes.last().unwrap();
        assert_eq!(mid, "M7");
        assert_eq!(moments.as_slice(), store.key_moments());
    }

    #[test]
    fn reset_restores_snapshot_fields() {
        let mut store = KeyMomentStore::new(
            "M1",
            vec![moment("A", 0, 1), moment("B", 3, 4)],
            5,
            OverlapPolicy::Fold,
        );
        store.dispatch(
            Action::Edit(KeyMomentPatch {
                title: Some("Changed".into()),
                sentence_range: Some(SentenceRange::new(0, 2)),
                ..KeyMomentPatch::default()
            }),
            &mut (),
        );
        assert_eq!(store.selected().unwrap().title, "Changed");

        assert!(store.reset_selected(&mut ()));
        let restored = store.selected().unwrap();
        assert_eq!(restored.title, "A");
        assert_eq!(restored.sentence_range, SentenceRange::new(0, 1));
        assert!(!restored.is_reviewed);
    }

    #[test]
    fn reset_finds_the_same_moment_after_a_removal() {
        let mut store = KeyMomentStore::new(
            "M1",
            vec![moment("A", 0, 1), moment("B", 3, 4), moment("C", 6, 7)],
            8,
            OverlapPolicy::Fold,
        );
        store.dispatch(Action::Remove(0), &mut ());
        store.dispatch(
            Action::Edit(KeyMomentPatch {
                title: Some("Changed".into()),
                ..KeyMomentPatch::default()
            }),
            &mut (),
        );
        assert_eq!(store.selected().unwrap().title, "Changed");

        assert!(store.reset_selected(&mut ()));
        let restored = store.selected().unwrap();
        assert_eq!(restored.title, "B");
        assert_eq!(restored.sentence_range, SentenceRange::new(3, 4));
    }

    #[test]
    fn reset_is_refused_for_merged_and_folded_moments() {
        let moments = vec![moment("A", 0, 1), moment("B", 3, 4), moment("C", 6, 7)];
        let mut store = KeyMomentStore::new("M1", moments, 8, OverlapPolicy::Fold);
        let mut sink = RecordingSink::default();

        store.dispatch(Action::Merge(0), &mut sink);
        assert!(!store.reset_selected(&mut sink));
        assert_eq!(sink.writes.len(), 1);
        assert_eq!(store.selected().unwrap().title, "A, B");

        store.dispatch(Action::Select(1), &mut sink);
        assert!(store.reset_selected(&mut sink));
        store.dispatch(Action::Edit(KeyMomentPatch::range(SentenceRange::new(2, 6))), &mut sink);
        assert_eq!(ranges(store.state()), vec![(0, 7)]);
        assert!(!store.reset_selected(&mut sink));
    }

    #[test]
    fn reset_of_inserted_moment_is_refused() {
        let mut store = KeyMomentStore::new("M1", vec![moment("A", 2, 3)], 6, OverlapPolicy::Fold);
        assert!(store.insert_placeholder(0, &mut ()));
        assert_eq!(ranges(store.state()), vec![(0, 1), (2, 3)]);
        assert!(!store.reset_selected(&mut ()));
        store.dispatch(Action::Select(1), &mut ());
        assert!(store.reset_selected(&mut ()));
    }

    #[test]
    fn cursor_follows_edited_moment_past_its_neighbour() {
        let s = reduce(
            state(vec![moment("A", 0, 1), moment("B", 3, 4)]),
            Action::Edit(KeyMomentPatch::range(SentenceRange::new(6, 7))),
            OverlapPolicy::Fold,
        );
        assert_eq!(ranges(&s), vec![(3, 4), (6, 7)]);
        assert_eq!(s.cursor, Some(1));
        assert_eq!(s.selected().unwrap().title, "A");
    }

    #[test]
    fn edit_to_inverted_range_is_noop() {
        let before = state(vec![moment("A", 0, 1), moment("B", 3, 4)]);
        let after = reduce(
            before.clone(),
            Action::Edit(KeyMomentPatch::range(SentenceRange::new(4, 2))),
            OverlapPolicy::Fold,
        );
        assert_eq!(after, before);
    }

    #[test]
    fn dispatch_refuses_edits_outside_the_transcript() {
        let mut store = KeyMomentStore::new(
            "M1",
            vec![moment("A", 0, 1), moment("B", 3, 4)],
            5,
            OverlapPolicy::Fold,
        );
        let mut sink = RecordingSink::default();
        assert!(!store.dispatch(Action::Edit(KeyMomentPatch::range(SentenceRange::new(2, 5))), &mut sink));
        assert!(!store.dispatch(Action::Edit(KeyMomentPatch::range(SentenceRange::new(3, 1))), &mut sink));
        assert!(sink.writes.is_empty());
        assert_eq!(ranges(store.state()), vec![(0, 1), (3, 4)]);

        assert!(store.dispatch(Action::Edit(KeyMomentPatch::range(SentenceRange::new(2, 2))), &mut sink));
        assert_eq!(sink.writes.len(), 1);

        let mut unknown = KeyMomentStore::new("M2", vec![moment("A", 0, 1)], 0, OverlapPolicy::Fold);
        assert!(unknown.dispatch(Action::Edit(KeyMomentPatch::range(SentenceRange::new(0, 50))), &mut ()));
    }

    #[test]
    fn insertion_past_the_end_uses_the_tail_gap() {
        let moments = vec![moment("A", 0, 11), moment("B", 16, 19)];
        assert_eq!(insertion_range(&moments, 5, 40), Some(SentenceRange::new(20, 39)));

        let mut store = KeyMomentStore::new("M1", moments, 40, OverlapPolicy::Fold);
        assert!(store.insert_placeholder(5, &mut ()));
        assert_eq!(ranges(store.state()), vec![(0, 11), (16, 19), (20, 39)]);
        assert!(crate::resolver::is_resolved(store.key_moments()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::resolver::{is_resolved, resolve_overlaps};
    use proptest::prelude::*;

    const SENTENCES: usize = 40;

    fn arb_action() -> impl Strategy<Value = (u8, usize, usize, usize)> {
        (0u8..4, 0usize..8, 0usize..SENTENCES, 0usize..SENTENCES)
    }

    fn initial() -> Vec<KeyMoment> {
        (0..5)
            .map(|i| KeyMoment::placeholder(SentenceRange::new(i * 8, i * 8 + 3)))
            .collect()
    }

    proptest! {
        /// Property: edits, inserts and merges never leave overlapping or unsorted moments
        #[test]
        fn prop_actions_preserve_no_overlap(
            steps in prop::collection::vec(arb_action(), 0..60),
            trim in any::<bool>(),
        ) {
            let policy = if trim { OverlapPolicy::Trim } else { OverlapPolicy::Fold };
            let mut store = KeyMomentStore::new("M", initial(), SENTENCES, policy);

            for (kind, index, a, b) in steps {
                match kind {
                    0 => {
                        store.dispatch(Action::Select(index), &mut ());
                        let range = SentenceRange::new(a.min(b), a.max(b));
                        store.dispatch(Action::Edit(KeyMomentPatch::range(range)), &mut ());
                    }
                    1 => {
                        store.insert_placeholder(index, &mut ());
                    }
                    2 => {
                        store.dispatch(Action::Merge(index), &mut ());
                    }
                    _ => {
                        store.dispatch(Action::Remove(index), &mut ());
                    }
                }

                prop_assert!(is_resolved(store.key_moments()));
                prop_assert!(store
                    .key_moments()
                    .iter()
                    .all(|m| m.sentence_range.start <= m.sentence_range.end
                        && m.sentence_range.end < SENTENCES));
            }
        }

        /// Property: resolving a resolved collection is the identity
        #[test]
        fn prop_resolver_idempotent(
            raw in prop::collection::vec((0usize..SENTENCES, 0usize..6), 0..12),
            trim in any::<bool>(),
        ) {
            let policy = if trim { OverlapPolicy::Trim } else { OverlapPolicy::Fold };
            let moments: Vec<KeyMoment> = raw
                .into_iter()
                .map(|(start, len)| KeyMoment::placeholder(SentenceRange::new(start, start + len)))
                .collect();
            let once = resolve_overlaps(moments, policy);
            let twice = resolve_overlaps(once.clone(), policy);
            prop_assert_eq!(once, twice);
        }
    }
}
