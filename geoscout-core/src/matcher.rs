//! Name matching and ranking for suggestion queries.
//!
//! Matching folds case with [`str::to_lowercase`] and classifies a candidate
//! as a prefix or substring hit. Ranking uses [`Collator`], a three-level
//! collation: the transliterated, case-folded key first (so diacritics and
//! case collate together), then the case-folded text, then the raw text to
//! keep the order total.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::address::MapObject;

/// Transliterate `text` to ASCII.
///
/// Used for English-name fallbacks when a record carries no explicit
/// English name.
///
/// # Examples
/// ```
/// assert_eq!(geoscout_core::transliterate("Zürich"), "Zurich");
/// ```
#[must_use]
pub fn transliterate(text: &str) -> String {
    deunicode::deunicode(text)
}

/// How a candidate name matched a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The candidate starts with the query.
    Prefix,
    /// The candidate contains the query but does not start with it.
    Substring,
}

/// A case-folded query string.
///
/// # Examples
/// ```
/// use geoscout_core::{MatchKind, NameQuery};
///
/// let query = NameQuery::new("Ber");
/// assert_eq!(query.match_kind("Berlin"), Some(MatchKind::Prefix));
/// assert_eq!(query.match_kind("Oberhausen"), Some(MatchKind::Substring));
/// assert_eq!(query.match_kind("Hamburg"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    folded: String,
    char_len: usize,
}

impl NameQuery {
    /// Fold `query` for matching.
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            folded: query.to_lowercase(),
            char_len: query.chars().count(),
        }
    }

    /// Whether the query is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Length of the query as typed, in characters.
    ///
    /// Folding can lengthen text (`İ` lowercases to two characters), so this
    /// counts the input rather than the folded form.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The folded query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Classify `candidate` against the query.
    ///
    /// An empty query is a prefix of everything.
    #[must_use]
    pub fn match_kind(&self, candidate: &str) -> Option<MatchKind> {
        let folded = candidate.to_lowercase();
        if folded.starts_with(&self.folded) {
            Some(MatchKind::Prefix)
        } else if folded.contains(&self.folded) {
            Some(MatchKind::Substring)
        } else {
            None
        }
    }

    /// Whether `candidate` starts with the query.
    #[must_use]
    pub fn is_prefix_of(&self, candidate: &str) -> bool {
        candidate.to_lowercase().starts_with(&self.folded)
    }

    /// Whether `candidate` equals the query after folding.
    #[must_use]
    pub fn matches_exactly(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.folded
    }
}

/// Two-tier result list: prefix hits ahead of substring hits.
///
/// Each tier keeps encounter order. This is the same as inserting prefix
/// hits at a moving front index and appending everything else.
#[derive(Debug, Clone)]
pub struct MatchPartition<T> {
    front: Vec<T>,
    back: Vec<T>,
}

impl<T> Default for MatchPartition<T> {
    fn default() -> Self {
        Self {
            front: Vec::new(),
            back: Vec::new(),
        }
    }
}

impl<T> MatchPartition<T> {
    /// Record a hit in the tier matching `kind`.
    pub fn push(&mut self, kind: MatchKind, item: T) {
        match kind {
            MatchKind::Prefix => self.front.push(item),
            MatchKind::Substring => self.back.push(item),
        }
    }

    /// Append an item after every hit recorded so far.
    pub fn push_back(&mut self, item: T) {
        self.back.push(item);
    }

    /// Number of items recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }

    /// Flatten into prefix hits followed by the rest.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        let mut items = self.front;
        items.extend(self.back);
        items
    }
}

/// Multi-level string collation approximating locale-aware ordering.
///
/// The ordering is the same for every locale: keys are built from an ASCII
/// transliteration, so locale-specific rules such as Swedish sorting `Ä`
/// after `Z` are not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collator;

impl Collator {
    /// Sort key for `text`; comparing keys equals [`Collator::compare`].
    #[must_use]
    pub fn sort_key(self, text: &str) -> (String, String, String) {
        (
            transliterate(text).to_lowercase(),
            text.to_lowercase(),
            text.to_owned(),
        )
    }

    /// Compare two strings.
    ///
    /// # Examples
    /// ```
    /// use std::cmp::Ordering;
    /// use geoscout_core::Collator;
    ///
    /// assert_eq!(Collator.compare("Émile", "Emma"), Ordering::Less);
    /// assert_eq!(Collator.compare("apple", "Banana"), Ordering::Less);
    /// ```
    #[must_use]
    pub fn compare(self, left: &str, right: &str) -> Ordering {
        transliterate(left)
            .to_lowercase()
            .cmp(&transliterate(right).to_lowercase())
            .then_with(|| left.to_lowercase().cmp(&right.to_lowercase()))
            .then_with(|| left.cmp(right))
    }
}

/// Orders map objects by their active name field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapObjectComparator {
    use_english_names: bool,
}

impl MapObjectComparator {
    /// Comparator over local names, or English names when `use_english_names`.
    #[must_use]
    pub const fn new(use_english_names: bool) -> Self {
        Self { use_english_names }
    }

    /// Whether English names are compared.
    #[must_use]
    pub const fn use_english_names(&self) -> bool {
        self.use_english_names
    }

    /// Compare two objects.
    #[must_use]
    pub fn compare<T: MapObject + ?Sized>(&self, left: &T, right: &T) -> Ordering {
        Collator.compare(
            left.display_name(self.use_english_names),
            right.display_name(self.use_english_names),
        )
    }

    /// Stable sort of shared objects.
    pub fn sort<T: MapObject + ?Sized>(&self, items: &mut [Arc<T>]) {
        items.sort_by_cached_key(|item| {
            Collator.sort_key(item.display_name(self.use_english_names))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ber", "Berlin", Some(MatchKind::Prefix))]
    #[case("BER", "berlin", Some(MatchKind::Prefix))]
    #[case("haus", "Oberhausen", Some(MatchKind::Substring))]
    #[case("xyz", "Berlin", None)]
    #[case("", "Berlin", Some(MatchKind::Prefix))]
    fn classifies_matches(
        #[case] query: &str,
        #[case] candidate: &str,
        #[case] expected: Option<MatchKind>,
    ) {
        assert_eq!(NameQuery::new(query).match_kind(candidate), expected);
    }

    #[rstest]
    fn counts_characters_not_bytes() {
        assert_eq!(NameQuery::new("Öl").char_len(), 2);
    }

    #[rstest]
    fn counts_typed_characters_before_folding() {
        let query = NameQuery::new("İz");
        assert_eq!(query.char_len(), 2);
        assert_eq!(query.as_str().chars().count(), 3);
    }

    #[rstest]
    #[case("Ärger", "Zebra", Ordering::Less)]
    #[case("Ärger", "Arm", Ordering::Less)]
    #[case("Émile", "Emma", Ordering::Less)]
    #[case("Öl", "Ofen", Ordering::Greater)]
    fn collation_folds_diacritics_for_every_locale(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(Collator.compare(left, right), expected);
    }

    #[rstest]
    fn partition_keeps_prefix_hits_first_in_encounter_order() {
        let mut partition = MatchPartition::default();
        partition.push(MatchKind::Substring, "b1");
        partition.push(MatchKind::Prefix, "a1");
        partition.push(MatchKind::Substring, "b2");
        partition.push(MatchKind::Prefix, "a2");
        partition.push_back("tail");
        assert_eq!(partition.len(), 5);
        assert_eq!(partition.into_vec(), vec!["a1", "a2", "b1", "b2", "tail"]);
    }

    #[rstest]
    #[case("Émile", "Emma", Ordering::Less)]
    #[case("zebra", "Ärger", Ordering::Greater)]
    #[case("apple", "Apple", Ordering::Greater)]
    #[case("12", "12A", Ordering::Less)]
    #[case("same", "same", Ordering::Equal)]
    fn collates_diacritics_and_case_together(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(Collator.compare(left, right), expected);
    }

    #[rstest]
    fn sort_key_agrees_with_compare() {
        let words = ["Österreich", "Oslo", "oben", "Ober", "ÖL"];
        for left in words {
            for right in words {
                assert_eq!(
                    Collator.sort_key(left).cmp(&Collator.sort_key(right)),
                    Collator.compare(left, right),
                    "{left} vs {right}"
                );
            }
        }
    }
}
