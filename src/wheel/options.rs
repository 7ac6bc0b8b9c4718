use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{AppError, Result};

/// Ordered entries of one wheel. Order is slice order; duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    options: Vec<String>,
}

impl OptionList {
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }

    pub fn add(&mut self, text: impl Into<String>) {
        self.options.push(text.into());
    }

    /// Remove and return the entry at `index`.
    pub fn remove_at(&mut self, index: i64) -> Result<String> {
        let len = self.options.len();
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(self.options.remove(i)),
            _ => Err(AppError::OutOfRange { index, len }),
        }
    }

    /// Remove every entry equal to `text`. Returns how many were removed.
    pub fn remove_value(&mut self, text: &str) -> usize {
        let before = self.options.len();
        self.options.retain(|o| o != text);
        before - self.options.len()
    }

    /// Shuffle in place; every permutation is equally likely for a fair `rng`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.options
    }

    pub fn into_vec(self) -> Vec<String> {
        self.options
    }
}

/// `['a', 'b']`, or `[]` for an empty wheel.
impl std::fmt::Display for OptionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.options.is_empty() {
            return write!(f, "[]");
        }
        write!(f, "['{}']", self.options.join("', '"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn list(items: &[&str]) -> OptionList {
        OptionList::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn add_allows_duplicates() {
        let mut options = OptionList::default();
        options.add("x");
        options.add("x");
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn remove_at_returns_removed_entry() {
        let mut options = list(&["A", "B", "C"]);
        assert_eq!(options.remove_at(1).unwrap(), "B");
        assert_eq!(options, list(&["A", "C"]));
    }

    #[test]
    fn remove_at_len_is_out_of_range() {
        let mut options = list(&["A", "B", "C"]);
        let err = options.remove_at(3).unwrap_err();
        assert!(matches!(err, AppError::OutOfRange { index: 3, len: 3 }));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn remove_at_negative_is_out_of_range() {
        let mut options = list(&["A"]);
        assert!(matches!(options.remove_at(-1), Err(AppError::OutOfRange { .. })));
    }

    #[test]
    fn remove_value_removes_every_match() {
        let mut options = list(&["A", "B", "A"]);
        assert_eq!(options.remove_value("A"), 2);
        assert_eq!(options, list(&["B"]));
    }

    #[test]
    fn remove_value_without_match_is_noop() {
        let mut options = list(&["A", "B"]);
        assert_eq!(options.remove_value("Z"), 0);
        assert_eq!(options, list(&["A", "B"]));
    }

    #[test]
    fn clear_empties_list() {
        let mut options = list(&["A", "B"]);
        options.clear();
        assert!(options.is_empty());
    }

    #[test]
    fn display_matches_reply_format() {
        assert_eq!(list(&["pizza", "tacos"]).to_string(), "['pizza', 'tacos']");
        assert_eq!(OptionList::default().to_string(), "[]");
    }

    #[test]
    fn randomize_reaches_every_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..600 {
            let mut options = list(&["A", "B", "C"]);
            options.randomize(&mut rng);
            seen.insert(options.into_vec());
        }
        assert_eq!(seen.len(), 6, "all 3! orderings should appear, got {seen:?}");
    }

    proptest! {
        #[test]
        fn randomize_preserves_entries(ids in proptest::collection::vec(0u8..6, 0..20), seed in any::<u64>()) {
            // id 0 stands in for an empty entry; small range forces duplicates
            let items: Vec<String> = ids
                .iter()
                .map(|&id| if id == 0 { String::new() } else { format!("opt {id}") })
                .collect();
            let mut options = OptionList::new(items.clone());
            options.randomize(&mut StdRng::seed_from_u64(seed));

            let mut before = items;
            let mut after = options.into_vec();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
