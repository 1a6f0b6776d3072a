//! Legacy → replacement field pairs

use indexmap::IndexMap;

/// Ordered map from a legacy field to the replacement field derived from it
///
/// Pairs are applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRepairMap {
    pairs: IndexMap<String, String>,
}

impl FieldRepairMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with one legacy → replacement pair
    pub fn single(legacy: impl Into<String>, replacement: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(legacy, replacement);
        map
    }

    /// Add a pair, replacing any previous replacement for `legacy`
    pub fn insert(&mut self, legacy: impl Into<String>, replacement: impl Into<String>) {
        self.pairs.insert(legacy.into(), replacement.into());
    }

    /// `(legacy, replacement)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(l, r)| (l.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<L: Into<String>, R: Into<String>> FromIterator<(L, R)> for FieldRepairMap {
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (legacy, replacement) in iter {
            map.insert(legacy, replacement);
        }
        map
    }
}
