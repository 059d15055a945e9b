/// Attribute change tracking since the last load or save.
///
/// Only the value before the *first* change is kept, so `was` reports what
/// storage last held no matter how many writes followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyTracker {
    changes: Vec<(String, Option<String>)>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `attribute` is about to change from `previous`.
    pub fn mark_changed(&mut self, attribute: &str, previous: Option<String>) {
        if !self.is_changed(attribute) {
            self.changes.push((attribute.to_string(), previous));
        }
    }

    /// The value before the first change, or `None` if unchanged.
    /// The inner option is the previous value itself, which may be NULL.
    pub fn was(&self, attribute: &str) -> Option<Option<&str>> {
        self.changes
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, prev)| prev.as_deref())
    }

    pub fn is_changed(&self, attribute: &str) -> bool {
        self.changes.iter().any(|(a, _)| a == attribute)
    }

    /// Changed attributes in the order they first changed.
    pub fn changed(&self) -> Vec<&str> {
        self.changes.iter().map(|(a, _)| a.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}
