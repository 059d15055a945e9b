/// Lifecycle of one field's plaintext cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldState {
    /// Nothing decrypted since load or reload.
    #[default]
    Unloaded,
    /// Plaintext cached; the ciphertext column already matches it.
    PlaintextLoaded(Option<String>),
    /// Plaintext assigned; the next save must encrypt it.
    PendingEncryption(Option<String>),
}

impl FieldState {
    /// The cached plaintext, if any has been resolved. The inner option is
    /// the value itself, which may be absent.
    pub fn cached(&self) -> Option<Option<&str>> {
        match self {
            Self::Unloaded => None,
            Self::PlaintextLoaded(v) | Self::PendingEncryption(v) => Some(v.as_deref()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingEncryption(_))
    }

    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }
}

/// Per-record field states, indexed by descriptor position in the class's
/// effective field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    states: Vec<FieldState>,
}

impl StateTable {
    /// Every field `Unloaded`.
    pub fn unloaded(len: usize) -> Self {
        Self {
            states: vec![FieldState::Unloaded; len],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, index: usize) -> &FieldState {
        &self.states[index]
    }

    pub fn mark_pending(&mut self, index: usize, value: Option<String>) {
        self.states[index] = FieldState::PendingEncryption(value);
    }

    pub fn mark_loaded(&mut self, index: usize, value: Option<String>) {
        self.states[index] = FieldState::PlaintextLoaded(value);
    }

    pub fn invalidate(&mut self, index: usize) {
        self.states[index] = FieldState::Unloaded;
    }

    pub fn cached(&self, index: usize) -> Option<Option<&str>> {
        self.states[index].cached()
    }

    pub fn is_pending(&self, index: usize) -> bool {
        self.states[index].is_pending()
    }

    /// Pending fields with their plaintext, in declaration order.
    pub fn pending(&self) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
        self.states.iter().enumerate().filter_map(|(i, s)| match s {
            FieldState::PendingEncryption(v) => Some((i, v.as_deref())),
            _ => None,
        })
    }

    pub fn invalidate_all(&mut self) {
        self.states.fill(FieldState::Unloaded);
    }
}
