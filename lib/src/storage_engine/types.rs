// lib/src/storage_engine/types.rs

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored value matched the expectation and was replaced.
    Swapped,
    /// Another writer got there first. Carries the value now stored.
    Conflict { current: Option<Vec<u8>> },
}

impl CasOutcome {
    pub fn is_swapped(&self) -> bool {
        matches!(self, CasOutcome::Swapped)
    }
}

/// Result of applying a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied,
    /// A guarded key no longer held its expected value. Nothing was written.
    Conflict { key: Vec<u8> },
}

impl BatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BatchOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
    /// Overwrites `key` only if it still holds `expected`.
    Replace { key: Vec<u8>, expected: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Insert { key, .. } | BatchOp::Replace { key, .. } | BatchOp::Remove { key } => key.as_slice(),
        }
    }

    /// The value a guarded op requires to be in place, if any.
    pub fn expected(&self) -> Option<&[u8]> {
        match self {
            BatchOp::Replace { expected, .. } => Some(expected.as_slice()),
            _ => None,
        }
    }
}

/// A set of writes applied atomically: either all land or none do.
/// `Replace` ops make the whole batch conditional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Insert { key: key.into(), value: value.into() });
    }

    pub fn replace(&mut self, key: impl Into<Vec<u8>>, expected: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Replace {
            key: key.into(),
            expected: expected.into(),
            value: value.into(),
        });
    }

    pub fn remove(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Remove { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}
