//! In-memory offset index
//!
//! A log is either empty or holds a contiguous run of records starting at some
//! logical index. The offset of record `start + k` lives at `offsets[k]`.

/// Logical contents of a log store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogState {
    /// No records yet
    Empty {
        /// Index the first appended record will receive
        base: u64,
    },
    /// At least one record
    NonEmpty {
        /// Logical index of the first record
        start: u64,
        /// Starting byte offset of each record, in logical order
        offsets: Vec<u64>,
    },
}

impl LogState {
    /// An empty log whose first record will be `base`
    pub fn empty(base: u64) -> Self {
        Self::Empty { base }
    }

    /// Record a new entry at byte `offset` and return its logical index.
    ///
    /// Returns `None`, leaving the state untouched, when the entry's index
    /// would not fit in a `u64`.
    pub fn push(&mut self, offset: u64) -> Option<u64> {
        match self {
            Self::Empty { base } => {
                let start = *base;
                *self = Self::NonEmpty {
                    start,
                    offsets: vec![offset],
                };
                Some(start)
            }
            Self::NonEmpty { start, offsets } => {
                let index = start.checked_add(offsets.len() as u64)?;
                offsets.push(offset);
                Some(index)
            }
        }
    }

    pub fn start_index(&self) -> Option<u64> {
        match self {
            Self::Empty { .. } => None,
            Self::NonEmpty { start, .. } => Some(*start),
        }
    }

    pub fn last_index(&self) -> Option<u64> {
        match self {
            Self::Empty { .. } => None,
            // `offsets` is never empty and `push` refuses indices past u64::MAX
            Self::NonEmpty { start, offsets } => Some(*start + (offsets.len() as u64 - 1)),
        }
    }

    /// Index the next appended record will receive, `None` once the index
    /// space is exhausted
    pub fn next_index(&self) -> Option<u64> {
        match self {
            Self::Empty { base } => Some(*base),
            Self::NonEmpty { start, offsets } => start.checked_add(offsets.len() as u64),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty { .. } => 0,
            Self::NonEmpty { offsets, .. } => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Byte offset of logical record `index`, if it is held by this log
    pub fn offset_of(&self, index: u64) -> Option<u64> {
        match self {
            Self::Empty { .. } => None,
            Self::NonEmpty { start, offsets } => {
                let k = index.checked_sub(*start)?;
                offsets.get(usize::try_from(k).ok()?).copied()
            }
        }
    }
}
