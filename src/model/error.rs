use thiserror::Error;

/// Rejection of a single activity record; aggregation fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record #{index} ({user} @ {repository}): negative {field} count {value}")]
    NegativeCount {
        index: usize,
        user: String,
        repository: String,
        field: &'static str,
        value: i64,
    },

    #[error("record #{index} ({user} @ {repository}): counts overflow the report totals")]
    CountOverflow {
        index: usize,
        user: String,
        repository: String,
    },

    #[error("record #{index} ({user} @ {repository}): repository is not mapped to any project")]
    UnknownRepository {
        index: usize,
        user: String,
        repository: String,
    },
}

impl ValidationError {
    pub fn index(&self) -> usize {
        match self {
            ValidationError::NegativeCount { index, .. } => *index,
            ValidationError::CountOverflow { index, .. } => *index,
            ValidationError::UnknownRepository { index, .. } => *index,
        }
    }
}
