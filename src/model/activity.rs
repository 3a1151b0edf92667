use crate::model::{ProjectMap, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fs;

/// Activity counts as supplied by the source, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    pub user: String,
    pub repository: String,
    #[serde(default)]
    pub commits: i64,
    #[serde(default)]
    pub open_pull_requests: i64,
}

// Create
impl RawActivity {
    pub fn from_config(path: &str) -> Result<Vec<Self>> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }

    pub fn new(
        user: impl ToString,
        repository: impl ToString,
        commits: i64,
        open_pull_requests: i64,
    ) -> Self {
        Self {
            user: user.to_string(),
            repository: repository.to_string(),
            commits,
            open_pull_requests,
        }
    }

    fn parse(json_str: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json_str)?)
    }
}

/// One validated (user, repository) row. The overall contribution is always
/// derived from the two counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityRecord {
    pub user: String,
    pub repository: String,
    pub project: String,
    pub commits: u64,
    pub open_pull_requests: u64,
}

impl ActivityRecord {
    pub fn new(
        user: impl ToString,
        repository: impl ToString,
        project: impl ToString,
        commits: u64,
        open_pull_requests: u64,
    ) -> Self {
        Self {
            user: user.to_string(),
            repository: repository.to_string(),
            project: project.to_string(),
            commits,
            open_pull_requests,
        }
    }

    pub fn overall(&self) -> u64 {
        self.commits + self.open_pull_requests
    }

    pub fn is_empty(&self) -> bool {
        self.overall() == 0
    }

    pub fn to_raw(&self) -> RawActivity {
        RawActivity::new(
            &self.user,
            &self.repository,
            self.commits as i64,
            self.open_pull_requests as i64,
        )
    }
}

// Validation
impl ActivityRecord {
    pub fn validate(
        index: usize,
        raw: &RawActivity,
        projects: &ProjectMap,
    ) -> std::result::Result<Self, ValidationError> {
        let user = raw.user.trim().to_lowercase();
        let repository = raw.repository.trim().to_string();

        let count = |field: &'static str, value: i64| {
            u64::try_from(value).map_err(|_| ValidationError::NegativeCount {
                index,
                user: user.clone(),
                repository: repository.clone(),
                field,
                value,
            })
        };
        let commits = count("commits", raw.commits)?;
        let open_pull_requests = count("openPullRequests", raw.open_pull_requests)?;

        let Some((project, declared)) = projects.resolve(&repository) else {
            return Err(ValidationError::UnknownRepository {
                index,
                user,
                repository,
            });
        };

        Ok(Self::new(
            user,
            declared,
            project,
            commits,
            open_pull_requests,
        ))
    }

    /// Validates every record, failing on the first malformed one.
    pub fn validate_all(
        raws: &[RawActivity],
        projects: &ProjectMap,
    ) -> std::result::Result<Vec<Self>, ValidationError> {
        let records = raws
            .iter()
            .enumerate()
            .map(|(index, raw)| Self::validate(index, raw, projects))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::check_total(&records)?;
        Ok(records)
    }

    /// Fails when the grand total of all counts does not fit in `u64`. Every
    /// per-group sum is bounded by that total.
    pub fn check_total(records: &[Self]) -> std::result::Result<u64, ValidationError> {
        records.iter().enumerate().try_fold(0u64, |total, (index, record)| {
            total
                .checked_add(record.commits)
                .and_then(|total| total.checked_add(record.open_pull_requests))
                .ok_or_else(|| ValidationError::CountOverflow {
                    index,
                    user: record.user.clone(),
                    repository: record.repository.clone(),
                })
        })
    }
}
