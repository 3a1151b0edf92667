use crate::model::{ActivityRecord, ProjectMap, RawActivity};
use chrono::NaiveDateTime;
use itertools::Itertools;

/// Inputs of one report run: the project mapping and the raw activity.
#[derive(Debug, Clone)]
pub struct DataAnalysis {
    pub projects: ProjectMap,
    pub activity: Vec<RawActivity>,
    pub keep_empty: bool,
}

impl DataAnalysis {
    pub fn new(projects: ProjectMap) -> Self {
        Self {
            projects,
            activity: vec![],
            keep_empty: false,
        }
    }

    pub fn keep_empty(mut self, keep_empty: bool) -> Self {
        self.keep_empty = keep_empty;
        self
    }

    pub fn insert_activity(&mut self, activity: Vec<RawActivity>) {
        self.activity.extend(activity);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: String,
    pub repositories: Vec<String>,
    pub users: Vec<String>,
    pub commits: u64,
    pub open_pull_requests: u64,
}

impl ProjectSummary {
    pub fn new(project: impl ToString) -> Self {
        Self {
            project: project.to_string(),
            repositories: vec![],
            users: vec![],
            commits: 0,
            open_pull_requests: 0,
        }
    }

    pub fn from_records(project: impl ToString, records: &[&ActivityRecord]) -> Self {
        let mut summary = Self::new(project);
        summary.repositories = distinct(records.iter().map(|r| &r.repository));
        summary.users = distinct(records.iter().map(|r| &r.user));
        summary.commits = records.iter().map(|r| r.commits).sum();
        summary.open_pull_requests = records.iter().map(|r| r.open_pull_requests).sum();
        summary
    }

    pub fn overall(&self) -> u64 {
        self.commits + self.open_pull_requests
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user: String,
    pub repositories: Vec<String>,
    pub commits: u64,
    pub open_pull_requests: u64,
}

impl UserSummary {
    pub fn new(user: impl ToString) -> Self {
        Self {
            user: user.to_string(),
            repositories: vec![],
            commits: 0,
            open_pull_requests: 0,
        }
    }

    pub fn from_records(user: impl ToString, records: &[&ActivityRecord]) -> Self {
        let mut summary = Self::new(user);
        summary.repositories = distinct(records.iter().map(|r| &r.repository));
        summary.commits = records.iter().map(|r| r.commits).sum();
        summary.open_pull_requests = records.iter().map(|r| r.open_pull_requests).sum();
        summary
    }

    pub fn overall(&self) -> u64 {
        self.commits + self.open_pull_requests
    }
}

/// Headline numbers of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub projects: usize,
    pub contributors: usize,
    pub repositories: usize,
    pub commits: u64,
    pub open_pull_requests: u64,
}

impl Totals {
    pub fn contributions(&self) -> u64 {
        self.commits + self.open_pull_requests
    }
}

/// Immutable result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSnapshot {
    pub generated_at: NaiveDateTime,
    pub projects: Vec<ProjectSummary>,
    pub users: Vec<UserSummary>,
    pub details: Vec<ActivityRecord>,
}

impl ReportSnapshot {
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn totals(&self) -> Totals {
        Totals {
            projects: self.projects.len(),
            contributors: self.users.len(),
            repositories: self.details.iter().map(|r| &r.repository).unique().count(),
            commits: self.details.iter().map(|r| r.commits).sum(),
            open_pull_requests: self.details.iter().map(|r| r.open_pull_requests).sum(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.unique().sorted().cloned().collect()
}
