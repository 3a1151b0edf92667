use crate::analyze::{DataAnalysis, ProjectSummary, ReportSnapshot, UserSummary};
use crate::model::{ActivityRecord, ValidationError};
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::cmp::Ordering;

pub trait Analyzer {
    fn analyze(&self, generated_at: NaiveDateTime) -> Result<ReportSnapshot, ValidationError>;
}

impl Analyzer for DataAnalysis {
    fn analyze(&self, generated_at: NaiveDateTime) -> Result<ReportSnapshot, ValidationError> {
        let records = ActivityRecord::validate_all(&self.activity, &self.projects).map_err(|e| {
            log::error!("Rejected activity record #{}, no report produced", e.index());
            e
        })?;
        let total = records.len();
        let records = if self.keep_empty {
            records
        } else {
            records
                .into_iter()
                .filter(|record| !record.is_empty())
                .collect::<Vec<_>>()
        };
        log::info!(
            "Validated {} activity records ({} without contributions dropped)",
            total,
            total - records.len()
        );
        aggregate(&records, generated_at)
    }
}

/// Groups validated records into a snapshot. Fails only when the counts
/// would overflow the report totals.
pub fn aggregate(
    records: &[ActivityRecord],
    generated_at: NaiveDateTime,
) -> Result<ReportSnapshot, ValidationError> {
    ActivityRecord::check_total(records)?;

    let projects = records
        .iter()
        .into_group_map_by(|record| record.project.clone())
        .into_iter()
        .map(|(project, group)| ProjectSummary::from_records(project, &group))
        .sorted_by(|a, b| by_overall_then_name(a.overall(), &a.project, b.overall(), &b.project))
        .collect::<Vec<_>>();

    let users = records
        .iter()
        .into_group_map_by(|record| record.user.clone())
        .into_iter()
        .map(|(user, group)| UserSummary::from_records(user, &group))
        .sorted_by(|a, b| by_overall_then_name(a.overall(), &a.user, b.overall(), &b.user))
        .collect::<Vec<_>>();

    let details = records
        .iter()
        .cloned()
        .sorted_by(detail_order)
        .collect::<Vec<_>>();

    log::debug!(
        "Aggregated {} records into {} projects and {} users",
        details.len(),
        projects.len(),
        users.len()
    );

    Ok(ReportSnapshot {
        generated_at,
        projects,
        users,
        details,
    })
}

fn by_overall_then_name(a_overall: u64, a_name: &str, b_overall: u64, b_name: &str) -> Ordering {
    b_overall.cmp(&a_overall).then_with(|| a_name.cmp(b_name))
}

fn detail_order(a: &ActivityRecord, b: &ActivityRecord) -> Ordering {
    a.project
        .cmp(&b.project)
        .then_with(|| b.overall().cmp(&a.overall()))
        .then_with(|| a.repository.cmp(&b.repository))
        .then_with(|| a.user.cmp(&b.user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectMap, RawActivity};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn apache_projects() -> ProjectMap {
        let mut map = ProjectMap::new();
        map.insert(
            "Apache HBase",
            vec!["apache/hbase", "apache/hbase-connectors", "apache/hbase-operator-tools"],
        )
        .unwrap();
        map.insert("Apache Phoenix", vec!["apache/phoenix", "apache/phoenix-omid", "apache/phoenix-queryserver"])
            .unwrap();
        map.insert("Apache Pinot", vec!["apache/pinot", "apache/pinot-site"])
            .unwrap();
        map.insert("Apache Zookeeper", vec!["apache/zookeeper", "apache/zookeeper-site"])
            .unwrap();
        map.insert("Apache Hadoop", vec!["apache/hadoop", "apache/hadoop-thirdparty"])
            .unwrap();
        map
    }

    #[test]
    fn sums_records_of_one_project_and_user() {
        let records = vec![
            ActivityRecord::new("userA", "repoX", "P1", 76, 5),
            ActivityRecord::new("userA", "repoY", "P1", 7, 1),
        ];
        let snapshot = aggregate(&records, at()).unwrap();

        assert_eq!(snapshot.projects.len(), 1);
        let project = &snapshot.projects[0];
        assert_eq!(project.project, "P1");
        assert_eq!((project.commits, project.open_pull_requests, project.overall()), (83, 6, 89));
        assert_eq!(project.repositories, vec!["repoX", "repoY"]);

        assert_eq!(snapshot.users.len(), 1);
        let user = &snapshot.users[0];
        assert_eq!(user.user, "userA");
        assert_eq!((user.commits, user.open_pull_requests, user.overall()), (83, 6, 89));
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        let snapshot = aggregate(&[], at()).unwrap();

        assert!(snapshot.is_empty());
        assert!(snapshot.projects.is_empty());
        assert!(snapshot.users.is_empty());
        let totals = snapshot.totals();
        assert_eq!(totals.contributions(), 0);
        assert_eq!(totals.repositories, 0);
        assert_eq!(totals.projects, 0);
    }

    #[test]
    fn totals_are_conserved_across_groupings() {
        let records = vec![
            ActivityRecord::new("alice", "apache/hbase", "Apache HBase", 40, 2),
            ActivityRecord::new("bob", "apache/hbase", "Apache HBase", 3, 0),
            ActivityRecord::new("alice", "apache/pinot", "Apache Pinot", 11, 4),
            ActivityRecord::new("carol", "apache/zookeeper", "Apache Zookeeper", 0, 1),
            ActivityRecord::new("bob", "apache/phoenix", "Apache Phoenix", 17, 6),
        ];
        let snapshot = aggregate(&records, at()).unwrap();

        let raw: u64 = records.iter().map(ActivityRecord::overall).sum();
        let by_project: u64 = snapshot.projects.iter().map(ProjectSummary::overall).sum();
        let by_user: u64 = snapshot.users.iter().map(UserSummary::overall).sum();
        assert_eq!(raw, 84);
        assert_eq!(by_project, raw);
        assert_eq!(by_user, raw);
        assert_eq!(snapshot.totals().contributions(), raw);
    }

    #[test]
    fn groups_sort_by_overall_desc_then_name() {
        let records = vec![
            ActivityRecord::new("zed", "r1", "Small", 20, 3),
            ActivityRecord::new("amy", "r2", "Big", 100, 9),
            ActivityRecord::new("bea", "r3", "Also Small", 23, 0),
        ];
        let snapshot = aggregate(&records, at()).unwrap();

        let projects = snapshot
            .projects
            .iter()
            .map(|p| (p.project.as_str(), p.overall()))
            .collect::<Vec<_>>();
        assert_eq!(projects, vec![("Big", 109), ("Also Small", 23), ("Small", 23)]);

        let users = snapshot.users.iter().map(|u| u.user.as_str()).collect::<Vec<_>>();
        assert_eq!(users, vec!["amy", "bea", "zed"]);
    }

    #[test]
    fn details_sort_by_project_then_overall_desc() {
        let records = vec![
            ActivityRecord::new("alice", "apache/pinot", "Apache Pinot", 1, 0),
            ActivityRecord::new("alice", "apache/hbase", "Apache HBase", 2, 0),
            ActivityRecord::new("bob", "apache/hbase-connectors", "Apache HBase", 9, 1),
        ];
        let snapshot = aggregate(&records, at()).unwrap();

        let order = snapshot
            .details
            .iter()
            .map(|r| r.repository.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["apache/hbase-connectors", "apache/hbase", "apache/pinot"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            ActivityRecord::new("alice", "apache/hbase", "Apache HBase", 5, 5),
            ActivityRecord::new("bob", "apache/pinot", "Apache Pinot", 5, 5),
            ActivityRecord::new("carol", "apache/hadoop", "Apache Hadoop", 5, 5),
        ];
        assert_eq!(aggregate(&records, at()).unwrap(), aggregate(&records, at()).unwrap());
    }

    #[test]
    fn counts_distinct_repositories() {
        let repositories = [
            ("apache/hbase", "Apache HBase"),
            ("apache/hbase-connectors", "Apache HBase"),
            ("apache/hbase-operator-tools", "Apache HBase"),
            ("apache/phoenix", "Apache Phoenix"),
            ("apache/phoenix-omid", "Apache Phoenix"),
            ("apache/phoenix-queryserver", "Apache Phoenix"),
            ("apache/pinot", "Apache Pinot"),
            ("apache/pinot-site", "Apache Pinot"),
            ("apache/zookeeper", "Apache Zookeeper"),
            ("apache/zookeeper-site", "Apache Zookeeper"),
            ("apache/hadoop", "Apache Hadoop"),
            ("apache/hadoop-thirdparty", "Apache Hadoop"),
        ];
        let records = repositories
            .iter()
            .flat_map(|(repo, project)| {
                ["alice", "bob", "carol"]
                    .into_iter()
                    .map(move |user| ActivityRecord::new(user, repo, project, 1, 1))
            })
            .collect::<Vec<_>>();
        let totals = aggregate(&records, at()).unwrap().totals();

        assert_eq!(records.len(), 36);
        assert_eq!(totals.repositories, 12);
        assert_eq!(totals.projects, 5);
        assert_eq!(totals.contributors, 3);
    }

    #[test]
    fn spellings_of_one_repository_count_once() {
        let mut analysis = DataAnalysis::new(apache_projects());
        analysis.insert_activity(vec![
            RawActivity::new("alice", "apache/hbase", 3, 1),
            RawActivity::new("bob", "Apache/HBase", 2, 0),
            RawActivity::new("alice", " APACHE/hbase ", 1, 0),
        ]);
        let snapshot = analysis.analyze(at()).unwrap();

        assert_eq!(snapshot.totals().repositories, 1);
        assert_eq!(snapshot.projects[0].repositories, vec!["apache/hbase"]);
        assert_eq!(snapshot.users[0].repositories, vec!["apache/hbase"]);
        assert_eq!(snapshot.users[1].repositories, vec!["apache/hbase"]);
        assert_eq!(snapshot.totals().contributions(), 7);
    }

    #[test]
    fn overflowing_counts_are_rejected_not_summed() {
        let huge = i64::MAX as u64;
        let records = vec![
            ActivityRecord::new("alice", "apache/hbase", "Apache HBase", huge, 0),
            ActivityRecord::new("bob", "apache/hbase", "Apache HBase", huge, 0),
            ActivityRecord::new("carol", "apache/hbase", "Apache HBase", huge, 0),
        ];
        let err = aggregate(&records, at()).unwrap_err();

        assert!(matches!(err, ValidationError::CountOverflow { index: 2, .. }));
    }

    #[test]
    fn analyze_rejects_overflowing_activity() {
        let mut analysis = DataAnalysis::new(apache_projects());
        analysis.insert_activity(vec![
            RawActivity::new("alice", "apache/hbase", i64::MAX, 0),
            RawActivity::new("bob", "apache/pinot", i64::MAX, 0),
            RawActivity::new("carol", "apache/hadoop", i64::MAX, 0),
        ]);
        let err = analysis.analyze(at()).unwrap_err();

        assert_eq!(err.index(), 2);
        assert!(err.to_string().contains("apache/hadoop"));
    }

    #[test]
    fn analyze_validates_and_drops_empty_records() {
        let mut analysis = DataAnalysis::new(apache_projects());
        analysis.insert_activity(vec![
            RawActivity::new("Alice", "apache/hbase", 76, 5),
            RawActivity::new("alice", "apache/hbase-connectors", 7, 1),
            RawActivity::new("bob", "apache/pinot", 0, 0),
        ]);
        let snapshot = analysis.analyze(at()).unwrap();

        assert_eq!(snapshot.details.len(), 2);
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].overall(), 89);
        assert_eq!(snapshot.totals().projects, 1);
    }

    #[test]
    fn analyze_keeps_empty_records_on_request() {
        let mut analysis = DataAnalysis::new(apache_projects()).keep_empty(true);
        analysis.insert_activity(vec![
            RawActivity::new("alice", "apache/hbase", 3, 0),
            RawActivity::new("bob", "apache/pinot", 0, 0),
        ]);
        let snapshot = analysis.analyze(at()).unwrap();

        assert_eq!(snapshot.details.len(), 2);
        assert_eq!(snapshot.totals().repositories, 2);
        assert_eq!(snapshot.totals().contributions(), 3);
    }

    #[test]
    fn analyze_rejects_malformed_record() {
        let mut analysis = DataAnalysis::new(apache_projects());
        analysis.insert_activity(vec![
            RawActivity::new("alice", "apache/hbase", 3, 0),
            RawActivity::new("alice", "apache/kafka", 3, 0),
        ]);
        let err = analysis.analyze(at()).unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnknownRepository {
                index: 1,
                user: "alice".to_string(),
                repository: "apache/kafka".to_string(),
            }
        );
    }
}
