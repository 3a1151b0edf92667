use crate::analyze::{ProjectSummary, ReportSnapshot, Totals, UserSummary};
use crate::model::{ActivityRecord, Result};
use crate::report::chart::{ChartFile, PROJECT_CHART, USER_CHART};
use markdown_builder::Markdown;
use markdown_table::{Heading, HeadingAlignment, MarkdownTable};
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "OpenSource Contributions Report";
pub const NO_CONTRIBUTIONS: &str = "No contributions found for the given users.";

const COMMITS: &str = "Commits";
const OPEN_PULL_REQUESTS: &str = "Pull Requests (Open)";
const OVERALL: &str = "Overall Contribution";

pub trait MarkdownReport {
    fn report_render(&self) -> Result<String>;
    fn report_create(&self, output_dir: &Path, report_name: &str) -> Result<PathBuf>;
}

impl MarkdownReport for ReportSnapshot {
    fn report_render(&self) -> Result<String> {
        let mut doc = Markdown::new();

        doc.header1(REPORT_TITLE);
        doc.paragraph(format!(
            "Report auto-generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        doc.add_summary(&self.totals())?;
        doc.add_charts(&[PROJECT_CHART, USER_CHART]);

        if self.is_empty() {
            doc.paragraph(NO_CONTRIBUTIONS.to_string());
        } else {
            doc.add_projects(&self.projects)?;
            doc.add_users(&self.users)?;
            doc.add_details(&self.details)?;
        }

        Ok(doc.render())
    }

    fn report_create(&self, output_dir: &Path, report_name: &str) -> Result<PathBuf> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
            log::info!("Created output directory: {}", output_dir.display());
        }
        let path = output_dir.join(report_name);
        fs::write(&path, self.report_render()?)?;
        log::info!("Markdown report created: {}", path.display());
        Ok(path)
    }
}

trait MarkdownExt {
    fn add_summary(&mut self, totals: &Totals) -> Result<()>;
    fn add_charts(&mut self, charts: &[ChartFile]);
    fn add_projects(&mut self, projects: &[ProjectSummary]) -> Result<()>;
    fn add_users(&mut self, users: &[UserSummary]) -> Result<()>;
    fn add_details(&mut self, details: &[ActivityRecord]) -> Result<()>;
    fn add_table(&mut self, headings: &[&str], rows: Vec<Vec<String>>) -> Result<()>;
}

impl MarkdownExt for Markdown {
    fn add_summary(&mut self, totals: &Totals) -> Result<()> {
        self.header2("Overall Summary");

        let mut rows = vec![vec![
            "Total number of projects".to_string(),
            totals.projects.to_string(),
        ]];
        if totals.contributors > 1 {
            rows.push(vec![
                "Total number of contributors".to_string(),
                totals.contributors.to_string(),
            ]);
        }
        rows.push(vec![
            "Total number of repositories".to_string(),
            totals.repositories.to_string(),
        ]);
        rows.push(vec![
            "Total number of contributions".to_string(),
            totals.contributions().to_string(),
        ]);
        rows.push(vec![
            "Number of commits".to_string(),
            totals.commits.to_string(),
        ]);
        rows.push(vec![
            "Number of pull requests (Open)".to_string(),
            totals.open_pull_requests.to_string(),
        ]);

        self.add_table(&["Metric", "Value"], rows)
    }

    fn add_charts(&mut self, charts: &[ChartFile]) {
        let images = charts
            .iter()
            .map(|chart| {
                format!(
                    "  <img src=\"{}\" alt=\"{}\" style=\"width:45%;\">",
                    chart.image(),
                    chart.title
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.paragraph(format!(
            "<div style=\"display: flex; justify-content: space-around;\">\n{images}\n</div>"
        ));
    }

    fn add_projects(&mut self, projects: &[ProjectSummary]) -> Result<()> {
        self.header2("Summary of Contributions by each project");

        let rows = projects
            .iter()
            .map(|project| {
                vec![
                    project.project.clone(),
                    project.repositories.join("<br>"),
                    project.users.join("<br>"),
                    project.commits.to_string(),
                    project.open_pull_requests.to_string(),
                    project.overall().to_string(),
                ]
            })
            .collect::<Vec<_>>();

        self.add_table(
            &["Project Name", "Repositories", "Users", COMMITS, OPEN_PULL_REQUESTS, OVERALL],
            rows,
        )
    }

    fn add_users(&mut self, users: &[UserSummary]) -> Result<()> {
        self.header2("Summary of Contributions by each user");

        let rows = users
            .iter()
            .map(|user| {
                vec![
                    user.user.clone(),
                    user.repositories.join("<br>"),
                    user.commits.to_string(),
                    user.open_pull_requests.to_string(),
                    user.overall().to_string(),
                ]
            })
            .collect::<Vec<_>>();

        self.add_table(
            &["User", "Repositories", COMMITS, OPEN_PULL_REQUESTS, OVERALL],
            rows,
        )
    }

    fn add_details(&mut self, details: &[ActivityRecord]) -> Result<()> {
        self.header2("Detailed Contributions");

        let rows = details
            .iter()
            .map(|record| {
                vec![
                    record.project.clone(),
                    record.repository.clone(),
                    record.user.clone(),
                    record.commits.to_string(),
                    record.open_pull_requests.to_string(),
                    record.overall().to_string(),
                ]
            })
            .collect::<Vec<_>>();

        self.add_table(
            &["Project Name", "Repository", "User", COMMITS, OPEN_PULL_REQUESTS, OVERALL],
            rows,
        )
    }

    fn add_table(&mut self, headings: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let headings = headings
            .iter()
            .map(|label| {
                let alignment = match *label {
                    COMMITS | OPEN_PULL_REQUESTS | OVERALL => Some(HeadingAlignment::Center),
                    _ => None,
                };
                Heading::new(label.to_string(), alignment)
            })
            .collect::<Vec<_>>();

        let rows = rows
            .into_iter()
            .map(|row| row.iter().map(|cell| escape_cell(cell)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let mut table = MarkdownTable::new(rows);
        table.with_headings(headings);
        let rendered = table
            .as_markdown()
            .map_err(|e| format!("Could not render table: {e:?}"))?;
        self.paragraph(rendered);
        Ok(())
    }
}

/// Keeps a cell on one table row: pipes are escaped, line breaks become `<br>`.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}
