mod analyze;
mod model;
mod report;
mod utils;

use crate::analyze::{Analyzer, DataAnalysis, ReportSnapshot};
use crate::report::chart::{ChartSeries, PROJECT_CHART, USER_CHART};
use crate::report::dump::dump_records;
use crate::report::markdown::MarkdownReport;
use crate::utils::MultiProgressNew;
use chrono::Local;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use model::{ProjectMap, RawActivity, Result};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(about = "Render a Markdown report of open-source contributions")]
struct Args {
    #[arg(long = "projects", default_value = "projects.json")]
    projects_path: String,
    #[arg(long = "activity", default_value = "activity.json")]
    activity_path: String,
    #[arg(long = "output-dir", default_value = "output")]
    output_dir: PathBuf,
    #[arg(long = "report", default_value = "github_contributions_report.md")]
    report_name: String,
    /// Collapse users below this percentage of the top contributor into `Other`.
    #[arg(long = "other-percentage")]
    other_percentage: Option<f64>,
    /// Keep records without any commit or open pull request.
    #[arg(long = "keep-empty")]
    keep_empty: bool,
    /// Write the validated records next to the report.
    #[arg(long = "dump")]
    dump: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args).await {
        log::error!("An error occurred: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let (projects, activity) = match parse_configs(args).await {
        (Ok(projects), Ok(activity)) => (projects, activity),
        (Err(e), _) | (_, Err(e)) => {
            log_input_format();
            return Err(e);
        }
    };
    if projects.is_empty() {
        log::warn!("No projects configured in `{}`", args.projects_path);
    }
    for (project, repositories) in projects.projects() {
        log::debug!("Project `{}`: {}", project, repositories.join(", "));
    }
    log::info!(
        "Loaded {} projects and {} activity records",
        projects.len(),
        activity.len()
    );

    let mut data_analysis = DataAnalysis::new(projects).keep_empty(args.keep_empty);
    data_analysis.insert_activity(activity);
    let snapshot = data_analysis.analyze(Local::now().naive_local())?;

    let totals = snapshot.totals();
    log::info!(
        "{} contributions ({} commits, {} open pull requests) across {} repositories",
        totals.contributions(),
        totals.commits,
        totals.open_pull_requests,
        totals.repositories
    );

    snapshot.report_create(&args.output_dir, &args.report_name)?;
    write_charts(&snapshot, &args.output_dir, args.other_percentage)?;
    if args.dump {
        dump_records(&args.output_dir, &snapshot.details)?;
    }

    Ok(())
}

async fn parse_configs(args: &Args) -> (Result<ProjectMap>, Result<Vec<RawActivity>>) {
    async fn parse_config<T, F, C>(path: &str, pb: &ProgressBar, parser: F, count: C) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
        C: Fn(&T) -> usize,
    {
        pb.set_message(format!("Read file `{}` ...", path));
        match parser(path) {
            Ok(value) => {
                pb.finish_with_message(format!(
                    "✅ Completed parsing file `{}` (find {} elements)",
                    path,
                    count(&value)
                ));
                Ok(value)
            }
            Err(e) => {
                pb.abandon_with_message(format!("❌ Failed parsing file `{}`", path));
                Err(format!("{}: {}", path, e).into())
            }
        }
    }

    let multi_progress = MultiProgress::default();
    let projects_pb = multi_progress.add_spinner("Waiting".to_string());
    let activity_pb = multi_progress.add_spinner("Waiting".to_string());

    futures::join!(
        parse_config(
            &args.projects_path,
            &projects_pb,
            ProjectMap::from_config,
            ProjectMap::len
        ),
        parse_config(
            &args.activity_path,
            &activity_pb,
            RawActivity::from_config,
            Vec::len
        ),
    )
}

fn write_charts(snapshot: &ReportSnapshot, output_dir: &Path, other: Option<f64>) -> Result<()> {
    ChartSeries::projects(snapshot).write(output_dir, &PROJECT_CHART)?;

    let users = ChartSeries::users(snapshot);
    let users = match other {
        Some(percentage) => users.collapse_other(percentage),
        None => users,
    };
    users.write(output_dir, &USER_CHART)?;
    Ok(())
}

fn log_input_format() {
    log::info!(
        "Expected projects file format:\n{}",
        r#"{ "Project 1": { "repositories": ["owner1/repo1", "owner1/repo2"] }, "Project 2": { "repositories": ["owner2/repo3"] } }"#
    );
    log::info!(
        "Expected activity file format:\n{}",
        r#"[ { "user": "user1", "repository": "owner1/repo1", "commits": 3, "openPullRequests": 1 } ]"#
    );
}
