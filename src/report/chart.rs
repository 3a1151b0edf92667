use crate::analyze::ReportSnapshot;
use crate::model::Result;
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_CHART: ChartFile = ChartFile {
    stem: "project_wise_contribution",
    title: "Project wise Contributions",
};
pub const USER_CHART: ChartFile = ChartFile {
    stem: "user_wise_contribution",
    title: "User wise Contributions",
};

pub const OTHER_LABEL: &str = "Other";

/// Where a chart's series is handed off and where its rendered image is
/// expected to appear.
#[derive(Debug, Clone, Copy)]
pub struct ChartFile {
    pub stem: &'static str,
    pub title: &'static str,
}

impl ChartFile {
    pub fn image(&self) -> String {
        format!("{}.png", self.stem)
    }

    pub fn series(&self) -> String {
        format!("{}.json", self.stem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

impl ChartPoint {
    pub fn new(label: impl ToString, value: u64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }

    pub fn legend(&self, total: u64) -> String {
        let share = if total == 0 {
            0.0
        } else {
            self.value as f64 * 100.0 / total as f64
        };
        format!("{} - {} ({:.2}%)", self.label, self.value, share)
    }
}

/// (label, value) series consumed by the external chart renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub image: String,
    pub total: u64,
    pub points: Vec<ChartPoint>,
    pub legend: Vec<String>,
}

impl ChartSeries {
    pub fn new(file: &ChartFile, points: Vec<ChartPoint>) -> Self {
        Self::with_points(file.title.to_string(), file.image(), points)
    }

    fn with_points(title: String, image: String, points: Vec<ChartPoint>) -> Self {
        let total = points.iter().map(|p| p.value).sum();
        let legend = points.iter().map(|p| p.legend(total)).collect();
        Self {
            title,
            image,
            total,
            points,
            legend,
        }
    }

    pub fn projects(snapshot: &ReportSnapshot) -> Self {
        let points = snapshot
            .projects
            .iter()
            .map(|p| ChartPoint::new(&p.project, p.overall()))
            .collect();
        Self::new(&PROJECT_CHART, points)
    }

    pub fn users(snapshot: &ReportSnapshot) -> Self {
        let points = snapshot
            .users
            .iter()
            .map(|u| ChartPoint::new(&u.user, u.overall()))
            .collect();
        Self::new(&USER_CHART, points)
    }

    /// Merges every point below `percentage`% of the largest value into a
    /// single `Other` point.
    pub fn collapse_other(self, percentage: f64) -> Self {
        let max = self.points.iter().map(|p| p.value).max().unwrap_or(0);
        let threshold = max as f64 * percentage / 100.0;
        let (small, mut points): (Vec<_>, Vec<_>) = self
            .points
            .into_iter()
            .partition(|p| (p.value as f64) < threshold);
        if small.is_empty() {
            return Self::with_points(self.title, self.image, points);
        }

        log::debug!(
            "Collapsing {} entries of `{}` below {}% of max into `{}`",
            small.len(),
            self.title,
            percentage,
            OTHER_LABEL
        );
        let other = small.iter().map(|p| p.value).sum();
        points.push(ChartPoint::new(OTHER_LABEL, other));
        let points = points
            .into_iter()
            .sorted_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)))
            .collect();
        Self::with_points(self.title, self.image, points)
    }

    /// Hands the series off to the chart renderer as `<stem>.json` in `output_dir`.
    pub fn write(&self, output_dir: &Path, file: &ChartFile) -> Result<PathBuf> {
        let path = output_dir.join(file.series());
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        log::info!("Chart series `{}` written: {}", self.title, path.display());
        Ok(path)
    }
}
