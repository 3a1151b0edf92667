use crate::model::Result;
use indexmap::IndexMap;
use serde_json::{from_str, Value};
use std::fs;

/// Static repository → project mapping, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMap {
    projects: IndexMap<String, Vec<String>>,
    // normalised key -> (project, repository as declared)
    by_repository: IndexMap<String, (String, String)>,
}

// Create
impl ProjectMap {
    pub fn from_config(path: &str) -> Result<Self> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        project: impl ToString,
        repositories: Vec<impl ToString>,
    ) -> Result<()> {
        let project = project.to_string();
        let repositories = repositories
            .into_iter()
            .map(|repository| repository.to_string().trim().to_string())
            .collect::<Vec<_>>();

        let mut seen = IndexMap::new();
        for repository in &repositories {
            let key = repository_key(repository);
            let existing = self
                .by_repository
                .get(&key)
                .map(|(existing, _)| existing.as_str())
                .or_else(|| seen.get(&key).map(|_| project.as_str()));
            if let Some(existing) = existing {
                return Err(format!(
                    "Repository `{repository}` is mapped to both `{existing}` and `{project}`"
                )
                .into());
            }
            seen.insert(key, repository);
        }

        for (key, repository) in seen {
            self.by_repository
                .insert(key, (project.clone(), repository.clone()));
        }
        self.projects.entry(project).or_default().extend(repositories);
        Ok(())
    }
}

// Query
impl ProjectMap {
    pub fn project_of(&self, repository: &str) -> Option<&str> {
        self.resolve(repository).map(|(project, _)| project)
    }

    /// Project and declared spelling of `repository`, matched ignoring case.
    pub fn resolve(&self, repository: &str) -> Option<(&str, &str)> {
        self.by_repository
            .get(&repository_key(repository))
            .map(|(project, declared)| (project.as_str(), declared.as_str()))
    }

    pub fn projects(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

// Parser
impl ProjectMap {
    fn parse(json_str: &str) -> Result<Self> {
        let elements: IndexMap<String, Value> = from_str(json_str)?;
        let mut result = Self::new();
        for (name, details) in elements {
            let repositories = match details["repositories"].as_array() {
                Some(list) => list
                    .iter()
                    .filter_map(|repo| repo.as_str().map(String::from))
                    .collect::<Vec<_>>(),
                None => return Err(format!("Not found 'repositories' field in `{name}`").into()),
            };
            result.insert(name, repositories)?;
        }
        Ok(result)
    }
}

pub(crate) fn repository_key(repository: &str) -> String {
    repository.trim().to_lowercase()
}
