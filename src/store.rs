// Persistent ledger state behind an explicit repository.
//
// `Dataset` holds the three tables and their in-memory edits. `DataStore`
// pairs it with a `Repository` and writes every mutation through, returning
// the save result to the caller.
use crate::error::{Error, Result};
use crate::types::{FundingRecord, KeyProject, ProjectInfo};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub project_info: Vec<ProjectInfo>,
    pub funding_arrangement: Vec<FundingRecord>,
    pub key_projects: Vec<KeyProject>,
}

fn check_index(collection: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange {
            collection,
            index,
            len,
        })
    }
}

impl Dataset {
    pub fn add_project_info(&mut self, project: ProjectInfo) {
        self.project_info.push(project);
    }

    pub fn update_project_info(&mut self, index: usize, project: ProjectInfo) -> Result<()> {
        check_index("projectInfo", index, self.project_info.len())?;
        self.project_info[index] = project;
        Ok(())
    }

    pub fn delete_project_info(&mut self, index: usize) -> Result<ProjectInfo> {
        check_index("projectInfo", index, self.project_info.len())?;
        Ok(self.project_info.remove(index))
    }

    pub fn add_funding(&mut self, funding: FundingRecord) {
        self.funding_arrangement.push(funding);
    }

    pub fn update_funding(&mut self, index: usize, funding: FundingRecord) -> Result<()> {
        check_index("fundingArrangement", index, self.funding_arrangement.len())?;
        self.funding_arrangement[index] = funding;
        Ok(())
    }

    pub fn delete_funding(&mut self, index: usize) -> Result<FundingRecord> {
        check_index("fundingArrangement", index, self.funding_arrangement.len())?;
        Ok(self.funding_arrangement.remove(index))
    }

    pub fn project_by_code(&self, project_code: &str) -> Option<&ProjectInfo> {
        self.project_info
            .iter()
            .find(|p| p.project_code == project_code)
    }

    pub fn funding_by_project_code(&self, project_code: &str) -> Vec<&FundingRecord> {
        self.funding_arrangement
            .iter()
            .filter(|f| f.project_code == project_code)
            .collect()
    }
}

pub trait Repository {
    fn load(&self) -> Result<Dataset>;
    fn save(&self, data: &Dataset) -> Result<()>;
}

/// Dataset serialized as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Repository for JsonFileRepository {
    /// A missing file is an empty dataset; unreadable or corrupt files are errors.
    fn load(&self) -> Result<Dataset> {
        let s = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                return Ok(Dataset::default());
            }
            Err(e) => return Err(Error::io(e, &self.path)),
        };
        let data: Dataset = serde_json::from_str(&s)?;
        info!(
            path = %self.path.display(),
            projects = data.project_info.len(),
            funding = data.funding_arrangement.len(),
            key_projects = data.key_projects.len(),
            "store loaded"
        );
        Ok(data)
    }

    fn save(&self, data: &Dataset) -> Result<()> {
        let s = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, s).map_err(|e| Error::io(e, &self.path))?;
        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }
}

/// Repository kept in memory; used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: RefCell<Dataset>,
}

impl MemoryRepository {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: RefCell::new(data),
        }
    }
}

impl Repository for MemoryRepository {
    fn load(&self) -> Result<Dataset> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, data: &Dataset) -> Result<()> {
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}

/// Dataset plus the repository it persists to.
pub struct DataStore<R: Repository> {
    repo: R,
    data: Dataset,
}

impl<R: Repository> DataStore<R> {
    pub fn open(repo: R) -> Result<Self> {
        let data = repo.load()?;
        Ok(Self { repo, data })
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn save(&self) -> Result<()> {
        self.repo.save(&self.data)
    }

    // Apply an edit, then persist. The in-memory edit stays even if the save
    // fails, so the caller can retry `save`.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Dataset) -> Result<T>) -> Result<T> {
        let out = f(&mut self.data)?;
        self.save()?;
        Ok(out)
    }

    pub fn project_info(&self) -> &[ProjectInfo] {
        &self.data.project_info
    }

    pub fn set_project_info(&mut self, rows: Vec<ProjectInfo>) -> Result<()> {
        self.mutate(|d| {
            d.project_info = rows;
            Ok(())
        })
    }

    pub fn add_project_info(&mut self, project: ProjectInfo) -> Result<()> {
        self.mutate(|d| {
            d.add_project_info(project);
            Ok(())
        })
    }

    pub fn update_project_info(&mut self, index: usize, project: ProjectInfo) -> Result<()> {
        self.mutate(|d| d.update_project_info(index, project))
    }

    pub fn delete_project_info(&mut self, index: usize) -> Result<ProjectInfo> {
        self.mutate(|d| d.delete_project_info(index))
    }

    pub fn funding_arrangement(&self) -> &[FundingRecord] {
        &self.data.funding_arrangement
    }

    pub fn set_funding_arrangement(&mut self, rows: Vec<FundingRecord>) -> Result<()> {
        self.mutate(|d| {
            d.funding_arrangement = rows;
            Ok(())
        })
    }

    pub fn add_funding(&mut self, funding: FundingRecord) -> Result<()> {
        self.mutate(|d| {
            d.add_funding(funding);
            Ok(())
        })
    }

    pub fn update_funding(&mut self, index: usize, funding: FundingRecord) -> Result<()> {
        self.mutate(|d| d.update_funding(index, funding))
    }

    pub fn delete_funding(&mut self, index: usize) -> Result<FundingRecord> {
        self.mutate(|d| d.delete_funding(index))
    }

    pub fn key_projects(&self) -> &[KeyProject] {
        &self.data.key_projects
    }

    pub fn set_key_projects(&mut self, rows: Vec<KeyProject>) -> Result<()> {
        self.mutate(|d| {
            d.key_projects = rows;
            Ok(())
        })
    }

    pub fn project_by_code(&self, project_code: &str) -> Option<&ProjectInfo> {
        self.data.project_by_code(project_code)
    }

    pub fn funding_by_project_code(&self, project_code: &str) -> Vec<&FundingRecord> {
        self.data.funding_by_project_code(project_code)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.mutate(|d| {
            *d = Dataset::default();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawAmount;

    fn funding(code: &str, amount: f64) -> FundingRecord {
        FundingRecord {
            project_code: code.to_string(),
            funding_amount: Some(RawAmount::Number(amount)),
            funding_source: "中央-国债".to_string(),
            funding_nature: "中央".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("store.json"));
        assert_eq!(repo.load().unwrap(), Dataset::default());
    }

    #[test]
    fn mutations_write_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let mut store = DataStore::open(JsonFileRepository::new(&path)).unwrap();
            store.add_funding(funding("P1", 10.0)).unwrap();
            store.add_funding(funding("P2", 20.0)).unwrap();
            store.update_funding(1, funding("P2", 25.0)).unwrap();
            store
                .add_project_info(ProjectInfo {
                    project_code: "P1".to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        let reopened = DataStore::open(JsonFileRepository::new(&path)).unwrap();
        assert_eq!(reopened.funding_arrangement().len(), 2);
        assert_eq!(
            reopened.funding_arrangement()[1].funding_amount,
            Some(RawAmount::Number(25.0))
        );
        assert!(reopened.project_by_code("P1").is_some());
        assert!(reopened.project_by_code("P9").is_none());
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let repo = JsonFileRepository::new(&path);
        let mut data = Dataset::default();
        data.add_funding(funding("P1", 10.0));
        repo.save(&data).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"fundingArrangement\""));
        assert!(raw.contains("\"projectCode\": \"P1\""));
        assert!(raw.contains("\"fundingAmount\": 10.0"));
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"fundingArrangement":[{"projectCode":"P1","fundingAmount":"300","fundingNature":"地方"}]}"#,
        )
        .unwrap();
        let data = JsonFileRepository::new(&path).load().unwrap();
        assert!(data.project_info.is_empty());
        let r = &data.funding_arrangement[0];
        assert_eq!(r.funding_amount, Some(RawAmount::Text("300".to_string())));
        assert_eq!(r.funding_source, "");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut store = DataStore::open(MemoryRepository::default()).unwrap();
        store.add_funding(funding("P1", 1.0)).unwrap();
        let err = store.delete_funding(3).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                collection: "fundingArrangement",
                index: 3,
                len: 1
            }
        ));
        assert!(store.update_project_info(0, ProjectInfo::default()).is_err());
        assert_eq!(store.funding_arrangement().len(), 1);
    }

    #[test]
    fn lookup_and_clear() {
        let mut store = DataStore::open(MemoryRepository::default()).unwrap();
        store
            .set_funding_arrangement(vec![funding("P1", 1.0), funding("P2", 2.0), funding("P1", 3.0)])
            .unwrap();
        store
            .set_key_projects(vec![KeyProject {
                project_code: "P1".to_string(),
                priority_level: "高".to_string(),
                ..Default::default()
            }])
            .unwrap();
        assert_eq!(store.funding_by_project_code("P1").len(), 2);
        let removed = store.delete_funding(0).unwrap();
        assert_eq!(removed.project_code, "P1");
        assert_eq!(store.funding_by_project_code("P1").len(), 1);
        assert_eq!(store.key_projects().len(), 1);

        store.clear_all().unwrap();
        assert_eq!(store.data(), &Dataset::default());
        assert_eq!(store.repository().load().unwrap(), Dataset::default());
    }
}
