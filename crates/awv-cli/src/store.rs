use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use awv_spec::{LoadError, Template, Visit, VisitRepository};

pub const DATA_DIR_ENV: &str = "AWV_DATA_DIR";

/// Directory-backed repository: `templates/<id>.json` and `visits/<id>.json`.
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--data-dir` wins over `AWV_DATA_DIR`; both fall back to the working directory.
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let root = data_dir
            .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_path(&self, template_id: &str) -> PathBuf {
        self.root.join("templates").join(format!("{template_id}.json"))
    }

    pub fn visit_path(&self, visit_id: &str) -> PathBuf {
        self.root.join("visits").join(format!("{visit_id}.json"))
    }

    fn read(&self, kind: &'static str, id: &str, path: &Path) -> Result<String, LoadError> {
        tracing::debug!(kind, id, path = %path.display(), "reading document");
        fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::NotFound {
                kind,
                id: id.to_string(),
            },
            _ => LoadError::Io {
                kind,
                id: id.to_string(),
                source,
            },
        })
    }
}

impl VisitRepository for FsRepository {
    fn load_template(&self, template_id: &str) -> Result<Template, LoadError> {
        let raw = self.read("template", template_id, &self.template_path(template_id))?;
        Ok(Template::from_json(&raw)?)
    }

    fn load_visit(&self, visit_id: &str) -> Result<Visit, LoadError> {
        let raw = self.read("visit", visit_id, &self.visit_path(visit_id))?;
        serde_json::from_str(&raw).map_err(|source| LoadError::Decode {
            kind: "visit",
            id: visit_id.to_string(),
            source,
        })
    }

    fn save_visit(&self, visit: &Visit) -> Result<(), LoadError> {
        let path = self.visit_path(&visit.id);
        let io_error = |source: std::io::Error| LoadError::Io {
            kind: "visit",
            id: visit.id.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = visit.to_json_pretty().map_err(|source| LoadError::Decode {
            kind: "visit",
            id: visit.id.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(io_error)?;
        tracing::info!(visit = %visit.id, path = %path.display(), "visit saved");
        Ok(())
    }
}
