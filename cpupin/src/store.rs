//! File locations for domain documents and layout descriptions.
//!
//! ```text
//! <root>/<domains_dir>/<host>/<domain>.xml
//! <root>/<layouts_dir>/<name>.json
//! ```

use crate::domain::DomainRef;
use crate::error::{PinError, Result};
use crate::layout::{LayoutFile, LayoutParams};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_DOMAINS_DIR: &str = "domains";
pub const DEFAULT_LAYOUTS_DIR: &str = "layout";

/// Directory tree holding domain and layout files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    root: PathBuf,
    domains_dir: PathBuf,
    layouts_dir: PathBuf,
}

impl Store {
    pub fn new(
        root: impl Into<PathBuf>,
        domains_dir: impl Into<PathBuf>,
        layouts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            domains_dir: domains_dir.into(),
            layouts_dir: layouts_dir.into(),
        }
    }

    /// Store with the default `domains` and `layout` subdirectories.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_DOMAINS_DIR, DEFAULT_LAYOUTS_DIR)
    }

    pub fn domain_path(&self, domain: &DomainRef) -> PathBuf {
        self.root
            .join(&self.domains_dir)
            .join(&domain.host)
            .join(format!("{}.xml", domain.domain))
    }

    pub fn layout_path(&self, name: &str) -> PathBuf {
        self.root
            .join(&self.layouts_dir)
            .join(format!("{}.json", name))
    }

    /// Load and validate a named layout.
    pub fn load_layout(&self, name: &str) -> Result<LayoutParams> {
        let path = self.layout_path(name);
        if !path.exists() {
            return Err(PinError::missing("Layout file", path));
        }

        tracing::debug!(path = %path.display(), "Loading layout");
        let text = fs::read_to_string(&path)?;
        let layout = LayoutFile::from_json(&text).map_err(|e| match e {
            PinError::MalformedInput { message, .. } => {
                PinError::malformed(format!("layout file {}", path.display()), message)
            }
            other => other,
        })?;
        layout.to_params()
    }

    pub fn read_domain(&self, domain: &DomainRef) -> Result<String> {
        let path = self.domain_path(domain);
        if !path.exists() {
            return Err(PinError::missing("Domain file", path));
        }

        tracing::debug!(%domain, path = %path.display(), "Reading domain file");
        Ok(fs::read_to_string(&path)?)
    }

    /// Replace the domain file through a sibling temp file.
    pub fn write_domain(&self, domain: &DomainRef, contents: &str) -> Result<()> {
        let path = self.domain_path(domain);
        let tmp = path.with_extension("xml.tmp");

        fs::write(&tmp, contents)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn domain() -> DomainRef {
        DomainRef::new("windows", "hv")
    }

    #[test]
    fn test_paths() {
        let store = Store::with_root("libvirt");
        assert_eq!(
            store.domain_path(&domain()),
            PathBuf::from("libvirt/domains/hv/windows.xml")
        );
        assert_eq!(
            store.layout_path("gaming"),
            PathBuf::from("libvirt/layout/gaming.json")
        );
    }

    #[test]
    fn test_custom_dirs() {
        let store = Store::new("/srv/virt", "xml", "layouts");
        assert_eq!(
            store.domain_path(&domain()),
            PathBuf::from("/srv/virt/xml/hv/windows.xml")
        );
    }

    #[test]
    fn test_missing_layout() {
        let dir = TempDir::new().unwrap();
        let store = Store::with_root(dir.path());
        let err = store.load_layout("absent").unwrap_err();
        assert!(matches!(
            err,
            PinError::MissingResource {
                kind: "Layout file",
                ..
            }
        ));
    }

    #[test]
    fn test_load_layout() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("layout")).unwrap();
        fs::write(
            dir.path().join("layout/small.json"),
            r#"{"total_cores": 4, "system_cores": "0", "virtual_cores": 2}"#,
        )
        .unwrap();

        let store = Store::with_root(dir.path());
        let params = store.load_layout("small").unwrap();
        assert_eq!(params.total_cores(), 4);
        assert_eq!(params.virtual_cores(), 2);
    }

    #[test]
    fn test_malformed_layout_names_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("layout")).unwrap();
        fs::write(dir.path().join("layout/broken.json"), "{not json").unwrap();

        let store = Store::with_root(dir.path());
        let err = store.load_layout("broken").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_domain_round_trip() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("domains/hv")).unwrap();
        let store = Store::with_root(dir.path());

        assert!(matches!(
            store.read_domain(&domain()),
            Err(PinError::MissingResource { .. })
        ));

        store.write_domain(&domain(), "<domain/>").unwrap();
        assert_eq!(store.read_domain(&domain()).unwrap(), "<domain/>");
        assert!(!dir.path().join("domains/hv/windows.xml.tmp").exists());
    }
}
