//! Temporary project trees

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Where the package directory lives inside the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<root>/src/<package>`
    Src,
    /// `<root>/<package>`
    Flat,
    /// `<root>/<dir>/<package>`, which discovery does not search
    Other(&'static str),
}

/// A project root in a temporary directory
pub struct TestProject {
    temp_dir: TempDir,
    package_dir: PathBuf,
}

impl TestProject {
    pub fn new(package: &str, layout: Layout) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let package_dir = match layout {
            Layout::Src => temp_dir.path().join("src").join(package),
            Layout::Flat => temp_dir.path().join(package),
            Layout::Other(dir) => temp_dir.path().join(dir).join(package),
        };
        std::fs::create_dir_all(&package_dir).unwrap();
        Self {
            temp_dir,
            package_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Write a file relative to the package directory
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.package_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Read a file relative to the package directory
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.package_dir.join(relative)).unwrap()
    }
}

/// Hand-written `_version.toml` declaring `package` with the given keys
pub fn declaration(package: &str, keys: &str) -> String {
    format!("[version]\npackage = \"{package}\"\n{keys}")
}
