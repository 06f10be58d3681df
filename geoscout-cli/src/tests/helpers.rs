//! Fixture files for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use geoscout_core::test_support::sample_region_archive;
use tempfile::TempDir;

/// A temporary directory with a UTF-8 root path.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write the sample region archive and return its path.
    pub(super) fn region_file(&self) -> Utf8PathBuf {
        let path = self.path("bavaria.gsrg");
        geoscout_core::write_region_file(path.as_std_path(), &sample_region_archive())
            .expect("write region file");
        path
    }
}

pub(super) fn output_lines(buffer: Vec<u8>) -> Vec<String> {
    String::from_utf8(buffer)
        .expect("utf-8 output")
        .lines()
        .map(str::to_owned)
        .collect()
}
