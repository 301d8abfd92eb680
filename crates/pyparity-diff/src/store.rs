use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use log::{info, warn};
use pyparity_error::{ParityError, Result};
use similar::TextDiff;
use tempfile::NamedTempFile;

use crate::report::{Report, significant_lines};

/// Outcome of checking one report against its baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Matches,
    /// Unified diff from the committed baseline to the fresh report.
    Differs { diff: String },
    Missing,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Matches)
    }
}

/// A directory of `<module>.log` baselines.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, module: &str) -> PathBuf {
        self.dir.join(format!("{module}.log"))
    }

    pub fn read(&self, module: &str) -> Result<Option<String>> {
        let path = self.path_for(module);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ParityError::io(path, err)),
        }
    }

    /// Writes every report, each through a temporary file renamed into
    /// place. Nothing is written if the directory cannot be created.
    pub fn write_all(&self, reports: &[Report]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir).map_err(|err| ParityError::io(&self.dir, err))?;
        let mut written = Vec::with_capacity(reports.len());
        for report in reports {
            let path = self.path_for(&report.module);
            let mut file =
                NamedTempFile::new_in(&self.dir).map_err(|err| ParityError::io(&self.dir, err))?;
            file.write_all(report.serialize().as_bytes())
                .map_err(|err| ParityError::io(file.path(), err))?;
            file.persist(&path)
                .map_err(|err| ParityError::io(&path, err.error))?;
            info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Compares `report` with its baseline, ignoring comments, blank lines,
    /// surrounding whitespace and the title line.
    pub fn check(&self, report: &Report) -> Result<Verdict> {
        let Some(baseline) = self.read(&report.module)? else {
            return Ok(Verdict::Missing);
        };
        let fresh = report.serialize();
        let expected = significant_lines(&baseline);
        let actual = significant_lines(&fresh);

        if let (Some(old), Some(new)) = (expected.first(), actual.first()) {
            if old != new {
                warn!("{}: title changed from {old:?} to {new:?}", report.module);
            }
        }
        if expected.iter().skip(1).eq(actual.iter().skip(1)) {
            return Ok(Verdict::Matches);
        }
        let diff = TextDiff::from_lines(&baseline, &fresh)
            .unified_diff()
            .context_radius(3)
            .header("baseline", "current")
            .to_string();
        Ok(Verdict::Differs { diff })
    }
}
