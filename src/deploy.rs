//! SDL2 runtime deployment
//!
//! Copies the SDL2 shared library into the simulator's build output directory so the
//! simulator executable can load it at runtime. A missing source library is reported
//! on the status line and is not treated as an error; filesystem failures are.

use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util;

/// Default location of the SDL2 runtime on the host
pub const DEFAULT_SOURCE_PATH: &str = r"C:\SDL2\x86_64-w64-mingw32\bin\SDL2.dll";

/// Simulator build output directory, relative to the working directory
pub const DEFAULT_BUILD_DIR: &str = ".pio/build/simulator";

/// Errors that abort a deployment
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to create build directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Source path {} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error("Failed to write status line")]
    Report(#[source] io::Error),
}

/// Where the library comes from and where it goes
#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    /// Shared library to copy
    pub source_path: PathBuf,

    /// Output directory, created if absent
    pub build_dir: PathBuf,

    /// Destination file name; the source's file name when `None`
    pub file_name: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            file_name: None,
        }
    }
}

impl DeployConfig {
    /// `build_dir` joined with the destination file name
    pub fn destination_path(&self) -> Result<PathBuf, DeployError> {
        let name = match &self.file_name {
            Some(name) => name.clone(),
            None => util::file_name_of(&self.source_path)
                .ok_or_else(|| DeployError::NoFileName(self.source_path.clone()))?,
        };
        Ok(self.build_dir.join(name))
    }
}

#[cfg(test)]
impl DeployConfig {
    pub fn with_source(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = source_path.into();
        self
    }

    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Result of a deployment that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub enum DeployOutcome {
    /// Library copied, overwriting any previous copy
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },

    /// Source library absent; nothing was copied
    SourceMissing { source: PathBuf },
}

#[cfg(test)]
impl DeployOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, DeployOutcome::Copied { .. })
    }
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployOutcome::Copied { source, destination, .. } => {
                write!(f, "Copied {} to {}", source.display(), destination.display())
            }
            DeployOutcome::SourceMissing { source } => {
                write!(f, "Error: {} not found", source.display())
            }
        }
    }
}

/// Ensure the build directory exists, then copy the library into it
///
/// Writes exactly one status line to `out` when the deployment completes, whether or
/// not the source was found.
pub fn deploy<W: Write>(config: &DeployConfig, out: &mut W) -> Result<DeployOutcome, DeployError> {
    let build_dir = &config.build_dir;

    debug!("Ensuring build directory {}", build_dir.display());
    ensure_dir(build_dir)?;

    let destination = config.destination_path()?;
    let source = &config.source_path;
    debug!("Deploying {} -> {}", source.display(), destination.display());

    let outcome = if source.exists() {
        let bytes = util::copy_with_times(source, &destination).map_err(|e| DeployError::Copy {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })?;
        info!("Copied {} bytes", bytes);

        DeployOutcome::Copied {
            source: source.clone(),
            destination,
            bytes,
        }
    } else {
        warn!("SDL2 runtime not found at {}", source.display());
        DeployOutcome::SourceMissing {
            source: source.clone(),
        }
    };

    writeln!(out, "{}", outcome).map_err(DeployError::Report)?;
    Ok(outcome)
}

fn ensure_dir(dir: &Path) -> Result<(), DeployError> {
    if dir.is_dir() {
        debug!("Build directory already present");
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| DeployError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })
}
