//! Inode number to path name resolution.
//!
//! Names come from an external program, `xfs_ncheck` by default. Failing
//! to obtain them is never fatal: the resolver logs a warning and returns
//! an empty map.

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::string::FromUtf8Error;
use thiserror::Error;

pub type NameMap = HashMap<u64, String>;

pub const DEFAULT_NCHECK_PROGRAM: &str = "xfs_ncheck";

pub trait NameResolver {
    fn resolve(&self, image_path: &Path) -> NameMap;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Status { program: String, status: ExitStatus },

    #[error("output is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

/// Runs `xfs_ncheck <image>` and parses its `<inode> <path>` lines.
#[derive(Debug, Clone)]
pub struct NcheckResolver {
    program: String,
}

impl Default for NcheckResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NCHECK_PROGRAM)
    }
}

impl NcheckResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn run(&self, image_path: &Path) -> Result<NameMap, ResolveError> {
        let output = Command::new(&self.program)
            .arg(image_path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| ResolveError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ResolveError::Status {
                program: self.program.clone(),
                status: output.status,
            });
        }

        let text = String::from_utf8(output.stdout)?;
        Ok(parse_ncheck_output(&text))
    }
}

impl NameResolver for NcheckResolver {
    fn resolve(&self, image_path: &Path) -> NameMap {
        match self.run(image_path) {
            Ok(names) => {
                tracing::debug!(program = %self.program, resolved = names.len(), "resolved inode names");
                names
            }
            Err(e) => {
                tracing::warn!("Could not run {}: {}", self.program, e);
                NameMap::new()
            }
        }
    }
}

/// Resolver that never produces names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl NameResolver for NoNames {
    fn resolve(&self, _image_path: &Path) -> NameMap {
        NameMap::new()
    }
}

/// Parses `<decimal inode><whitespace><path>` lines. Lines that do not
/// have both parts, or whose inode is not a number, are skipped.
pub fn parse_ncheck_output(text: &str) -> NameMap {
    let mut names = NameMap::new();
    for line in text.lines() {
        let line = line.trim();
        let Some((number, name)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let Ok(inode) = number.parse::<u64>() else {
            continue;
        };
        let name = name.trim();
        if !name.is_empty() {
            names.insert(inode, name.to_string());
        }
    }
    names
}
