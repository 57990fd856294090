//! Flat-file registry of servers the client polls.
//!
//! Format: one base URL per line. Blank lines and `#` comments are skipped on
//! load and never written back; every mutation rewrites the whole file.
//! Writes go to a temporary file in the same directory that is then renamed
//! over the registry, and the in-memory list only changes once that
//! succeeded.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Result of [`TargetList::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    AlreadyPresent(String),
}

/// Result of [`TargetList::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(String),
    NotFound,
}

/// Ordered, duplicate-free list of server base URLs backed by a file.
#[derive(Debug, Clone)]
pub struct TargetList {
    path: PathBuf,
    targets: Vec<String>,
    persisted: bool,
}

impl TargetList {
    /// Load the registry at `path`. A missing file is an empty list.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let (targets, persisted) = match fs::read_to_string(&path) {
            Ok(raw) => (parse_targets(&raw), true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (Vec::new(), false),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            targets,
            persisted,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a registry file existed at load time (or has been written since).
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Append `url` (normalised) unless it is already registered.
    pub fn add(&mut self, url: &str) -> io::Result<AddOutcome> {
        let url = normalize_url(url);
        if url.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "server url is empty",
            ));
        }
        if self.targets.contains(&url) {
            return Ok(AddOutcome::AlreadyPresent(url));
        }

        let mut next = self.targets.clone();
        next.push(url.clone());
        self.commit(next)?;
        Ok(AddOutcome::Added(url))
    }

    /// Remove by 1-based position or by URL.
    ///
    /// A number that is out of range is retried as a literal URL before
    /// giving up.
    pub fn remove(&mut self, reference: &str) -> io::Result<RemoveOutcome> {
        let reference = reference.trim();

        let position = reference
            .parse::<usize>()
            .ok()
            .filter(|&n| (1..=self.targets.len()).contains(&n))
            .map(|n| n - 1);
        let position = match position {
            Some(idx) => Some(idx),
            None => {
                let url = normalize_url(reference);
                self.targets.iter().position(|t| *t == url)
            }
        };

        let Some(idx) = position else {
            return Ok(RemoveOutcome::NotFound);
        };
        let mut next = self.targets.clone();
        let removed = next.remove(idx);
        self.commit(next)?;
        Ok(RemoveOutcome::Removed(removed))
    }

    /// Numbered listing, one line per target.
    pub fn list(&self) -> Vec<String> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| format!("  {}. {t}", i + 1))
            .collect()
    }

    fn commit(&mut self, next: Vec<String>) -> io::Result<()> {
        write_atomic(&self.path, &render_targets(&next))?;
        self.targets = next;
        self.persisted = true;
        Ok(())
    }
}

/// Trim whitespace and trailing slashes.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse registry file contents, dropping blanks, comments, and repeats.
///
/// Entries are normalised the same way as `add`/`remove` arguments, so a
/// hand-written `http://a/` and `http://a` are one server.
pub fn parse_targets(raw: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let url = normalize_url(line);
        if url.is_empty() {
            continue;
        }
        if !targets.contains(&url) {
            targets.push(url);
        }
    }
    targets
}

/// Canonical file contents for `targets`.
pub fn render_targets(targets: &[String]) -> String {
    let mut out = String::new();
    for t in targets {
        out.push_str(t);
        out.push('\n');
    }
    out
}

fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `<config dir>/serverinfo/servers.txt` for the current user.
///
/// Config dir is `%APPDATA%` on Windows, otherwise `$XDG_CONFIG_HOME` or
/// `$HOME/.config`. `None` when none of those are set.
pub fn default_config_path() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        unix_config_dir(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
    };
    base.map(|dir| dir.join("serverinfo").join("servers.txt"))
}

#[cfg_attr(windows, allow(dead_code))]
fn unix_config_dir(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg.filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))
}
