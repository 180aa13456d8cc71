//! Companion GUI applications offered in the menu

use std::fs;
use std::path::Path;
use std::process::{Child, Command};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::constants::companions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionApp {
    EruptionGui,
    Pyroclasm,
}

impl CompanionApp {
    pub const ALL: [CompanionApp; 2] = [CompanionApp::EruptionGui, CompanionApp::Pyroclasm];

    pub fn path(self) -> &'static str {
        match self {
            CompanionApp::EruptionGui => companions::ERUPTION_GUI,
            CompanionApp::Pyroclasm => companions::PYROCLASM_UI,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompanionApp::EruptionGui => "Run Eruption GUI\u{2026}",
            CompanionApp::Pyroclasm => "Run Pyroclasm UI\u{2026}",
        }
    }

    pub fn is_available(self) -> bool {
        is_launchable(Path::new(self.path()))
    }

    pub fn launch(self) -> Result<()> {
        let child = spawn_detached(Path::new(self.path()))
            .with_context(|| format!("Failed to launch {}", self.path()))?;
        info!(pid = child.id(), path = self.path(), "Launched companion app");
        reap(child);
        Ok(())
    }
}

/// Companions currently installed, in menu order
pub fn available() -> Vec<CompanionApp> {
    CompanionApp::ALL
        .into_iter()
        .filter(|app| app.is_available())
        .collect()
}

/// A regular file or a symlink; any probe error counts as absent
fn is_launchable(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type().is_file() || meta.file_type().is_symlink(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "companion app not available");
            false
        }
    }
}

fn spawn_detached(path: &Path) -> Result<Child> {
    Command::new(path)
        .spawn()
        .context("Failed to spawn process")
}

/// Wait for the child off-thread so it does not linger as a zombie
fn reap(mut child: Child) {
    std::thread::spawn(move || {
        if let Err(err) = child.wait() {
            warn!(error = ?err, "Failed to wait for companion app");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_path_is_unavailable() {
        assert!(!is_launchable(Path::new("/nonexistent/eruption-panel/binary")));
    }

    #[test]
    fn test_probe_directory_is_unavailable() {
        assert!(!is_launchable(&std::env::temp_dir()));
    }

    #[test]
    fn test_probe_regular_file_is_available() {
        let path = std::env::temp_dir().join(format!("eruption-panel-probe-{}", std::process::id()));
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        assert!(is_launchable(&path));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        assert!(spawn_detached(Path::new("/nonexistent/eruption-panel/binary")).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(CompanionApp::Pyroclasm.label(), "Run Pyroclasm UI…");
        assert_eq!(CompanionApp::EruptionGui.path(), "/usr/bin/eruption-gui-gtk3");
    }
}
