//! Live frame mirroring into a second surface.
//!
//! The radial style can stream its rendered frames to a file under the
//! user's runtime directory, where another terminal can follow along with
//! something like `watch -n 0.1 cat .../mirror.txt`. Whether the sink is
//! available at all is a capability decided at startup, not an error.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ratatui::buffer::Buffer;

/// A consumer showing a live copy of the rendered frames elsewhere.
pub trait MirrorSink {
    /// Whether the environment supports mirroring at all. When false the
    /// control stays disabled and enable is never called.
    fn is_supported(&self) -> bool;

    fn is_active(&self) -> bool;

    fn enable(&mut self) -> Result<()>;

    fn disable(&mut self);

    /// Pushes one rendered frame. Only called while active.
    fn push(&mut self, frame: &str) -> Result<()>;
}

/// Renders a terminal buffer to the plain-text form pushed into a sink.
/// Colors are dropped; the cell symbols alone keep the shapes legible.
pub fn snapshot(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::with_capacity((area.width as usize + 1) * area.height as usize);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            match buf.cell((x, y)) {
                Some(cell) => out.push_str(cell.symbol()),
                None => out.push(' '),
            }
        }
        out.push('\n');
    }
    out
}

/// `MirrorSink` writing the latest frame to `<runtime dir>/pulseviz/mirror.txt`.
/// Each push replaces the whole file.
pub struct FileMirror {
    dir: Option<PathBuf>,
    path: Option<PathBuf>,
}

impl FileMirror {
    /// Resolves the mirror directory. An explicit override always counts as
    /// supported; otherwise support depends on the platform reporting a
    /// runtime directory.
    pub fn detect(override_dir: Option<PathBuf>) -> Self {
        let dir = override_dir.or_else(|| dirs::runtime_dir().map(|d| d.join("pulseviz")));
        if dir.is_none() {
            tracing::info!("no runtime directory, mirroring unavailable");
        }
        Self { dir, path: None }
    }
}

impl MirrorSink for FileMirror {
    fn is_supported(&self) -> bool {
        self.dir.is_some()
    }

    fn is_active(&self) -> bool {
        self.path.is_some()
    }

    fn enable(&mut self) -> Result<()> {
        let dir = self
            .dir
            .as_ref()
            .context("no directory available for mirroring")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("mirror.txt");
        fs::write(&path, "")?;
        tracing::info!("mirroring frames to {}", path.display());
        self.path = Some(path);
        Ok(())
    }

    fn disable(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!("could not remove {}: {err}", path.display());
            }
        }
    }

    fn push(&mut self, frame: &str) -> Result<()> {
        let path = self.path.as_ref().context("mirror is not enabled")?;
        fs::write(path, frame)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pulseviz_{tag}_{}", std::process::id()))
    }

    #[test]
    fn enable_push_disable_lifecycle() {
        let dir = scratch_dir("mirror");
        let mut mirror = FileMirror::detect(Some(dir.clone()));
        assert!(mirror.is_supported());
        assert!(!mirror.is_active());

        mirror.enable().unwrap();
        assert!(mirror.is_active());
        let path = dir.join("mirror.txt");
        assert!(path.exists());

        mirror.push("frame one").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "frame one");
        mirror.push("frame two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "frame two");

        mirror.disable();
        assert!(!mirror.is_active());
        assert!(!path.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_directory_reports_unsupported() {
        let mut mirror = FileMirror {
            dir: None,
            path: None,
        };
        assert!(!mirror.is_supported());
        assert!(mirror.enable().is_err());
        assert!(mirror.push("frame").is_err());
    }

    #[test]
    fn snapshot_renders_rows_with_newlines() {
        let buf = Buffer::with_lines(["ab", "cd"]);
        assert_eq!(snapshot(&buf), "ab\ncd\n");
    }
}
