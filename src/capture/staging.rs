use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::ReelResult;

const FRAME_PREFIX: &str = "frame_";
const FRAME_EXT: &str = "png";
const PARTIAL_SUFFIX: &str = ".partial";
/// Width of the zero-padded index in staged file names.
pub const INDEX_WIDTH: usize = 6;

/// A staged frame file and its sequence index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedFrame {
    pub index: FrameIndex,
    pub path: PathBuf,
}

/// Flat per-session directory of `frame_NNNNNN.png` files.
///
/// Frames are written under a temporary name and renamed into place, so a listed frame is
/// always complete.
#[derive(Clone, Debug)]
pub struct FrameStage {
    dir: PathBuf,
}

impl FrameStage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for `idx`, e.g. `frame_000042.png`.
    pub fn file_name(idx: FrameIndex) -> String {
        format!(
            "{FRAME_PREFIX}{:0width$}.{FRAME_EXT}",
            idx.0,
            width = INDEX_WIDTH
        )
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(Self::file_name(idx))
    }

    /// Parse a staged file name back into its index.
    pub fn parse_file_name(name: &str) -> Option<FrameIndex> {
        let digits = name
            .strip_prefix(FRAME_PREFIX)?
            .strip_suffix(FRAME_EXT)?
            .strip_suffix('.')?;
        if digits.len() < INDEX_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(FrameIndex)
    }

    /// Create the directory and remove any frames (complete or partial) left from earlier runs.
    pub fn prepare(&self) -> ReelResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create staging dir '{}'", self.dir.display()))?;
        let mut removed = 0usize;
        for path in self.owned_files()? {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove stale frame '{}'", path.display()))?;
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!(dir = %self.dir.display(), removed, "cleared staging dir");
        }
        Ok(())
    }

    /// Encode `frame` as PNG at `idx`.
    pub fn write(&self, idx: FrameIndex, frame: &image::RgbaImage) -> ReelResult<PathBuf> {
        let path = self.frame_path(idx);
        let partial = self
            .dir
            .join(format!("{}{PARTIAL_SUFFIX}", Self::file_name(idx)));
        frame
            .save_with_format(&partial, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", partial.display()))?;
        std::fs::rename(&partial, &path).with_context(|| {
            format!(
                "move frame '{}' into place at '{}'",
                partial.display(),
                path.display()
            )
        })?;
        Ok(path)
    }

    /// Complete staged frames sorted by index.
    pub fn list(&self) -> ReelResult<Vec<StagedFrame>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let rd = std::fs::read_dir(&self.dir)
            .with_context(|| format!("list staging dir '{}'", self.dir.display()))?;
        let mut frames = Vec::new();
        for entry in rd {
            let entry = entry.with_context(|| format!("read entry in '{}'", self.dir.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(index) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Self::parse_file_name)
            else {
                continue;
            };
            frames.push(StagedFrame { index, path });
        }
        frames.sort_by_key(|f| f.index);
        Ok(frames)
    }

    /// Remove every staged file and then the directory itself if it is empty.
    pub fn clear(&self) -> ReelResult<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        for path in self.owned_files()? {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove frame '{}'", path.display()))?;
        }
        if std::fs::read_dir(&self.dir)
            .map(|mut rd| rd.next().is_none())
            .unwrap_or(false)
        {
            std::fs::remove_dir(&self.dir)
                .with_context(|| format!("remove staging dir '{}'", self.dir.display()))?;
        }
        Ok(())
    }

    fn owned_files(&self) -> ReelResult<Vec<PathBuf>> {
        let rd = std::fs::read_dir(&self.dir)
            .with_context(|| format!("list staging dir '{}'", self.dir.display()))?;
        let mut out = Vec::new();
        for entry in rd.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = name.strip_suffix(PARTIAL_SUFFIX).unwrap_or(name);
            if path.is_file() && Self::parse_file_name(stem).is_some() {
                out.push(path);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/staging.rs"]
mod tests;
