//! Display backend driven by the `swww` wallpaper daemon.
//!
//! `swww query` prints one line per output, for example
//! `eDP-1: 2880x1800, scale: 2, currently displaying: image: /tmp/a.jpg`.
//! Newer releases prefix each line with `: `. Dimensions are physical pixels,
//! so targets are built with a scale factor of 1.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use basalt_core::ports::{DisplayError, DisplayPort};
use basalt_core::{DisplayId, DisplayTarget};
use tokio::process::Command;
use tracing::{debug, info};

pub struct SwwwDisplayAdapter {
    swww_path: PathBuf,
}

impl SwwwDisplayAdapter {
    pub fn new(swww_path: impl Into<PathBuf>) -> Self {
        Self {
            swww_path: swww_path.into(),
        }
    }
}

/// Parses `swww query` output. The first output is treated as primary and
/// outputs are laid out left to right in listed order.
pub fn parse_query(stdout: &str) -> Vec<DisplayTarget> {
    let mut targets = Vec::new();
    let mut next_x: i32 = 0;

    for line in stdout.lines() {
        let Some((name, width, height)) = parse_line(line) else {
            if !line.trim().is_empty() {
                debug!(line, "Skipping unrecognized swww query line");
            }
            continue;
        };
        let ordinal = targets.len();
        targets.push(DisplayTarget {
            id: DisplayId::new(name, ordinal),
            name: name.to_string(),
            width,
            height,
            scale_factor: 1.0,
            x: next_x,
            y: 0,
            primary: ordinal == 0,
        });
        next_x = next_x.saturating_add(width as i32);
    }
    targets
}

fn parse_line(line: &str) -> Option<(&str, u32, u32)> {
    let line = line.trim().trim_start_matches(':').trim_start();
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let size = rest.trim_start().split(',').next()?.trim();
    let (width, height) = size.split_once('x')?;
    Some((name, width.trim().parse().ok()?, height.trim().parse().ok()?))
}

#[async_trait]
impl DisplayPort for SwwwDisplayAdapter {
    async fn enumerate(&self) -> Result<Vec<DisplayTarget>, DisplayError> {
        let output = Command::new(&self.swww_path)
            .arg("query")
            .output()
            .await
            .map_err(|e| {
                DisplayError::Enumerate(format!("run {} query: {e}", self.swww_path.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DisplayError::Enumerate(format!(
                "swww query exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_query(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn set_wallpaper(&self, target: &DisplayTarget, path: &Path) -> Result<(), DisplayError> {
        let output = Command::new(&self.swww_path)
            .arg("img")
            .arg("--outputs")
            .arg(&target.name)
            .arg(path)
            .output()
            .await
            .map_err(|e| DisplayError::Apply {
                display: target.name.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DisplayError::Apply {
                display: target.name.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(output = %target.name, path = %path.display(), "Background set");
        Ok(())
    }
}
