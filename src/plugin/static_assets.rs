//! Copies each module's static directory into the build output

use crate::modules::api::ModuleRecord;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::paths::{descriptor_dir, normalize_path};
use crate::plugin::traits::BuildPlugin;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const STATIC_ASSETS_PLUGIN_NAME: &str = "uniboost:static-copy";

pub const DEFAULT_STATIC_PREFIX: &str = "static";

/// One directory to copy: `src` lands at `<out>/<dest>/<rename>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticTarget {
    pub src: PathBuf,
    pub dest: String,
    pub rename: String,
}

/// Targets for every record that declares a `static` directory
pub fn static_targets(records: &[ModuleRecord], prefix: &str) -> Vec<StaticTarget> {
    records
        .iter()
        .filter_map(|record| {
            let static_dir = record.descriptor.static_dir.as_deref()?;
            let target = StaticTarget {
                src: normalize_path(&descriptor_dir(&record.file_path).join(static_dir)),
                dest: String::new(),
                rename: format!("{}/{}", prefix, record.key),
            };
            log::debug!(
                "Static assets {} -> {}",
                target.src.display(),
                target.rename
            );
            Some(target)
        })
        .collect()
}

#[derive(Debug)]
pub struct StaticAssetsPlugin {
    targets: Vec<StaticTarget>,
}

impl StaticAssetsPlugin {
    /// `None` when no record declares static assets
    pub fn from_records(records: &[ModuleRecord], prefix: &str) -> Option<Self> {
        let targets = static_targets(records, prefix);
        if targets.is_empty() {
            log::debug!("No static asset directories declared");
            return None;
        }
        log::info!("Configured {} static asset targets", targets.len());
        Some(Self { targets })
    }

    pub fn targets(&self) -> &[StaticTarget] {
        &self.targets
    }
}

#[async_trait::async_trait]
impl BuildPlugin for StaticAssetsPlugin {
    fn name(&self) -> &str {
        STATIC_ASSETS_PLUGIN_NAME
    }

    async fn write_bundle(&mut self, out_dir: &Path) -> PluginResult<()> {
        for target in &self.targets {
            if !tokio::fs::try_exists(&target.src).await.unwrap_or(false) {
                log::warn!("Static asset source missing: {}", target.src.display());
                continue;
            }
            let dest = out_dir.join(&target.dest).join(&target.rename);
            let copied = copy_tree(&target.src, &dest).await?;
            log::debug!("Copied {} files to {}", copied, dest.display());
        }
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PluginError + '_ {
    move |source| PluginError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Copy a file or directory tree, returning the number of files written
async fn copy_tree(src: &Path, dest: &Path) -> PluginResult<usize> {
    let metadata = tokio::fs::metadata(src).await.map_err(io_error(src))?;
    if metadata.is_file() {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error(parent))?;
        }
        tokio::fs::copy(src, dest).await.map_err(io_error(dest))?;
        return Ok(1);
    }

    let mut copied = 0;
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to).await.map_err(io_error(&to))?;
        let mut entries = tokio::fs::read_dir(&from).await.map_err(io_error(&from))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&from))? {
            let path = entry.path();
            let target = to.join(entry.file_name());
            let file_type = entry.file_type().await.map_err(io_error(&path))?;
            if file_type.is_dir() {
                pending.push((path, target));
            } else {
                tokio::fs::copy(&path, &target).await.map_err(io_error(&target))?;
                copied += 1;
            }
        }
    }
    Ok(copied)
}
