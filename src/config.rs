//! Environment-driven configuration.
//!
//! `SHIPQUOTE_PRICELIST` and `SHIPQUOTE_PIPES_PRICELIST` point at JSON data
//! files replacing the embedded pricelists; `SHIPQUOTE_STATE_DIR` overrides
//! where calculator state is kept.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{Catalog, PipeTable};
use crate::storage::FileStore;

pub const PRICELIST_VAR: &str = "SHIPQUOTE_PRICELIST";
pub const PIPES_PRICELIST_VAR: &str = "SHIPQUOTE_PIPES_PRICELIST";
pub const STATE_DIR_VAR: &str = "SHIPQUOTE_STATE_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Paint/cleaning pricelist; embedded data when unset
    pub pricelist: Option<PathBuf>,
    /// Pipe pricelist; embedded data when unset
    pub pipes_pricelist: Option<PathBuf>,
    /// State directory; platform config dir when unset
    pub state_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var_os(name).map(PathBuf::from))
    }

    /// Build from any variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let var = |name: &str| lookup(name).filter(|p| !p.as_os_str().is_empty());
        Self {
            pricelist: var(PRICELIST_VAR),
            pipes_pricelist: var(PIPES_PRICELIST_VAR),
            state_dir: var(STATE_DIR_VAR),
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.pricelist {
            Some(path) => {
                let text = read(path)?;
                let catalog = Catalog::from_json(&text)
                    .with_context(|| format!("parse pricelist {}", path.display()))?;
                info!("Using pricelist {}", path.display());
                Ok(catalog)
            }
            None => Catalog::embedded().context("load embedded pricelist"),
        }
    }

    pub fn load_pipes(&self) -> Result<PipeTable> {
        match &self.pipes_pricelist {
            Some(path) => {
                let text = read(path)?;
                let table = PipeTable::from_json(&text)
                    .with_context(|| format!("parse pipe pricelist {}", path.display()))?;
                info!("Using pipe pricelist {}", path.display());
                Ok(table)
            }
            None => PipeTable::embedded().context("load embedded pipe pricelist"),
        }
    }

    pub fn state_store(&self) -> Result<FileStore> {
        match &self.state_dir {
            Some(dir) => Ok(FileStore::new(dir)),
            None => FileStore::in_project_dir().context("locate state directory"),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
