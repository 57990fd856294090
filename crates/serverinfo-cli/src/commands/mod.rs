pub mod add;
pub mod list;
pub mod monitor;
pub mod remove;

use std::path::Path;

use anyhow::Context;

use serverinfo_core::registry::normalize_url;
use serverinfo_core::{RateUnit, TargetList};

/// Load the registry from `config`, or the per-user default location.
pub fn open_registry(config: Option<&Path>) -> anyhow::Result<TargetList> {
    let path = match config {
        Some(p) => p.to_path_buf(),
        None => serverinfo_core::default_config_path().context(
            "cannot determine the config directory; pass --config or set SERVERINFO_CONFIG",
        )?,
    };
    TargetList::load(&path).with_context(|| format!("cannot read {}", path.display()))
}

/// `--unit` values accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnitArg {
    /// B/s
    #[default]
    B,
    /// KB/s
    Kb,
    /// MB/s
    Mb,
}

impl From<UnitArg> for RateUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::B => RateUnit::BytesPerSec,
            UnitArg::Kb => RateUnit::KiloBytesPerSec,
            UnitArg::Mb => RateUnit::MegaBytesPerSec,
        }
    }
}

/// Turn a server given on the command line into a base URL: bare hosts get
/// `http://`, trailing slashes go.
pub fn server_url(arg: &str) -> String {
    let url = normalize_url(arg);
    if url.starts_with("http://") || url.starts_with("https://") {
        url
    } else {
        format!("http://{url}")
    }
}
