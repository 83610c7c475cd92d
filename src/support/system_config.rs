//-
// Copyright (c) 2024, Jason Lingle
//
// This file is part of Fidotoss.
//
// Fidotoss is free software: you can  redistribute it and/or modify it under
// the terms of the GNU General Public  License as published by the Free
// Software Foundation, either version  3 of the License, or (at  your option)
// any later version.
//
// Fidotoss is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or
// FITNESS FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License
// for more details.
//
// You should have received a copy of the GNU General Public License along with
// Fidotoss. If not, see <http://www.gnu.org/licenses/>.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The system-wide configuration for Fidotoss.
///
/// This is stored in a file named `fidotoss.toml` under the configuration
/// root, which is typically `/usr/local/etc/fidotoss` or `/etc/fidotoss`.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct SystemConfig {
    /// Where bundles arrive and where they are unpacked.
    pub paths: PathConfig,

    /// Options affecting how packets are routed.
    #[serde(default)]
    pub toss: TossConfig,

    /// The FTN networks this system is a member of.
    ///
    /// Order matters: when a packet destination could belong to more than
    /// one network, the first one listed wins.
    #[serde(default, rename = "network")]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct PathConfig {
    /// Directory into which mailers drop inbound bundles.
    pub inbound: PathBuf,
    /// Scratch directory bundles are extracted into.
    ///
    /// Everything in this directory is deleted after each bundle, so it must
    /// not be shared with anything else, including another concurrent run.
    pub unpack: PathBuf,
    /// Directory under which tossed messages are written.
    #[serde(default = "default_spool")]
    pub spool: PathBuf,
    /// File holding the per-area message pointers.
    #[serde(default = "default_index")]
    pub index: PathBuf,
}

fn default_spool() -> PathBuf {
    "spool".into()
}

fn default_index() -> PathBuf {
    "index.toml".into()
}

impl PathConfig {
    /// Make every relative path relative to `root` instead of the current
    /// directory.
    pub fn resolve_against(&mut self, root: &Path) {
        for path in [
            &mut self.inbound,
            &mut self.unpack,
            &mut self.spool,
            &mut self.index,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TossConfig {
    /// If true, a packet destination must equal one of the configured node
    /// addresses exactly.
    ///
    /// By default, the destination only needs to occur somewhere within a
    /// configured address, which is how existing configurations behave but
    /// means that `1:154/14` is accepted by a node configured as
    /// `1:154/140`.
    pub exact_address_match: bool,

    /// Character set assumed for message text which carries no `CHRS` kludge.
    pub default_charset: String,
}

impl Default for TossConfig {
    fn default() -> Self {
        TossConfig {
            exact_address_match: false,
            default_charset: "CP437".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The network's tag, e.g. `fidonet`.
    pub name: String,
    /// Our own addresses within the network.
    pub node_address: Vec<String>,
    /// The addresses of the hub(s) we exchange mail with.
    #[serde(default)]
    pub export_address: Vec<String>,
    /// Area code to label translations, written as `"code: label"` strings.
    #[serde(default, with = "area_table")]
    pub areas: Vec<AreaTranslation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaTranslation {
    pub code: String,
    pub label: String,
}

impl AreaTranslation {
    pub fn parse(s: &str) -> Option<Self> {
        let (code, label) = s.split_once(':')?;
        let (code, label) = (code.trim(), label.trim());
        if code.is_empty() || label.is_empty() {
            return None;
        }

        Some(AreaTranslation {
            code: code.to_owned(),
            label: label.to_owned(),
        })
    }
}

mod area_table {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::AreaTranslation;
    use crate::support::error::Error;

    pub fn serialize<S: Serializer>(
        areas: &[AreaTranslation],
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        ser.collect_seq(
            areas.iter().map(|a| format!("{}: {}", a.code, a.label)),
        )
    }

    pub fn deserialize<'a, D: Deserializer<'a>>(
        de: D,
    ) -> Result<Vec<AreaTranslation>, D::Error> {
        use serde::de::Error as _;
        Vec::<String>::deserialize(de)?
            .into_iter()
            .map(|s| {
                AreaTranslation::parse(&s).ok_or_else(|| {
                    D::Error::custom(Error::BadAreaTranslation(s))
                })
            })
            .collect()
    }
}
