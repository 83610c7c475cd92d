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

//! Where tossed messages go.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::packet::model::Message;
use crate::support::error::Error;
use crate::support::file_ops;
use crate::support::safe_name::is_safe_name;
use crate::support::system_config::NetworkConfig;

/// A decoded message together with its routing decision.
#[derive(Clone, Copy, Debug)]
pub struct TossedMessage<'a> {
    pub message: &'a Message,
    /// The network whose node address the packet was sent to.
    pub network: &'a NetworkConfig,
    /// The formatted destination address of the packet.
    pub packet_address: &'a str,
    /// The label configured for the message's area, if any.
    pub area_label: Option<&'a str>,
}

impl TossedMessage<'_> {
    /// The tags to file the message under: `public`, the network name, and
    /// the area label, or the raw area code if it has no label.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags = vec!["public", self.network.name.as_str()];
        if let Some(tag) = self.area_label.or(self.message.area.as_deref()) {
            tags.push(tag);
        }
        tags
    }
}

/// What a sink did with a message it accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Stored,
    /// The sink already had this message and dropped it.
    Duplicate,
}

/// Receives every successfully decoded message.
///
/// Duplicate suppression, if any, is the sink's business.
pub trait MessageSink {
    fn accept(
        &mut self,
        tossed: &TossedMessage<'_>,
    ) -> Result<Disposition, Error>;
}

/// A `MessageSink` which writes each message into its own TOML file, under
/// `<root>/<network>/<area>/`. Messages without an area go into `netmail`.
///
/// Files are numbered sequentially within each directory. A message whose
/// `MSGID` is already spooled in its directory is dropped, so re-tossing a
/// bundle does not store its messages twice.
#[derive(Debug)]
pub struct SpoolSink {
    root: PathBuf,
    dirs: HashMap<PathBuf, SpoolDir>,
}

/// What is known about one spool directory.
#[derive(Debug)]
struct SpoolDir {
    next_seq: u64,
    msgids: HashSet<String>,
}

impl SpoolDir {
    /// Scan the files already in `dir`.
    fn load(dir: &Path) -> Result<Self, Error> {
        let mut spool_dir = SpoolDir {
            next_seq: 1,
            msgids: HashSet::new(),
        };

        for path in file_ops::list_files(dir)? {
            let seq = match sequence_of(&path) {
                Some(seq) => seq,
                None => continue,
            };
            spool_dir.next_seq = spool_dir.next_seq.max(seq.saturating_add(1));

            match read_msgid(&path) {
                Ok(Some(msgid)) => {
                    spool_dir.msgids.insert(msgid);
                },
                Ok(None) => (),
                Err(e) => warn!("Ignoring {}: {}", path.display(), e),
            }
        }

        Ok(spool_dir)
    }
}

#[derive(Serialize)]
struct StoredMessage<'a> {
    author: &'a str,
    recipient: &'a str,
    subject: &'a str,
    ctime: NaiveDateTime,
    network: &'a str,
    packet_address: &'a str,
    area: Option<&'a str>,
    msgid: Option<&'a str>,
    tags: Vec<&'a str>,
    body: String,
    seen_by: &'a [String],
    kludge: Vec<StoredKludge<'a>>,
}

#[derive(Serialize)]
struct StoredKludge<'a> {
    key: &'a str,
    values: &'a [String],
}

/// The part of a spooled file read back when scanning a directory.
#[derive(Deserialize)]
struct StoredId {
    msgid: Option<String>,
}

impl SpoolSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SpoolSink {
            root: root.into(),
            dirs: HashMap::new(),
        }
    }

    fn directory_for(&self, tossed: &TossedMessage<'_>) -> PathBuf {
        let area = tossed.message.area.as_deref().unwrap_or("netmail");
        let area = if is_safe_name(area) {
            area
        } else {
            warn!("Area {:?} is not usable as a directory name", area);
            "bad-area"
        };
        let network = if is_safe_name(&tossed.network.name) {
            tossed.network.name.as_str()
        } else {
            "bad-network"
        };

        self.root.join(network).join(area)
    }

    fn spool_dir(&mut self, dir: &Path) -> Result<&mut SpoolDir, Error> {
        Ok(match self.dirs.entry(dir.to_owned()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(SpoolDir::load(dir)?),
        })
    }
}

fn sequence_of(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn read_msgid(path: &Path) -> Result<Option<String>, Error> {
    let stored: StoredId = toml::from_slice(&fs::read(path)?)?;
    Ok(stored.msgid)
}

impl MessageSink for SpoolSink {
    fn accept(
        &mut self,
        tossed: &TossedMessage<'_>,
    ) -> Result<Disposition, Error> {
        let message = tossed.message;
        let dir = self.directory_for(tossed);
        fs::create_dir_all(&dir)?;
        let spool_dir = self.spool_dir(&dir)?;

        if let Some(msgid) = message.msgid() {
            if spool_dir.msgids.contains(msgid) {
                info!("{}: {} already spooled", dir.display(), msgid);
                return Ok(Disposition::Duplicate);
            }
        }

        let stored = StoredMessage {
            author: &message.sender,
            recipient: &message.recipient,
            subject: &message.subject,
            ctime: message
                .timestamp()
                .unwrap_or_else(|| Utc::now().naive_utc()),
            network: &tossed.network.name,
            packet_address: tossed.packet_address,
            area: message.area.as_deref(),
            msgid: message.msgid(),
            tags: tossed.tags(),
            body: message.text(),
            seen_by: &message.seen_by,
            kludge: message
                .kludges
                .iter()
                .map(|(key, values)| StoredKludge { key, values })
                .collect(),
        };

        let path = dir.join(format!("{:08}.toml", spool_dir.next_seq));
        file_ops::spit(&path, false, 0o640, &toml::to_vec(&stored)?)?;
        spool_dir.next_seq += 1;
        if let Some(msgid) = message.msgid() {
            spool_dir.msgids.insert(msgid.to_owned());
        }
        debug!("Spooled {}", path.display());
        Ok(Disposition::Stored)
    }
}
