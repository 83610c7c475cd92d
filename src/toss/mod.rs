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

//! The batch tosser.
//!
//! A run walks three nested scopes: bundles in the inbound directory, packets
//! extracted from each bundle, and messages within each packet. A failure is
//! contained at the scope it occurs in; it is recorded in the `RunReport` and
//! processing carries on with the next sibling.

pub mod archive;
pub mod counters;
pub mod index_store;
pub mod sink;

#[cfg(test)]
mod integration_tests;

use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, error, info, warn};

use self::archive::BundleSource;
use self::counters::{AreaCounters, IndexTracker};
use self::index_store::IndexStore;
use self::sink::{Disposition, MessageSink, TossedMessage};
use crate::packet::address::{
    format_address, resolve_network, translate_area, FtnAddress,
};
use crate::packet::charset::Charset;
use crate::packet::header::{
    decode_packet_header, PACKET_HEADER_SIZE, PACKET_TYPE_2,
};
use crate::packet::model::Message;
use crate::packet::reader::MessageRecords;
use crate::support::error::Error;
use crate::support::file_ops;
use crate::support::system_config::SystemConfig;

/// Everything one run shares between its scopes.
///
/// Created at the start of a run and dropped at the end; the configuration
/// is only ever read.
pub struct TossContext<'a> {
    pub config: &'a SystemConfig,
    pub counters: AreaCounters,
    pub index: IndexTracker,
    pub report: RunReport,
    default_charset: Charset,
}

impl<'a> TossContext<'a> {
    pub fn new(config: &'a SystemConfig) -> Self {
        let default_charset = Charset::from_label(&config.toss.default_charset)
            .unwrap_or_else(|| {
                warn!(
                    "Unknown default charset {:?}, using CP437",
                    config.toss.default_charset
                );
                Charset::Cp437
            });

        TossContext {
            config,
            counters: AreaCounters::default(),
            index: IndexTracker::default(),
            report: RunReport::default(),
            default_charset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Bundle,
    Packet,
    Message,
}

/// A contained failure.
#[derive(Debug)]
pub struct Problem {
    pub scope: Scope,
    /// What was abandoned, e.g. the bundle or packet file name.
    pub subject: String,
    pub error: Error,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.scope, self.subject, self.error)
    }
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub problems: Vec<Problem>,
    pub bundles: usize,
    pub packets: usize,
    pub messages: usize,
    /// Messages the sink already had.
    pub duplicates: usize,
}

impl RunReport {
    fn problem(
        &mut self,
        scope: Scope,
        subject: impl Into<String>,
        error: Error,
    ) {
        let problem = Problem {
            scope,
            subject: subject.into(),
            error,
        };
        error!("{}", problem);
        self.problems.push(problem);
    }
}

/// Clears the working directory when dropped, however the bundle's
/// processing ends.
struct ClearWorkDir<'a>(&'a Path);

impl Drop for ClearWorkDir<'_> {
    fn drop(&mut self) {
        file_ops::clear_directory(self.0);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Toss every bundle `source` offers, then persist the advanced index
/// pointers.
///
/// Only a failure to list the bundles, prepare the working directory, or
/// flush the index aborts the run; everything else is recorded in
/// `ctx.report`.
pub fn toss_inbound(
    ctx: &mut TossContext<'_>,
    source: &dyn BundleSource,
    sink: &mut dyn MessageSink,
    index: &mut dyn IndexStore,
) -> Result<(), Error> {
    let unpack = ctx.config.paths.unpack.clone();
    fs::create_dir_all(&unpack)?;

    let bundles = source.bundles()?;
    info!("{} bundle(s) waiting", bundles.len());

    for bundle in bundles {
        if let Err(e) = toss_bundle(ctx, source, &bundle, &unpack, sink, index)
        {
            ctx.report.problem(Scope::Bundle, display_name(&bundle), e);
        }
        ctx.report.bundles += 1;
    }

    ctx.index.flush(index)?;
    Ok(())
}

/// Extract `bundle` into `unpack` and toss each packet found anywhere
/// beneath it.
///
/// `unpack` is emptied before this returns, whether or not anything failed.
pub fn toss_bundle(
    ctx: &mut TossContext<'_>,
    source: &dyn BundleSource,
    bundle: &Path,
    unpack: &Path,
    sink: &mut dyn MessageSink,
    index: &mut dyn IndexStore,
) -> Result<(), Error> {
    let _clear = ClearWorkDir(unpack);
    let bundle_name = display_name(bundle);

    info!("{}: extracting", bundle_name);
    source.extract(bundle, unpack)?;

    // Some mailers archive their outbound directory tree rather than bare
    // packets
    for packet in file_ops::list_files_recursive(unpack)? {
        let relative = packet.strip_prefix(unpack).unwrap_or(&packet);
        let packet_name =
            format!("{}/{}", bundle_name, relative.to_string_lossy());
        match toss_packet_file(ctx, &packet, &packet_name, sink, index) {
            Ok(n) => info!("{}: {} message(s)", packet_name, n),
            Err(e) => ctx.report.problem(Scope::Packet, packet_name, e),
        }
        ctx.report.packets += 1;
    }

    Ok(())
}

/// Read the packet file at `path` and toss it.
pub fn toss_packet_file(
    ctx: &mut TossContext<'_>,
    path: &Path,
    name: &str,
    sink: &mut dyn MessageSink,
    index: &mut dyn IndexStore,
) -> Result<usize, Error> {
    let data = fs::read(path)?;
    toss_packet(ctx, name, &data, sink, index)
}

/// Decode the packet in `data` and hand each of its messages to `sink`.
///
/// Returns the number of messages stored by the sink. Duplicates the sink
/// drops do not advance the index. A message whose body cannot be parsed is
/// recorded and skipped; a sink or index failure abandons the rest of the
/// packet.
pub fn toss_packet(
    ctx: &mut TossContext<'_>,
    name: &str,
    data: &[u8],
    sink: &mut dyn MessageSink,
    index: &mut dyn IndexStore,
) -> Result<usize, Error> {
    let config = ctx.config;
    let header = decode_packet_header(data)?;
    if PACKET_TYPE_2 != header.packet_type {
        return Err(Error::UnsupportedPacketType(header.packet_type));
    }

    let address = format_address(&header);
    let network = resolve_network(
        &address,
        &config.networks,
        config.toss.exact_address_match,
    )
    .ok_or_else(|| Error::UnresolvedDestination(address.clone()))?;
    info!(
        "{}: {} -> {} ({})",
        name,
        FtnAddress::origin_of(&header),
        address,
        network.name
    );

    let mut records = MessageRecords::new(&data[PACKET_HEADER_SIZE..]);
    let mut tossed = 0;
    for (ix, raw) in (&mut records).enumerate() {
        debug!(
            "{}: message {}: {:?} {:?}",
            name,
            ix,
            raw.header.flags(),
            raw.header.flags2()
        );

        let message = match Message::decode(
            &raw,
            &header,
            ctx.default_charset,
            &mut ctx.counters,
        ) {
            Ok(message) => message,
            Err(e) => {
                ctx.report
                    .problem(Scope::Message, format!("{} #{}", name, ix), e);
                continue;
            },
        };

        let area_label = message
            .area
            .as_deref()
            .and_then(|area| translate_area(network, area));
        let disposition = sink.accept(&TossedMessage {
            message: &message,
            network,
            packet_address: &address,
            area_label,
        })?;
        if Disposition::Duplicate == disposition {
            debug!("{}: message {} is a duplicate", name, ix);
            ctx.report.duplicates += 1;
            continue;
        }

        if let Some(ref area) = message.area {
            let pointer = ctx.index.advance(area, &*index)?;
            debug!("{}: {} pointer now {}", name, area, pointer);
        }

        tossed += 1;
        ctx.report.messages += 1;
    }

    if records.leftover() > 2 {
        warn!(
            "{}: {} stray bytes after the last message",
            name,
            records.leftover()
        );
    }

    Ok(tossed)
}
