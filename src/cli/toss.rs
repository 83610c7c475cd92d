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

use std::fs;

use log::error;

use crate::support::error::Error;
use crate::support::sysexits::*;
use crate::support::system_config::SystemConfig;
use crate::toss::archive::InboundDirectory;
use crate::toss::counters::AreaSummary;
use crate::toss::index_store::TomlIndexStore;
use crate::toss::sink::SpoolSink;
use crate::toss::{toss_inbound, RunReport, TossContext};

pub(super) fn toss(system_config: &SystemConfig) {
    let (summary, report) = match run_toss(system_config) {
        Ok(result) => result,
        Err(exit) => exit.exit(),
    };

    println!("{}", summary);
    println!(
        "Bundles: {} -> Packets: {} -> Tossed: {} -> Duplicates: {}",
        report.bundles, report.packets, report.messages, report.duplicates
    );

    if !report.problems.is_empty() {
        eprintln!("{} problem(s):", report.problems.len());
        for problem in &report.problems {
            eprintln!("  {}", problem);
        }
        EX_DATAERR.exit();
    }
}

fn run_toss(
    system_config: &SystemConfig,
) -> Result<(AreaSummary, RunReport), Sysexit> {
    let paths = &system_config.paths;
    let mut index = TomlIndexStore::open(&paths.index).map_err(|e| {
        error!("Failed to load index '{}': {}", paths.index.display(), e);
        EX_CONFIG
    })?;

    fs::create_dir_all(&paths.spool).map_err(|e| {
        error!("Failed to create '{}': {}", paths.spool.display(), e);
        EX_CANTCREAT
    })?;
    let mut sink = SpoolSink::new(&paths.spool);
    let source = InboundDirectory::new(&paths.inbound);

    let mut ctx = TossContext::new(system_config);
    toss_inbound(&mut ctx, &source, &mut sink, &mut index).map_err(|e| {
        error!("Toss aborted: {}", e);
        match e {
            Error::Io(_) => EX_IOERR,
            _ => EX_SOFTWARE,
        }
    })?;

    Ok((ctx.counters.summary(), ctx.report))
}
