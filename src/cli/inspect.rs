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
use std::io::{self, Write};
use std::path::Path;

use super::main::InspectSubcommand;
use crate::packet::address::FtnAddress;
use crate::packet::charset::Charset;
use crate::packet::header::{decode_packet_header, PACKET_HEADER_SIZE};
use crate::packet::model::Message;
use crate::packet::reader::MessageRecords;
use crate::support::error::Error;
use crate::support::sysexits::*;
use crate::toss::counters::AreaCounters;

#[derive(Clone, Copy, Debug)]
struct InspectOptions {
    kludges: bool,
    raw: bool,
    charset: Charset,
}

pub(super) fn inspect(cmd: InspectSubcommand) {
    let options = InspectOptions {
        kludges: cmd.kludges,
        raw: cmd.raw,
        charset: match Charset::from_label(&cmd.charset) {
            Some(charset) => charset,
            None => die!(EX_USAGE, "Unknown charset: {}", cmd.charset),
        },
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut status = None;
    for path in &cmd.packets {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                status = Some(EX_NOINPUT);
                continue;
            },
        };

        match describe_file(&mut stdout, path, &data, options) {
            Ok(()) => (),
            Err(Error::Io(e)) => die!(EX_IOERR, "Error writing output: {}", e),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                status = status.or(Some(EX_DATAERR));
            },
        }
    }

    if let Some(status) = status {
        status.exit();
    }
}

/// Describe the packet read from `path`, under a banner naming it.
///
/// Only failures to write to `out` are reported as `Error::Io`.
fn describe_file(
    out: &mut impl Write,
    path: &Path,
    data: &[u8],
    options: InspectOptions,
) -> Result<(), Error> {
    writeln!(out, "== {}", path.display())?;
    describe_packet(out, data, options)
}

fn describe_packet(
    out: &mut impl Write,
    data: &[u8],
    options: InspectOptions,
) -> Result<(), Error> {
    let header = decode_packet_header(data)?;
    writeln!(
        out,
        "Type {} packet from {} to {}",
        header.packet_type,
        FtnAddress::origin_of(&header),
        FtnAddress::destination_of(&header)
    )?;
    // The month field counts from 0
    writeln!(
        out,
        "Created: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        header.year,
        u32::from(header.month) + 1,
        header.day,
        header.hour,
        header.minute,
        header.second
    )?;
    writeln!(
        out,
        "Product: {:02x}{:02x} {}.{}",
        header.product_code_high,
        header.product_code_low,
        header.revision_major,
        header.revision_minor
    )?;
    writeln!(
        out,
        "Capabilities: {:04x} {:04x}",
        header.capability_word_a, header.capability_word_b
    )?;
    if !header.password_text().is_empty() {
        writeln!(
            out,
            "Password: {}",
            String::from_utf8_lossy(header.password_text())
        )?;
    }

    let mut counters = AreaCounters::default();
    let mut records = MessageRecords::new(&data[PACKET_HEADER_SIZE..]);
    for (ix, raw) in (&mut records).enumerate() {
        writeln!(out)?;
        writeln!(out, "-- Message {}", ix)?;
        let message =
            match Message::decode(&raw, &header, options.charset, &mut counters)
            {
                Ok(message) => message,
                Err(e) => {
                    writeln!(out, "Malformed: {}", e)?;
                    continue;
                },
            };
        describe_message(out, &message, options)?;
    }

    if records.leftover() > 2 {
        writeln!(
            out,
            "({} stray bytes after the last message)",
            records.leftover()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", counters.summary())?;
    Ok(())
}

fn describe_message(
    out: &mut impl Write,
    message: &Message,
    options: InspectOptions,
) -> Result<(), Error> {
    let header = &message.header;
    writeln!(
        out,
        "From: {} ({}/{})",
        message.sender, header.origin_network, header.origin_node
    )?;
    writeln!(
        out,
        "To: {} ({}/{})",
        message.recipient,
        header.destination_network,
        header.destination_node
    )?;
    writeln!(out, "Subject: {}", message.subject)?;
    writeln!(out, "Date: {}", message.date_time)?;
    if let Some(ref area) = message.area {
        writeln!(out, "Area: {}", area)?;
    }

    let flags = header
        .flags()
        .named()
        .iter()
        .chain(header.flags2().named().iter())
        .filter(|&&(_, set)| set)
        .map(|&(name, _)| name)
        .collect::<Vec<_>>();
    if !flags.is_empty() {
        writeln!(out, "Flags: {}", flags.join(" "))?;
    }

    if options.kludges {
        if message.kludges.is_empty() {
            writeln!(out, "(no kludges)")?;
        }
        for (key, values) in message.kludges.iter() {
            for value in values {
                writeln!(out, "^A{} {}", key, value)?;
            }
        }
    }

    writeln!(out)?;
    if options.raw {
        for line in message.serialize_body().split_terminator('\r') {
            writeln!(out, "{}", line.replace('\x01', "^A"))?;
        }
    } else {
        writeln!(out, "{}", message.text())?;
        for seen_by in &message.seen_by {
            writeln!(out, "{}", seen_by)?;
        }
    }

    Ok(())
}
