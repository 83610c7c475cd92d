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

use chrono::NaiveDateTime;

use super::body::{parse_body, ParsedBody};
use super::charset::Charset;
use super::header::{MessageHeader, PacketHeader};
use super::reader::RawMessage;
use crate::support::error::Error;
use crate::toss::counters::AreaCounters;

/// Kludge lines, grouped by key.
///
/// Keys keep their case and any trailing colon (`MSGID:`, `PID:`, `INTL`,
/// ...). Keys are kept in the order they were first seen, and values in the
/// order they occurred.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kludges {
    entries: Vec<(String, Vec<String>)>,
}

impl Kludges {
    pub fn push(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_owned()),
            None => self.entries.push((key.to_owned(), vec![value.to_owned()])),
        }
    }

    pub fn get(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[], |(_, values)| &values[..])
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), &v[..]))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully decoded packed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The packet-native date, `DD Mon YY  HH:MM:SS`.
    pub date_time: String,
    pub recipient: String,
    pub sender: String,
    pub subject: String,
    /// The lower-cased area code, absent for netmail.
    pub area: Option<String>,
    pub kludges: Kludges,
    pub tag_line: Option<String>,
    pub origin_line: Option<String>,
    pub seen_by: Vec<String>,
    /// The displayable text, including the tag and origin lines.
    pub lines: Vec<String>,
    pub header: MessageHeader,
    /// The header of the packet this message arrived in.
    pub packet: PacketHeader,
}

impl Message {
    /// Decode `raw` and run its text through the body parser.
    ///
    /// `default_charset` applies when the message has no `CHRS` kludge.
    pub fn decode(
        raw: &RawMessage<'_>,
        packet: &PacketHeader,
        default_charset: Charset,
        counters: &mut AreaCounters,
    ) -> Result<Self, Error> {
        let charset = Charset::of_message(raw.text, default_charset);
        let ParsedBody {
            area,
            kludges,
            tag_line,
            origin_line,
            seen_by,
            lines,
        } = parse_body(&charset.decode(raw.text), counters)?;

        Ok(Message {
            date_time: charset.decode(raw.date_time).into_owned(),
            recipient: charset.decode(raw.recipient).into_owned(),
            sender: charset.decode(raw.sender).into_owned(),
            subject: charset.decode(raw.subject).into_owned(),
            area,
            kludges,
            tag_line,
            origin_line,
            seen_by,
            lines,
            header: raw.header,
            packet: *packet,
        })
    }

    /// Parse `date_time`.
    ///
    /// Years are two digits; chrono places `00`-`68` in the 2000s. Time zones
    /// (the `TZUTC` kludge) are not applied.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(
            self.date_time.trim(),
            "%d %b %y %H:%M:%S",
        )
        .ok()
    }

    /// The `MSGID` kludge value, for duplicate detection.
    pub fn msgid(&self) -> Option<&str> {
        self.kludges.first("MSGID:")
    }

    /// The displayable text with local line endings.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Reassemble a packed message body.
    ///
    /// This is best-effort: kludges which originally followed the origin line
    /// are emitted ahead of the text along with the rest.
    pub fn serialize_body(&self) -> String {
        let mut out = String::new();
        if let Some(ref area) = self.area {
            out.push_str("AREA:");
            out.push_str(&area.to_uppercase());
            out.push('\r');
        }

        for (key, values) in self.kludges.iter() {
            for value in values {
                out.push('\x01');
                out.push_str(key);
                out.push(' ');
                out.push_str(value);
                out.push('\r');
            }
        }

        for line in self.lines.iter().chain(&self.seen_by) {
            out.push_str(line);
            out.push('\r');
        }

        out
    }
}
