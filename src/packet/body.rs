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

//! Separation of control lines from displayable text in a message body.
//!
//! Lines are delimited by CR. The body is scanned in two stages: everything up
//! to and including the origin line is the body proper, where `AREA:` markers,
//! kludges and a few kinds of junk are pulled out. After the origin line, only
//! kludges and `SEEN-BY:` lines may occur; anything else means the message is
//! malformed.
//!
//! Empty lines are always kept as blank text, in either stage, since packed
//! bodies customarily end with a CR.

use std::borrow::Cow;

use super::model::Kludges;
use crate::support::error::Error;
use crate::toss::counters::AreaCounters;

const KLUDGE_MARKER: char = '\x01';
const SAUCE_MARKER: &str = "\x1ASAUCE00";
const EOT: char = '\x04';

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedBody {
    pub area: Option<String>,
    pub kludges: Kludges,
    pub tag_line: Option<String>,
    pub origin_line: Option<String>,
    pub seen_by: Vec<String>,
    pub lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Body,
    Trailer,
}

/// Classify every line of `text`.
///
/// Each `AREA:` line is counted in `counters`, even if the message later turns
/// out to be malformed.
pub fn parse_body(
    text: &str,
    counters: &mut AreaCounters,
) -> Result<ParsedBody, Error> {
    let mut parsed = ParsedBody::default();
    let mut stage = Stage::Body;

    for line in text.split('\r') {
        let line = if line.contains('\n') {
            Cow::Owned(line.replace('\n', ""))
        } else {
            Cow::Borrowed(line)
        };

        if line.is_empty() {
            parsed.lines.push(String::new());
            continue;
        }

        match stage {
            Stage::Body => {
                if let Some(area) = line.strip_prefix("AREA:") {
                    let area = area.trim().to_lowercase();
                    counters.track(&area);
                    parsed.area = Some(area);
                } else if line.starts_with(KLUDGE_MARKER) {
                    add_kludge(&mut parsed.kludges, &line);
                } else if line.starts_with("--- ") {
                    parsed.tag_line = Some(line.clone().into_owned());
                    parsed.lines.push(line.into_owned());
                } else if is_origin_line(&line) {
                    parsed.origin_line = Some(line.clone().into_owned());
                    parsed.lines.push(line.into_owned());
                    stage = Stage::Trailer;
                } else if line.starts_with(SAUCE_MARKER)
                    || line.ends_with(EOT)
                {
                    // Leftovers of SAUCE records from uploaded art
                } else {
                    parsed.lines.push(line.into_owned());
                }
            },

            Stage::Trailer => {
                if line.starts_with(KLUDGE_MARKER) {
                    add_kludge(&mut parsed.kludges, &line);
                } else if line.starts_with("SEEN-BY:") {
                    parsed.seen_by.push(line.into_owned());
                } else {
                    return Err(Error::UnexpectedTrailerLine(line.into_owned()));
                }
            },
        }
    }

    Ok(parsed)
}

/// Whether `Origin:` occurs within characters 2 through 9 of `line`.
///
/// The conventional form is ` * Origin: ...`, but not every system uses the
/// asterisk, hence the window rather than a prefix.
fn is_origin_line(line: &str) -> bool {
    let offset =
        |n| line.char_indices().nth(n).map_or(line.len(), |(ix, _)| ix);
    line[offset(2)..offset(10)].contains("Origin:")
}

/// Split a kludge line into its key (without the marker) and value at the
/// first run of whitespace.
fn add_kludge(kludges: &mut Kludges, line: &str) {
    let line = line.trim_end();
    let content = &line[KLUDGE_MARKER.len_utf8()..];
    match content.find(char::is_whitespace) {
        Some(split) => {
            kludges.push(&content[..split], content[split..].trim_start())
        },
        None => kludges.push(content, ""),
    }
}
