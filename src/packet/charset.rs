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

//! Decoding of the 8-bit text carried in packets.
//!
//! FTN text has no inherent encoding. A message may declare one with an
//! FTS-5003 `CHRS` kludge (e.g. `^ACHRS: CP866 2`); otherwise the IBM PC code
//! page is the traditional assumption. `encoding_rs` covers everything except
//! CP437 itself, which is small enough to carry as a table.
//!
//! Bytes below 0x80 always decode to themselves, so control characters like
//! the kludge marker survive decoding.

use std::borrow::Cow;

use encoding_rs::Encoding;
use memchr::memmem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Cp437,
    Other(&'static Encoding),
}

impl Charset {
    /// Resolve a `CHRS` identifier or WHATWG encoding label.
    ///
    /// Only ASCII-compatible encodings are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("CP437")
            || label.eq_ignore_ascii_case("IBMPC")
            || label.eq_ignore_ascii_case("IBM437")
            || label.eq_ignore_ascii_case("PC-8")
        {
            return Some(Charset::Cp437);
        }

        // FTS-5003 names that don't appear in the WHATWG label list
        if label.eq_ignore_ascii_case("LATIN-1") {
            return Some(Charset::Other(encoding_rs::WINDOWS_1252));
        }
        if label.eq_ignore_ascii_case("CP866") {
            return Some(Charset::Other(encoding_rs::IBM866));
        }
        // Plain ASCII messages can still contain stray high bytes
        if label.eq_ignore_ascii_case("ASCII") {
            return Some(Charset::Cp437);
        }

        // Kludges, AREA and SEEN-BY lines must survive decoding, which rules
        // out UTF-16 and the replacement encoding
        Encoding::for_label(label.as_bytes())
            .filter(|encoding| encoding.is_ascii_compatible())
            .map(Charset::Other)
    }

    /// Determine the charset of a raw message text block from its `CHRS`
    /// kludge, falling back to `default`.
    pub fn of_message(raw: &[u8], default: Charset) -> Self {
        declared_charset(raw)
            .and_then(|label| Charset::from_label(&label))
            .unwrap_or(default)
    }

    pub fn decode<'a>(self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Charset::Cp437 => decode_cp437(bytes),
            Charset::Other(encoding) => {
                encoding.decode_without_bom_handling(bytes).0
            },
        }
    }
}

/// Extract the charset identifier from the first `CHRS` kludge in `raw`.
///
/// The kludge value is `<identifier> <level>`; only the identifier is
/// returned.
pub fn declared_charset(raw: &[u8]) -> Option<String> {
    let start = memmem::find(raw, b"\x01CHRS:")? + 6;
    let rest = &raw[start..];
    let end = memchr::memchr(b'\r', rest).unwrap_or(rest.len());
    let value = String::from_utf8_lossy(&rest[..end]);
    value.split_whitespace().next().map(str::to_owned)
}

fn decode_cp437(bytes: &[u8]) -> Cow<'_, str> {
    if bytes.is_ascii() {
        return String::from_utf8_lossy(bytes);
    }

    Cow::Owned(
        bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    CP437_HIGH[(b - 0x80) as usize]
                }
            })
            .collect(),
    )
}

static CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä',
    'Å', 'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥',
    '₧', 'ƒ', 'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼',
    '¡', '«', '»', '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗',
    '╝', '╜', '╛', '┐', '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩',
    '╦', '╠', '═', '╬', '╧', '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘',
    '┌', '█', '▄', '▌', '▐', '▀', 'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ',
    'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈',
    '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];
