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

//! Codecs for the fixed-size headers of a type 2 packet.
//!
//! A packet begins with a 58-byte packet header:
//!
//! | Offset | Size | Field                 |
//! |-------:|-----:|-----------------------|
//! |      0 |    2 | `origin_node`         |
//! |      2 |    2 | `destination_node`    |
//! |      4 |   12 | year, month, day, hour, minute, second |
//! |     16 |    2 | `baud`                |
//! |     18 |    2 | `packet_type` (2)     |
//! |     20 |    2 | `origin_network`      |
//! |     22 |    2 | `destination_network` |
//! |     24 |    1 | `product_code_low`    |
//! |     25 |    1 | `revision_major`      |
//! |     26 |    8 | `password`            |
//! |     34 |    2 | `origin_zone`         |
//! |     36 |    2 | `destination_zone`    |
//! |     38 |    2 | `aux_network`         |
//! |     40 |    2 | `capability_word_a`   |
//! |     42 |    1 | `product_code_high`   |
//! |     43 |    1 | `revision_minor`      |
//! |     44 |    2 | `capability_word_b`   |
//! |     46 |    4 | `origin_zone2`, `destination_zone2` |
//! |     50 |    4 | `origin_point`, `destination_point` |
//! |     54 |    4 | `product_data`        |
//!
//! Each packed message then starts with a 14-byte message header. All
//! integers are little-endian.
//!
//! The decoders accept any field values; checking things like the packet type
//! is up to the caller.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::attributes::{AttributeFlags, AttributeFlags2};
use crate::support::error::Error;

pub const PACKET_HEADER_SIZE: usize = 58;
pub const MESSAGE_HEADER_SIZE: usize = 14;

/// The only packet type this decoder understands.
pub const PACKET_TYPE_2: u16 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacketHeader {
    pub origin_node: u16,
    pub destination_node: u16,
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub baud: u16,
    pub packet_type: u16,
    pub origin_network: u16,
    pub destination_network: u16,
    pub product_code_low: u8,
    pub revision_major: u8,
    pub password: [u8; 8],
    pub origin_zone: u16,
    pub destination_zone: u16,
    pub aux_network: u16,
    pub capability_word_a: u16,
    pub product_code_high: u8,
    pub revision_minor: u8,
    pub capability_word_b: u16,
    pub origin_zone2: u16,
    pub destination_zone2: u16,
    pub origin_point: u16,
    pub destination_point: u16,
    pub product_data: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub message_type: u16,
    pub origin_node: u16,
    pub destination_node: u16,
    pub origin_network: u16,
    pub destination_network: u16,
    pub attributes: u8,
    pub attributes2: u8,
    pub cost: u16,
}

/// Decode the packet header from the start of `bytes`.
///
/// Anything after the first `PACKET_HEADER_SIZE` bytes is ignored.
pub fn decode_packet_header(bytes: &[u8]) -> Result<PacketHeader, Error> {
    let mut r = fixed(bytes, PACKET_HEADER_SIZE, "packet header")?;
    Ok(PacketHeader::read_from(&mut r)?)
}

/// Decode a message header from the start of `bytes`.
///
/// Anything after the first `MESSAGE_HEADER_SIZE` bytes is ignored.
pub fn decode_message_header(bytes: &[u8]) -> Result<MessageHeader, Error> {
    let mut r = fixed(bytes, MESSAGE_HEADER_SIZE, "message header")?;
    Ok(MessageHeader::read_from(&mut r)?)
}

fn fixed<'a>(
    bytes: &'a [u8],
    need: usize,
    what: &'static str,
) -> Result<&'a [u8], Error> {
    bytes.get(..need).ok_or(Error::Truncated {
        what,
        need,
        got: bytes.len(),
    })
}

impl PacketHeader {
    fn read_from(r: &mut impl Read) -> io::Result<Self> {
        let origin_node = r.read_u16::<LittleEndian>()?;
        let destination_node = r.read_u16::<LittleEndian>()?;
        let year = r.read_u16::<LittleEndian>()?;
        let month = r.read_u16::<LittleEndian>()?;
        let day = r.read_u16::<LittleEndian>()?;
        let hour = r.read_u16::<LittleEndian>()?;
        let minute = r.read_u16::<LittleEndian>()?;
        let second = r.read_u16::<LittleEndian>()?;
        let baud = r.read_u16::<LittleEndian>()?;
        let packet_type = r.read_u16::<LittleEndian>()?;
        let origin_network = r.read_u16::<LittleEndian>()?;
        let destination_network = r.read_u16::<LittleEndian>()?;
        let product_code_low = r.read_u8()?;
        let revision_major = r.read_u8()?;
        let mut password = [0u8; 8];
        r.read_exact(&mut password)?;
        let origin_zone = r.read_u16::<LittleEndian>()?;
        let destination_zone = r.read_u16::<LittleEndian>()?;
        let aux_network = r.read_u16::<LittleEndian>()?;
        let capability_word_a = r.read_u16::<LittleEndian>()?;
        let product_code_high = r.read_u8()?;
        let revision_minor = r.read_u8()?;
        let capability_word_b = r.read_u16::<LittleEndian>()?;
        let origin_zone2 = r.read_u16::<LittleEndian>()?;
        let destination_zone2 = r.read_u16::<LittleEndian>()?;
        let origin_point = r.read_u16::<LittleEndian>()?;
        let destination_point = r.read_u16::<LittleEndian>()?;
        let product_data = r.read_u32::<LittleEndian>()?;

        Ok(PacketHeader {
            origin_node,
            destination_node,
            year,
            month,
            day,
            hour,
            minute,
            second,
            baud,
            packet_type,
            origin_network,
            destination_network,
            product_code_low,
            revision_major,
            password,
            origin_zone,
            destination_zone,
            aux_network,
            capability_word_a,
            product_code_high,
            revision_minor,
            capability_word_b,
            origin_zone2,
            destination_zone2,
            origin_point,
            destination_point,
            product_data,
        })
    }

    /// Write this header in its exact 58-byte wire form.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        w.write_u16::<LittleEndian>(self.origin_node)?;
        w.write_u16::<LittleEndian>(self.destination_node)?;
        w.write_u16::<LittleEndian>(self.year)?;
        w.write_u16::<LittleEndian>(self.month)?;
        w.write_u16::<LittleEndian>(self.day)?;
        w.write_u16::<LittleEndian>(self.hour)?;
        w.write_u16::<LittleEndian>(self.minute)?;
        w.write_u16::<LittleEndian>(self.second)?;
        w.write_u16::<LittleEndian>(self.baud)?;
        w.write_u16::<LittleEndian>(self.packet_type)?;
        w.write_u16::<LittleEndian>(self.origin_network)?;
        w.write_u16::<LittleEndian>(self.destination_network)?;
        w.write_u8(self.product_code_low)?;
        w.write_u8(self.revision_major)?;
        w.write_all(&self.password)?;
        w.write_u16::<LittleEndian>(self.origin_zone)?;
        w.write_u16::<LittleEndian>(self.destination_zone)?;
        w.write_u16::<LittleEndian>(self.aux_network)?;
        w.write_u16::<LittleEndian>(self.capability_word_a)?;
        w.write_u8(self.product_code_high)?;
        w.write_u8(self.revision_minor)?;
        w.write_u16::<LittleEndian>(self.capability_word_b)?;
        w.write_u16::<LittleEndian>(self.origin_zone2)?;
        w.write_u16::<LittleEndian>(self.destination_zone2)?;
        w.write_u16::<LittleEndian>(self.origin_point)?;
        w.write_u16::<LittleEndian>(self.destination_point)?;
        w.write_u32::<LittleEndian>(self.product_data)?;
        Ok(())
    }

    /// The password field, with trailing NULs removed.
    pub fn password_text(&self) -> &[u8] {
        let end = self
            .password
            .iter()
            .rposition(|&b| 0 != b)
            .map_or(0, |ix| ix + 1);
        &self.password[..end]
    }
}

impl MessageHeader {
    fn read_from(r: &mut impl Read) -> io::Result<Self> {
        Ok(MessageHeader {
            message_type: r.read_u16::<LittleEndian>()?,
            origin_node: r.read_u16::<LittleEndian>()?,
            destination_node: r.read_u16::<LittleEndian>()?,
            origin_network: r.read_u16::<LittleEndian>()?,
            destination_network: r.read_u16::<LittleEndian>()?,
            attributes: r.read_u8()?,
            attributes2: r.read_u8()?,
            cost: r.read_u16::<LittleEndian>()?,
        })
    }

    /// Write this header in its exact 14-byte wire form.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        w.write_u16::<LittleEndian>(self.message_type)?;
        w.write_u16::<LittleEndian>(self.origin_node)?;
        w.write_u16::<LittleEndian>(self.destination_node)?;
        w.write_u16::<LittleEndian>(self.origin_network)?;
        w.write_u16::<LittleEndian>(self.destination_network)?;
        w.write_u8(self.attributes)?;
        w.write_u8(self.attributes2)?;
        w.write_u16::<LittleEndian>(self.cost)?;
        Ok(())
    }

    pub fn flags(&self) -> AttributeFlags {
        AttributeFlags::decode(self.attributes)
    }

    pub fn flags2(&self) -> AttributeFlags2 {
        AttributeFlags2::decode(self.attributes2)
    }
}
