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

//! Builders for binary packets and bundles used throughout the tests.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::packet::header::{MessageHeader, PacketHeader, PACKET_TYPE_2};

/// Builds a type 2 packet through the header encoders.
#[derive(Clone, Debug)]
pub struct PacketBuilder {
    header: PacketHeader,
    messages: Vec<u8>,
}

impl Default for PacketBuilder {
    fn default() -> Self {
        PacketBuilder {
            header: PacketHeader {
                origin_zone: 1,
                origin_network: 154,
                origin_node: 10,
                year: 2015,
                month: 1,
                day: 26,
                hour: 18,
                minute: 4,
                packet_type: PACKET_TYPE_2,
                capability_word_a: 0x0100,
                capability_word_b: 0x0001,
                ..PacketHeader::default()
            },
            messages: Vec::new(),
        }
    }
}

impl PacketBuilder {
    pub fn to(mut self, zone: u16, net: u16, node: u16, point: u16) -> Self {
        self.header.destination_zone = zone;
        self.header.destination_zone2 = zone;
        self.header.destination_network = net;
        self.header.destination_node = node;
        self.header.destination_point = point;
        self
    }

    pub fn packet_type(mut self, packet_type: u16) -> Self {
        self.header.packet_type = packet_type;
        self
    }

    /// Append a message from `Sysop` to `All` with the given body text.
    pub fn message(self, text: &[u8]) -> Self {
        self.message_full(
            MessageHeader {
                message_type: 2,
                origin_node: 10,
                destination_node: 140,
                origin_network: 154,
                destination_network: 154,
                ..MessageHeader::default()
            },
            b"26 Jan 15  18:04:00",
            b"All",
            b"Sysop",
            b"Test",
            text,
        )
    }

    pub fn message_full(
        mut self,
        header: MessageHeader,
        date_time: &[u8],
        recipient: &[u8],
        sender: &[u8],
        subject: &[u8],
        text: &[u8],
    ) -> Self {
        header.write_to(&mut self.messages).unwrap();
        for field in &[date_time, recipient, sender, subject, text] {
            self.messages.extend_from_slice(field);
            self.messages.push(0);
        }
        self
    }

    /// The finished packet, with its two-byte terminator.
    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        self.header.write_to(&mut data).unwrap();
        data.extend_from_slice(&self.messages);
        data.extend_from_slice(&[0, 0]);
        data
    }
}

/// Write a zip bundle at `path` holding the given `(name, content)` entries.
pub fn zip_bundle(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for &(name, content) in entries {
        zip.start_file(name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}
