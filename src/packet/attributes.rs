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

//! The two attribute bytes of a packed message header.
//!
//! Together they form the 16-bit FTS-0001 attribute word; each byte is decoded
//! on its own since they are stored as separate fields.

use bitflags::bitflags;

bitflags! {
    /// The low attribute byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AttributeFlags: u8 {
        const PRIVATE = 1 << 0;
        const CRASH = 1 << 1;
        const RECEIVED = 1 << 2;
        const SENT = 1 << 3;
        const FILE_ATTACH = 1 << 4;
        const IN_TRANSIT = 1 << 5;
        const ORPHAN = 1 << 6;
        const KILL_SENT = 1 << 7;
    }
}

bitflags! {
    /// The high attribute byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AttributeFlags2: u8 {
        const LOCAL = 1 << 0;
        const HOLD = 1 << 1;
        const UNUSED = 1 << 2;
        const FILE_REQUEST = 1 << 3;
        const WANT_RECEIPT = 1 << 4;
        const IS_RECEIPT = 1 << 5;
        const AUDIT = 1 << 6;
        const FILE_UPDATE = 1 << 7;
    }
}

const FLAG_NAMES: [(&str, AttributeFlags); 8] = [
    ("private", AttributeFlags::PRIVATE),
    ("crash", AttributeFlags::CRASH),
    ("received", AttributeFlags::RECEIVED),
    ("sent", AttributeFlags::SENT),
    ("file_attach", AttributeFlags::FILE_ATTACH),
    ("in_transit", AttributeFlags::IN_TRANSIT),
    ("orphan", AttributeFlags::ORPHAN),
    ("kill_sent", AttributeFlags::KILL_SENT),
];

const FLAG2_NAMES: [(&str, AttributeFlags2); 8] = [
    ("local", AttributeFlags2::LOCAL),
    ("hold", AttributeFlags2::HOLD),
    ("unused", AttributeFlags2::UNUSED),
    ("file_request", AttributeFlags2::FILE_REQUEST),
    ("want_receipt", AttributeFlags2::WANT_RECEIPT),
    ("is_receipt", AttributeFlags2::IS_RECEIPT),
    ("audit", AttributeFlags2::AUDIT),
    ("file_update", AttributeFlags2::FILE_UPDATE),
];

impl AttributeFlags {
    /// Every bit pattern is meaningful, so this never fails.
    pub fn decode(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// All eight flags by name, least significant bit first.
    pub fn named(self) -> [(&'static str, bool); 8] {
        FLAG_NAMES.map(|(name, flag)| (name, self.contains(flag)))
    }
}

impl AttributeFlags2 {
    pub fn decode(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// All eight flags by name, least significant bit first.
    pub fn named(self) -> [(&'static str, bool); 8] {
        FLAG2_NAMES.map(|(name, flag)| (name, self.contains(flag)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_follow_bit_order() {
        for bit in 0..8 {
            let named = AttributeFlags::decode(1 << bit).named();
            for (ix, &(_, set)) in named.iter().enumerate() {
                assert_eq!(ix == bit, set, "bit {} index {}", bit, ix);
            }

            let named = AttributeFlags2::decode(1 << bit).named();
            for (ix, &(_, set)) in named.iter().enumerate() {
                assert_eq!(ix == bit, set, "bit {} index {}", bit, ix);
            }
        }
    }

    #[test]
    fn decode_specific_bytes() {
        assert_eq!(
            [
                ("private", true),
                ("crash", false),
                ("received", false),
                ("sent", true),
                ("file_attach", false),
                ("in_transit", false),
                ("orphan", false),
                ("kill_sent", true),
            ],
            AttributeFlags::decode(0x89).named()
        );
        assert_eq!(
            [
                ("local", false),
                ("hold", true),
                ("unused", false),
                ("file_request", false),
                ("want_receipt", true),
                ("is_receipt", false),
                ("audit", false),
                ("file_update", false),
            ],
            AttributeFlags2::decode(0x12).named()
        );
        assert!(AttributeFlags::decode(0).is_empty());
        assert!(AttributeFlags2::decode(0xFF).is_all());
    }
}
