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

//! Splitting the data after a packet header into packed messages.
//!
//! Each packed message is a 14-byte message header followed by five
//! NUL-terminated strings: date, recipient, sender, subject and text. The
//! packet ends with a two-byte zero terminator, which is too short to be a
//! message header.

use super::header::{decode_message_header, MessageHeader, MESSAGE_HEADER_SIZE};

/// The undecoded parts of one packed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub header: MessageHeader,
    pub date_time: &'a [u8],
    pub recipient: &'a [u8],
    pub sender: &'a [u8],
    pub subject: &'a [u8],
    pub text: &'a [u8],
}

/// Iterates the packed messages in `data`, which starts immediately after the
/// packet header.
///
/// Iteration ends as soon as fewer than `MESSAGE_HEADER_SIZE` bytes remain.
/// A string missing its terminator runs to the end of the data.
#[derive(Clone, Debug)]
pub struct MessageRecords<'a> {
    data: &'a [u8],
    offset: usize,
    leftover: usize,
}

impl<'a> MessageRecords<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MessageRecords {
            data,
            offset: 0,
            leftover: 0,
        }
    }

    /// Once iteration has finished, the number of bytes which remained but
    /// were too few to form a message header.
    pub fn leftover(&self) -> usize {
        self.leftover
    }

    fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or(&[])
    }

    fn read_cstring(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        let len = memchr::memchr(0, rest).unwrap_or(rest.len());
        self.offset += len + 1;
        &rest[..len]
    }
}

impl<'a> Iterator for MessageRecords<'a> {
    type Item = RawMessage<'a>;

    fn next(&mut self) -> Option<RawMessage<'a>> {
        let header = match decode_message_header(self.remaining()) {
            Ok(header) => header,
            Err(_) => {
                self.leftover = self.remaining().len();
                self.offset = self.data.len();
                return None;
            },
        };
        self.offset += MESSAGE_HEADER_SIZE;

        Some(RawMessage {
            header,
            date_time: self.read_cstring(),
            recipient: self.read_cstring(),
            sender: self.read_cstring(),
            subject: self.read_cstring(),
            text: self.read_cstring(),
        })
    }
}
