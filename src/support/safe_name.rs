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

/// Determine whether the given name is "safe" to use as a single path
/// component.
///
/// Area tags and network names come straight out of packets and configuration
/// files and end up as directory names, so this excludes empty names, anything
/// that could cause directory traversal or hidden files, and control
/// characters. Dots elsewhere are fine since area tags like `RU.ANEKDOT` are
/// common.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() &&
        name.len() <= 128 &&
        // Block directory traversal through .. and creation of hidden files on
        // UNIX
        !name.starts_with('.') &&
        !name.contains('/') &&
        // Only a path separator on Windows, but always block since it has high
        // potential of causing problems
        !name.contains('\\') &&
        !name.contains(|c: char| c < ' ' || c == '\x7F')
}
