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

//! Persistence of per-area message pointers.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::support::error::Error;
use crate::support::file_ops;

pub trait IndexStore {
    /// The last pointer recorded for `area`, or 0 if there is none.
    fn pointer(&self, area: &str) -> Result<u64, Error>;
    fn set_pointer(&mut self, area: &str, pointer: u64) -> Result<(), Error>;
}

/// An `IndexStore` kept in a TOML file mapping area names to pointers.
///
/// Every update rewrites the file atomically.
#[derive(Debug)]
pub struct TomlIndexStore {
    path: PathBuf,
    pointers: BTreeMap<String, u64>,
}

impl TomlIndexStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_owned();
        let pointers = match fs::read(&path) {
            Ok(data) => toml::from_slice(&data)?,
            Err(e) if io::ErrorKind::NotFound == e.kind() => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(TomlIndexStore { path, pointers })
    }
}

impl IndexStore for TomlIndexStore {
    fn pointer(&self, area: &str) -> Result<u64, Error> {
        Ok(self.pointers.get(area).copied().unwrap_or(0))
    }

    fn set_pointer(&mut self, area: &str, pointer: u64) -> Result<(), Error> {
        self.pointers.insert(area.to_owned(), pointer);
        let data = toml::to_vec(&self.pointers)?;
        file_ops::spit(&self.path, true, 0o600, &data)?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    pub pointers: BTreeMap<String, u64>,
}

#[cfg(test)]
impl IndexStore for MemoryIndexStore {
    fn pointer(&self, area: &str) -> Result<u64, Error> {
        Ok(self.pointers.get(area).copied().unwrap_or(0))
    }

    fn set_pointer(&mut self, area: &str, pointer: u64) -> Result<(), Error> {
        self.pointers.insert(area.to_owned(), pointer);
        Ok(())
    }
}
