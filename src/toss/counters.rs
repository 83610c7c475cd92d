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

use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;

use super::index_store::IndexStore;
use crate::support::error::Error;

/// Messages seen per area during one run.
#[derive(Clone, Debug, Default)]
pub struct AreaCounters {
    counts: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AreaSummary {
    /// Each area with its message count, ordered by area.
    pub areas: Vec<(String, u64)>,
    pub total_areas: usize,
    pub total_messages: u64,
}

impl AreaCounters {
    pub fn track(&mut self, area: &str) {
        *self.counts.entry(area.to_owned()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> AreaSummary {
        AreaSummary {
            areas: self
                .counts
                .iter()
                .map(|(area, &count)| (area.clone(), count))
                .collect(),
            total_areas: self.counts.len(),
            total_messages: self.counts.values().sum(),
        }
    }
}

impl fmt::Display for AreaSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (area, count) in &self.areas {
            writeln!(f, "Area: {} -> Total Messages: {}", area, count)?;
        }
        write!(
            f,
            "Areas: {} -> Messages: {}",
            self.total_areas, self.total_messages
        )
    }
}

/// Tracks how far each area's message pointer has advanced during a run.
///
/// The starting point for an area is fetched from the `IndexStore` the first
/// time the area is seen; nothing is written back until `flush`.
#[derive(Clone, Debug, Default)]
pub struct IndexTracker {
    pointers: BTreeMap<String, u64>,
}

impl IndexTracker {
    /// Advance `area`'s pointer past one more message and return the new
    /// value.
    pub fn advance(
        &mut self,
        area: &str,
        store: &dyn IndexStore,
    ) -> Result<u64, Error> {
        let pointer = match self.pointers.entry(area.to_owned()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(store.pointer(area)?),
        };
        *pointer += 1;
        Ok(*pointer)
    }

    pub fn pointer(&self, area: &str) -> Option<u64> {
        self.pointers.get(area).copied()
    }

    /// Persist every pointer touched in this run.
    pub fn flush(&self, store: &mut dyn IndexStore) -> Result<(), Error> {
        for (area, &pointer) in &self.pointers {
            store.set_pointer(area, pointer)?;
        }
        Ok(())
    }
}
