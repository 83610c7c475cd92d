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

//! Discovery and extraction of inbound bundles.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::support::error::Error;
use crate::support::file_ops;

pub trait BundleSource {
    /// List the bundles waiting to be tossed, in processing order.
    fn bundles(&self) -> Result<Vec<PathBuf>, Error>;

    /// Unpack every packet in `bundle` into the directory `dest`.
    ///
    /// Any failure is reported as `Error::ExtractionFailure`.
    fn extract(&self, bundle: &Path, dest: &Path) -> Result<(), Error>;
}

/// A `BundleSource` reading a plain inbound directory.
///
/// Every regular file in the directory is a bundle. Files named `*.pkt` are
/// bare packets and are copied as-is; everything else is treated as a ZIP
/// archive, which is what day-of-week bundles (`*.mo0`, `*.tu1`, ...) are in
/// practice.
#[derive(Clone, Debug)]
pub struct InboundDirectory {
    inbound: PathBuf,
}

impl InboundDirectory {
    pub fn new(inbound: impl Into<PathBuf>) -> Self {
        InboundDirectory {
            inbound: inbound.into(),
        }
    }
}

fn is_bare_packet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("pkt"))
}

impl BundleSource for InboundDirectory {
    fn bundles(&self) -> Result<Vec<PathBuf>, Error> {
        Ok(file_ops::list_files(&self.inbound)?)
    }

    fn extract(&self, bundle: &Path, dest: &Path) -> Result<(), Error> {
        if is_bare_packet(bundle) {
            let name = bundle.file_name().unwrap_or_default();
            debug!("{} is a bare packet", bundle.display());
            fs::copy(bundle, dest.join(name))
                .map_err(|e| Error::ExtractionFailure(e.into()))?;
            return Ok(());
        }

        let file = fs::File::open(bundle)
            .map_err(|e| Error::ExtractionFailure(e.into()))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(Error::ExtractionFailure)?;
        debug!(
            "Extracting {} entries from {}",
            archive.len(),
            bundle.display()
        );
        archive.extract(dest).map_err(Error::ExtractionFailure)
    }
}
