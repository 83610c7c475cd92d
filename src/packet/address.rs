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

//! Mapping packet destinations onto configured networks.

use std::fmt;

use super::header::PacketHeader;
use crate::support::system_config::NetworkConfig;

/// A `zone:net/node[.point]` FTN address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FtnAddress {
    pub zone: u16,
    pub net: u16,
    pub node: u16,
    pub point: u16,
}

impl fmt::Display for FtnAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}/{}", self.zone, self.net, self.node)?;
        if 0 != self.point {
            write!(f, ".{}", self.point)?;
        }
        Ok(())
    }
}

impl FtnAddress {
    /// The address a packet was sent to.
    ///
    /// Some mailers only fill in the second (FSC-0039) copy of the zone, so
    /// that is used when the primary one is 0.
    pub fn destination_of(header: &PacketHeader) -> Self {
        FtnAddress {
            zone: if 0 != header.destination_zone {
                header.destination_zone
            } else {
                header.destination_zone2
            },
            net: header.destination_network,
            node: header.destination_node,
            point: header.destination_point,
        }
    }

    /// The address a packet came from.
    pub fn origin_of(header: &PacketHeader) -> Self {
        FtnAddress {
            zone: if 0 != header.origin_zone {
                header.origin_zone
            } else {
                header.origin_zone2
            },
            net: header.origin_network,
            node: header.origin_node,
            point: header.origin_point,
        }
    }
}

/// Format the destination of `header` as `zone:net/node`, with `.point`
/// appended for non-zero points.
pub fn format_address(header: &PacketHeader) -> String {
    FtnAddress::destination_of(header).to_string()
}

/// Find the network which owns `address`.
///
/// Networks are tried in configuration order. Unless `exact` is set, a network
/// matches if `address` occurs anywhere within one of its node addresses.
pub fn resolve_network<'a>(
    address: &str,
    networks: &'a [NetworkConfig],
    exact: bool,
) -> Option<&'a NetworkConfig> {
    networks.iter().find(|network| {
        network.node_address.iter().any(|configured| {
            if exact {
                configured == address
            } else {
                configured.contains(address)
            }
        })
    })
}

/// Look up the label configured for `area_code` within `network`.
///
/// The comparison is case-sensitive; the first matching entry wins.
pub fn translate_area<'a>(
    network: &'a NetworkConfig,
    area_code: &str,
) -> Option<&'a str> {
    network
        .areas
        .iter()
        .find(|translation| translation.code == area_code)
        .map(|translation| translation.label.as_str())
}
