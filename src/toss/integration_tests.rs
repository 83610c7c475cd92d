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

use std::fs;

use tempfile::TempDir;

use super::archive::InboundDirectory;
use super::counters::AreaSummary;
use super::index_store::{IndexStore, MemoryIndexStore};
use super::sink::{Disposition, MessageSink, TossedMessage};
use super::*;
use crate::packet::header::MessageHeader;
use crate::support::system_config::{
    AreaTranslation, NetworkConfig, PathConfig, TossConfig,
};
use crate::test_data::{zip_bundle, PacketBuilder};

/// What a `MemorySink` remembers of each message.
#[derive(Debug)]
struct Received {
    message: Message,
    network: String,
    packet_address: String,
    area_label: Option<String>,
}

#[derive(Debug, Default)]
struct MemorySink {
    received: Vec<Received>,
    fail: bool,
}

impl MessageSink for MemorySink {
    fn accept(
        &mut self,
        tossed: &TossedMessage<'_>,
    ) -> Result<Disposition, Error> {
        if self.fail {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "sink is full",
            )));
        }

        let msgid = tossed.message.msgid();
        if msgid.is_some()
            && self.received.iter().any(|r| r.message.msgid() == msgid)
        {
            return Ok(Disposition::Duplicate);
        }

        self.received.push(Received {
            message: tossed.message.clone(),
            network: tossed.network.name.clone(),
            packet_address: tossed.packet_address.to_owned(),
            area_label: tossed.area_label.map(str::to_owned),
        });
        Ok(Disposition::Stored)
    }
}

struct Setup {
    root: TempDir,
    config: SystemConfig,
}

fn set_up() -> Setup {
    crate::init_test_log();

    let root = TempDir::new().unwrap();
    let mut paths = PathConfig {
        inbound: "in".into(),
        unpack: "unpack".into(),
        ..PathConfig::default()
    };
    paths.resolve_against(root.path());
    fs::create_dir(&paths.inbound).unwrap();

    let config = SystemConfig {
        paths,
        toss: TossConfig::default(),
        networks: vec![
            NetworkConfig {
                name: "agoranet".to_owned(),
                node_address: vec!["46:1/140".to_owned()],
                export_address: vec!["46:1/100".to_owned()],
                areas: vec![
                    AreaTranslation::parse("agn_gen: general").unwrap(),
                ],
            },
            NetworkConfig {
                name: "fidonet".to_owned(),
                node_address: vec!["1:154/140".to_owned()],
                export_address: vec!["1:154/10".to_owned()],
                areas: vec![
                    AreaTranslation::parse("fdn_ent: enthral_bbs").unwrap(),
                ],
            },
        ],
    };

    Setup { root, config }
}

impl Setup {
    fn write_bundle(&self, name: &str, packets: &[(&str, Vec<u8>)]) {
        let entries = packets
            .iter()
            .map(|(entry, data)| (*entry, &data[..]))
            .collect::<Vec<_>>();
        zip_bundle(&self.config.paths.inbound.join(name), &entries);
    }

    fn run(
        &self,
        sink: &mut MemorySink,
        index: &mut MemoryIndexStore,
    ) -> (RunReport, AreaSummary) {
        let mut ctx = TossContext::new(&self.config);
        toss_inbound(
            &mut ctx,
            &InboundDirectory::new(&self.config.paths.inbound),
            sink,
            index,
        )
        .unwrap();
        (ctx.report, ctx.counters.summary())
    }

    fn assert_unpack_empty(&self) {
        assert_eq!(
            0,
            fs::read_dir(&self.config.paths.unpack).unwrap().count(),
            "unpack directory not cleared under {}",
            self.root.path().display()
        );
    }
}

const SCENARIO_A_BODY: &[u8] = b"AREA:FDN_ENT\rHello\r--- tagline\r\
                                 * Origin: test (1:154/140)\rSEEN-BY: 1/1";

#[test]
fn echomail_message_is_tossed() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    let (report, summary) = setup.run(&mut sink, &mut index);

    assert!(report.problems.is_empty(), "{:?}", report.problems);
    assert_eq!((1, 1, 1), (report.bundles, report.packets, report.messages));
    assert_eq!(1, sink.received.len());

    let received = &sink.received[0];
    assert_eq!("fidonet", received.network);
    assert_eq!("1:154/140", received.packet_address);
    assert_eq!(Some("enthral_bbs"), received.area_label.as_deref());

    let message = &received.message;
    assert_eq!(Some("fdn_ent"), message.area.as_deref());
    assert_eq!(Some("--- tagline"), message.tag_line.as_deref());
    assert_eq!(
        Some("* Origin: test (1:154/140)"),
        message.origin_line.as_deref()
    );
    assert_eq!(vec!["SEEN-BY: 1/1".to_owned()], message.seen_by);
    assert_eq!(
        vec!["Hello", "--- tagline", "* Origin: test (1:154/140)"],
        message.lines
    );
    assert_eq!("Sysop", message.sender);
    assert_eq!("All", message.recipient);

    assert_eq!(1, summary.total_areas);
    assert_eq!(1, summary.total_messages);
    assert_eq!(1, index.pointer("fdn_ent").unwrap());
    setup.assert_unpack_empty();
}

#[test]
fn unsupported_packet_type_is_abandoned() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .packet_type(1)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let (report, _) = setup.run(&mut sink, &mut MemoryIndexStore::default());

    assert!(sink.received.is_empty());
    assert_eq!(1, report.problems.len());
    assert_eq!(Scope::Packet, report.problems[0].scope);
    assert_eq!("0000fff1.mo0/a.pkt", report.problems[0].subject);
    assert_matches!(
        Error::UnsupportedPacketType(1),
        &report.problems[0].error
    );
    setup.assert_unpack_empty();
}

#[test]
fn nested_packets_are_tossed() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[
            (
                "sub/a.pkt",
                PacketBuilder::default()
                    .to(1, 154, 140, 0)
                    .message(SCENARIO_A_BODY)
                    .build(),
            ),
            (
                "sub/deeper/b.pkt",
                PacketBuilder::default()
                    .to(1, 154, 140, 0)
                    .packet_type(1)
                    .build(),
            ),
        ],
    );

    let mut sink = MemorySink::default();
    let (report, _) = setup.run(&mut sink, &mut MemoryIndexStore::default());

    assert_eq!(2, report.packets);
    assert_eq!(1, sink.received.len());
    assert_eq!(Some("fdn_ent"), sink.received[0].message.area.as_deref());
    assert_eq!(1, report.problems.len());
    assert_eq!("0000fff1.mo0/sub/deeper/b.pkt", report.problems[0].subject);
    setup.assert_unpack_empty();
}

#[test]
fn unresolved_destination_is_abandoned() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(2, 5020, 1, 0)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let (report, _) = setup.run(&mut sink, &mut MemoryIndexStore::default());

    assert!(sink.received.is_empty());
    assert_eq!(1, report.problems.len());
    match report.problems[0].error {
        Error::UnresolvedDestination(ref address) => {
            assert_eq!("2:5020/1", address)
        },
        ref e => panic!("Unexpected error: {}", e),
    }
}

#[test]
fn terminator_ends_packet_without_partial_message() {
    let setup = set_up();
    let packet = PacketBuilder::default()
        .to(46, 1, 140, 0)
        .message(b"AREA:AGN_GEN\rOne\r")
        .message(b"AREA:AGN_GEN\rTwo\r");
    let data = packet.build();
    // Exactly two bytes remain after the last message
    assert_eq!(&[0, 0], &data[data.len() - 2..]);

    let mut ctx = TossContext::new(&setup.config);
    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    let tossed =
        toss_packet(&mut ctx, "a.pkt", &data, &mut sink, &mut index).unwrap();

    assert_eq!(2, tossed);
    assert!(ctx.report.problems.is_empty());
    assert_eq!(vec!["One", ""], sink.received[0].message.lines);
    assert_eq!("agoranet", sink.received[1].network);
    assert_eq!(Some("general"), sink.received[1].area_label.as_deref());
    assert_eq!(Some(2), ctx.index.pointer("agn_gen"));
}

#[test]
fn truncated_packet_header_is_abandoned() {
    let setup = set_up();
    let mut ctx = TossContext::new(&setup.config);
    let mut sink = MemorySink::default();

    assert_matches!(
        Err(Error::Truncated { need: 58, got: 20, .. }),
        toss_packet(
            &mut ctx,
            "short.pkt",
            &[0u8; 20],
            &mut sink,
            &mut MemoryIndexStore::default(),
        )
    );
    assert!(sink.received.is_empty());
}

#[test]
fn malformed_trailer_skips_only_that_message() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .message(
                    b"AREA:FDN_ENT\rHello\r * Origin: x (1:154/10)\r\
                      This should not be here\r",
                )
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    let (report, summary) = setup.run(&mut sink, &mut index);

    assert_eq!(1, sink.received.len());
    assert_eq!(1, report.problems.len());
    assert_eq!(Scope::Message, report.problems[0].scope);
    assert_eq!("0000fff1.mo0/a.pkt #0", report.problems[0].subject);
    assert_matches!(
        Error::UnexpectedTrailerLine(..),
        &report.problems[0].error
    );
    // Both AREA lines were seen, but only one message reached the index
    assert_eq!(2, summary.total_messages);
    assert_eq!(1, index.pointer("fdn_ent").unwrap());
}

#[test]
fn failed_extraction_does_not_stop_other_bundles() {
    let setup = set_up();
    fs::write(
        setup.config.paths.inbound.join("0000fff1.mo0"),
        b"not a zip file",
    )
    .unwrap();
    setup.write_bundle(
        "0000fff2.tu0",
        &[(
            "b.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let (report, _) = setup.run(&mut sink, &mut MemoryIndexStore::default());

    assert_eq!(2, report.bundles);
    assert_eq!(1, report.problems.len());
    assert_eq!(Scope::Bundle, report.problems[0].scope);
    assert_eq!("0000fff1.mo0", report.problems[0].subject);
    assert_matches!(Error::ExtractionFailure(..), &report.problems[0].error);
    assert_eq!(1, sink.received.len());
    setup.assert_unpack_empty();
}

#[test]
fn bare_packet_is_tossed() {
    let setup = set_up();
    fs::write(
        setup.config.paths.inbound.join("00c0ffee.pkt"),
        PacketBuilder::default()
            .to(1, 154, 140, 0)
            .message(b"\x01INTL 1:154/140 1:154/10\rNetmail for you\r")
            .build(),
    )
    .unwrap();

    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    let (report, summary) = setup.run(&mut sink, &mut index);

    assert!(report.problems.is_empty(), "{:?}", report.problems);
    assert_eq!(1, sink.received.len());
    let message = &sink.received[0].message;
    assert_eq!(None, message.area);
    assert_eq!(None, sink.received[0].area_label);
    assert_eq!(Some("1:154/140 1:154/10"), message.kludges.first("INTL"));
    assert_eq!(0, summary.total_areas);
    assert!(index.pointers.is_empty());
    setup.assert_unpack_empty();
}

#[test]
fn sink_failure_abandons_packet() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[
            (
                "a.pkt",
                PacketBuilder::default()
                    .to(1, 154, 140, 0)
                    .message(SCENARIO_A_BODY)
                    .message(SCENARIO_A_BODY)
                    .build(),
            ),
            (
                "b.pkt",
                PacketBuilder::default()
                    .to(1, 154, 140, 0)
                    .message(SCENARIO_A_BODY)
                    .build(),
            ),
        ],
    );

    let mut sink = MemorySink {
        fail: true,
        ..MemorySink::default()
    };
    let mut index = MemoryIndexStore::default();
    let (report, _) = setup.run(&mut sink, &mut index);

    // One problem per packet; the second message of a.pkt is never reached
    assert_eq!(2, report.problems.len());
    assert_eq!(2, report.packets);
    assert_eq!(0, report.messages);
    assert!(report.problems.iter().all(|p| Scope::Packet == p.scope));
    assert!(index.pointers.is_empty());
}

#[test]
fn duplicates_do_not_advance_index() {
    let setup = set_up();
    let body = b"AREA:FDN_ENT\r\x01MSGID: 1:154/10 beef\rHello\r";
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .message(body)
                .message(body)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    let (report, summary) = setup.run(&mut sink, &mut index);

    assert!(report.problems.is_empty(), "{:?}", report.problems);
    assert_eq!(2, sink.received.len());
    assert_eq!((2, 1), (report.messages, report.duplicates));
    assert_eq!(3, summary.total_messages);
    assert_eq!(2, index.pointer("fdn_ent").unwrap());
}

#[test]
fn index_continues_from_stored_pointer() {
    let setup = set_up();
    setup.write_bundle(
        "0000fff1.mo0",
        &[(
            "a.pkt",
            PacketBuilder::default()
                .to(1, 154, 140, 0)
                .message(SCENARIO_A_BODY)
                .message(SCENARIO_A_BODY)
                .build(),
        )],
    );

    let mut index = MemoryIndexStore::default();
    index.set_pointer("fdn_ent", 40).unwrap();
    setup.run(&mut MemorySink::default(), &mut index);

    assert_eq!(42, index.pointer("fdn_ent").unwrap());
}

#[test]
fn point_destination_and_exact_matching() {
    let mut setup = set_up();
    setup.config.networks[1]
        .node_address
        .push("1:154/140.5".to_owned());

    let point_packet = PacketBuilder::default()
        .to(1, 154, 140, 5)
        .message(SCENARIO_A_BODY)
        .build();
    let short_node_packet = PacketBuilder::default()
        .to(1, 154, 14, 0)
        .message(SCENARIO_A_BODY)
        .build();

    let mut sink = MemorySink::default();
    let mut index = MemoryIndexStore::default();
    {
        let mut ctx = TossContext::new(&setup.config);
        toss_packet(&mut ctx, "p.pkt", &point_packet, &mut sink, &mut index)
            .unwrap();
        // Substring matching accepts 1:154/14 as part of 1:154/140
        toss_packet(
            &mut ctx,
            "s.pkt",
            &short_node_packet,
            &mut sink,
            &mut index,
        )
        .unwrap();
    }
    assert_eq!("1:154/140.5", sink.received[0].packet_address);
    assert_eq!("1:154/14", sink.received[1].packet_address);

    setup.config.toss.exact_address_match = true;
    let mut ctx = TossContext::new(&setup.config);
    assert_matches!(
        Err(Error::UnresolvedDestination(..)),
        toss_packet(
            &mut ctx,
            "s.pkt",
            &short_node_packet,
            &mut sink,
            &mut index,
        )
    );
}

#[test]
fn message_header_fields_reach_sink() {
    let setup = set_up();
    let data = PacketBuilder::default()
        .to(1, 154, 140, 0)
        .message_full(
            MessageHeader {
                message_type: 2,
                attributes: 0x01,
                attributes2: 0x01,
                cost: 7,
                ..MessageHeader::default()
            },
            b"01 Apr 21  12:00:00",
            b"Bob",
            b"Alice",
            b"Re: stuff",
            b"\x01CHRS: LATIN-1 2\rCaf\xE9\r",
        )
        .build();

    let mut ctx = TossContext::new(&setup.config);
    let mut sink = MemorySink::default();
    toss_packet(
        &mut ctx,
        "a.pkt",
        &data,
        &mut sink,
        &mut MemoryIndexStore::default(),
    )
    .unwrap();

    let message = &sink.received[0].message;
    assert_eq!("Alice", message.sender);
    assert_eq!("Bob", message.recipient);
    assert_eq!("Re: stuff", message.subject);
    assert_eq!(7, message.header.cost);
    assert!(message.header.flags().contains(
        crate::packet::attributes::AttributeFlags::PRIVATE
    ));
    assert_eq!("Café\n", message.text());
}
