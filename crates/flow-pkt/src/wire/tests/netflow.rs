// Copyright (C) 2023-present The NetGauze Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::{TimeZone, Utc};
use std::net::Ipv4Addr;

use crate::{
    decoder::FlowDecoder,
    error::DecodeError,
    netflow::*,
    record::FlowProtocol,
    registry::FieldParserRegistry,
    template::{TemplateCache, TemplateKey},
    value::{Value, ValueData},
    wire::{deserializer::DecodingContext, tests::exporter},
    FieldSpecifier,
};
use telemetryd_parse_utils::test_helpers::test_parsed_completely_with_one_input;

const TEMPLATE_PACKET: [u8; 80] = [
    0x00, 0x09, 0x00, 0x01, 0x00, 0x06, 0x14, 0x8b, 0x59, 0x77, 0x3e, 0x3d, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3c, 0x04, 0x00, 0x00, 0x0d, 0x00, 0x08, 0x00, 0x04,
    0x00, 0x0c, 0x00, 0x04, 0x00, 0x15, 0x00, 0x04, 0x00, 0x16, 0x00, 0x04, 0x00, 0x01, 0x00, 0x04,
    0x00, 0x02, 0x00, 0x04, 0x00, 0x0a, 0x00, 0x04, 0x00, 0x0e, 0x00, 0x04, 0x00, 0x07, 0x00, 0x02,
    0x00, 0x0b, 0x00, 0x02, 0x00, 0x04, 0x00, 0x01, 0x00, 0x06, 0x00, 0x01, 0x00, 0x3c, 0x00, 0x01,
];

const DATA_PACKET: [u8; 180] = [
    0x00, 0x09, 0x00, 0x04, 0x00, 0x06, 0xfe, 0xc9, 0x59, 0x77, 0x3e, 0x79, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0xa0, 0xc0, 0xa8, 0x01, 0x64, 0xd8, 0x3a, 0xd3, 0x63,
    0x00, 0x01, 0xa2, 0xa5, 0x00, 0x01, 0xa1, 0xec, 0x00, 0x00, 0x00, 0x42, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xcc, 0x85, 0x01, 0xbb, 0x11, 0x00, 0x04, 0xd8,
    0x3a, 0xd3, 0x63, 0xc0, 0xa8, 0x01, 0x64, 0x00, 0x01, 0xa2, 0xa5, 0x00, 0x01, 0xa1, 0xec, 0x00,
    0x00, 0x05, 0x62, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    0xbb, 0xcc, 0x85, 0x11, 0x00, 0x04, 0xc0, 0xa8, 0x01, 0x64, 0xd8, 0x3a, 0xd3, 0x6e, 0x00, 0x01,
    0xcb, 0x55, 0x00, 0x01, 0xcb, 0x55, 0x00, 0x00, 0x00, 0x42, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf6, 0x87, 0x01, 0xbb, 0x11, 0x00, 0x04, 0xc0, 0xa8, 0x01,
    0x64, 0xd8, 0x3a, 0xd3, 0x6e, 0x00, 0x02, 0x38, 0x75, 0x00, 0x02, 0x38, 0x75, 0x00, 0x00, 0x00,
    0x33, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf7, 0x29, 0x01,
    0xbb, 0x11, 0x00, 0x04,
];

fn template_1024() -> TemplateRecord {
    TemplateRecord::new(
        1024,
        Box::new([
            FieldSpecifier::new(0, 8, 4),
            FieldSpecifier::new(0, 12, 4),
            FieldSpecifier::new(0, 21, 4),
            FieldSpecifier::new(0, 22, 4),
            FieldSpecifier::new(0, 1, 4),
            FieldSpecifier::new(0, 2, 4),
            FieldSpecifier::new(0, 10, 4),
            FieldSpecifier::new(0, 14, 4),
            FieldSpecifier::new(0, 7, 2),
            FieldSpecifier::new(0, 11, 2),
            FieldSpecifier::new(0, 4, 1),
            FieldSpecifier::new(0, 6, 1),
            FieldSpecifier::new(0, 60, 1),
        ]),
    )
}

#[test]
fn test_template_packet() {
    let templates = TemplateCache::default();
    let registry = FieldParserRegistry::iana();
    let ctx = DecodingContext::new(FlowProtocol::NetFlowV9, exporter(), &templates, &registry);
    let good = NetFlowV9Packet::new(
        398475,
        Utc.with_ymd_and_hms(2017, 7, 25, 12, 49, 1).unwrap(),
        0,
        0,
        vec![Set::Template(Box::new([template_1024()]))],
    );
    test_parsed_completely_with_one_input(&TEMPLATE_PACKET, &ctx, &good);
    assert_eq!(ctx.diagnostics(), vec![]);
    let template = templates.get(&TemplateKey::new(exporter(), 0, 1024)).unwrap();
    assert_eq!(template.field_count(), 13);
    assert_eq!(template.min_record_length(), 39);
}

#[test]
fn test_data_packet() {
    let decoder = FlowDecoder::default();
    let outcome = decoder.decode(&TEMPLATE_PACKET, exporter()).unwrap();
    assert_eq!(outcome, Default::default());

    let outcome = decoder.decode(&DATA_PACKET, exporter()).unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(outcome.records.len(), 4);
    let record = &outcome.records[0];
    assert_eq!(record.protocol(), FlowProtocol::NetFlowV9);
    assert_eq!(record.observation_domain_id(), 0);
    assert_eq!(record.sequence_number(), Some(1));
    assert_eq!(
        record.export_time(),
        Some(Utc.with_ymd_and_hms(2017, 7, 25, 12, 50, 1).unwrap())
    );
    assert_eq!(
        record.fields(),
        &[
            Value::new(
                "sourceIPv4Address",
                ValueData::Ipv4Address(Ipv4Addr::new(192, 168, 1, 100))
            ),
            Value::new(
                "destinationIPv4Address",
                ValueData::Ipv4Address(Ipv4Addr::new(216, 58, 211, 99))
            ),
            Value::new("flowEndSysUpTime", ValueData::Unsigned32(107173)),
            Value::new("flowStartSysUpTime", ValueData::Unsigned32(106988)),
            Value::new("octetDeltaCount", ValueData::Unsigned64(66)),
            Value::new("packetDeltaCount", ValueData::Unsigned64(1)),
            Value::new("ingressInterface", ValueData::Unsigned32(0)),
            Value::new("egressInterface", ValueData::Unsigned32(0)),
            Value::new("sourceTransportPort", ValueData::Unsigned16(52357)),
            Value::new("destinationTransportPort", ValueData::Unsigned16(443)),
            Value::new("protocolIdentifier", ValueData::Unsigned8(17)),
            Value::new("tcpControlBits", ValueData::Unsigned16(0)),
            Value::new("ipVersion", ValueData::Unsigned8(4)),
        ]
    );
    let octets: Vec<_> = outcome
        .records
        .iter()
        .filter_map(|record| record.get("octetDeltaCount").and_then(Value::as_u64))
        .collect();
    assert_eq!(octets, vec![66, 1378, 66, 51]);
}

#[test]
fn test_data_packet_without_template() {
    let decoder = FlowDecoder::default();
    let outcome = decoder.decode(&DATA_PACKET, exporter()).unwrap();
    assert_eq!(outcome.records, vec![]);
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TemplateNotFound {
            exporter: exporter(),
            observation_domain_id: 0,
            template_id: 1024,
        }]
    );
}

#[test]
fn test_truncated_flowset() {
    let decoder = FlowDecoder::default();
    decoder.decode(&TEMPLATE_PACKET, exporter()).unwrap();
    let outcome = decoder
        .decode(&DATA_PACKET[..DATA_PACKET.len() - 1], exporter())
        .unwrap();
    assert_eq!(outcome.records, vec![]);
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TruncatedPacket {
            protocol: FlowProtocol::NetFlowV9,
            offset: 20,
            context: "set 1024".to_string(),
        }]
    );
}

#[test]
fn test_templates_are_not_shared_with_ipfix() {
    let decoder = FlowDecoder::default();
    decoder.decode(&TEMPLATE_PACKET, exporter()).unwrap();
    assert_eq!(decoder.netflow_templates().len(), 1);
    assert!(decoder.ipfix_templates().is_empty());
    assert_eq!(decoder.evict_exporter(exporter()), 1);
    assert!(decoder.netflow_templates().is_empty());
}

#[test]
fn test_options_template_scope() {
    let no_padding = [
        0x00, 0x09, // version
        0x00, 0x02, // count
        0x0f, 0x5e, 0x5c, 0x6b, // sys up time
        0x63, 0xd5, 0x45, 0x85, // unix seconds
        0x00, 0x09, 0x43, 0x2a, // sequence number
        0x00, 0x00, 0x00, 0x06, // source id
        0x00, 0x01, // options template flowset
        0x00, 0x1e, // length
        0x01, 0x02, // template id
        0x00, 0x04, // scope length
        0x00, 0x10, // options length
        0x00, 0x01, 0x00, 0x04, // scope system
        0x00, 0x30, 0x00, 0x04, // samplerId
        0x00, 0x54, 0x00, 0x28, // samplerName
        0x00, 0x31, 0x00, 0x01, // samplerMode
        0x00, 0x32, 0x00, 0x02, // samplerRandomInterval
        0x01, 0x02, // data flowset
        0x00, 0x37, // length
        0xd5, 0x03, 0xdf, 0x23, // scope system
        0x00, 0x00, 0x00, 0x02, // samplerId
        0x4e, 0x45, 0x54, 0x46, 0x4c, 0x4f, 0x57, 0x2d, 0x53, 0x41, 0x4d, 0x50, 0x4c, 0x45, 0x52,
        0x2d, 0x4d, 0x41, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // samplerName
        0x02, // samplerMode
        0x01, 0x00, // samplerRandomInterval
    ];
    let with_padding = [
        0, 9, 0, 2, 15, 94, 92, 107, 99, 213, 69, 133, 0, 9, 67, 42, 0, 0, 0, 6, 0, 1, 0, 32, 1, 2,
        0, 4, 0, 16, 0, 1, 0, 4, 0, 48, 0, 4, 0, 84, 0, 40, 0, 49, 0, 1, 0, 50, 0, 2, 0, 0, 1, 2,
        0, 58, 213, 3, 223, 35, 0, 0, 0, 2, 78, 69, 84, 70, 76, 79, 87, 45, 83, 65, 77, 80, 76, 69,
        82, 45, 77, 65, 80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 0,
        0, 0, 0,
    ];

    let decoder = FlowDecoder::default();
    let outcome = decoder.decode(&no_padding, exporter()).unwrap();
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.observation_domain_id(), 6);
    assert_eq!(
        record.get("scope_system").map(Value::data),
        Some(&ValueData::Unsigned32(0xd503_df23))
    );
    // samplerId is an unsigned8, the exporter sends it in 4 octets
    assert_eq!(
        record.get("samplerId").map(Value::data),
        Some(&ValueData::OctetArray(vec![0, 0, 0, 2]))
    );
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::FieldLength {
            field: "samplerId".to_string(),
            length: 4,
            min: 1,
            max: 1,
        }]
    );
    match record.get("samplerName").map(Value::data) {
        Some(ValueData::String(name)) => assert!(name.starts_with("NETFLOW-SAMPLER-MAP")),
        other => panic!("unexpected samplerName {other:?}"),
    }
    assert_eq!(
        record.get("samplerMode").map(Value::data),
        Some(&ValueData::Unsigned8(2))
    );
    assert_eq!(
        record.get("samplerRandomInterval").and_then(Value::as_u64),
        Some(256)
    );

    // Padding after the records doesn't change the outcome
    let padded = FlowDecoder::default()
        .decode(&with_padding, exporter())
        .unwrap();
    assert_eq!(padded, outcome);
}
