// Copyright (C) 2022-present The NetGauze Authors.
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
use rstest::rstest;
use std::{net::Ipv4Addr, sync::Arc};

use crate::{
    decoder::FlowDecoder,
    error::DecodeError,
    ipfix::*,
    record::FlowProtocol,
    template::{DecodingTemplate, TemplateKey},
    value::{Value, ValueData},
    wire::{serializer::ipfix::IpfixPacketWritingError, tests::exporter},
    DataRecord, DataSetId, FieldSpecifier, FlowInfo,
};
use telemetryd_parse_utils::WritablePduWithOneInput;

/// IPFIX message exported at 2024-06-20 14:00:00 UTC with sequence number 1
fn message(observation_domain_id: u32, sets: &[&[u8]]) -> Vec<u8> {
    let length = 16 + sets.iter().map(|set| set.len()).sum::<usize>();
    let mut buf = vec![0x00, 0x0a];
    buf.extend_from_slice(&(length as u16).to_be_bytes());
    buf.extend_from_slice(&[0x66, 0x74, 0x35, 0xe0, 0x00, 0x00, 0x00, 0x01]);
    buf.extend_from_slice(&observation_domain_id.to_be_bytes());
    for set in sets {
        buf.extend_from_slice(set);
    }
    buf
}

/// Template 256: sourceIPv4Address(4), octetDeltaCount(8)
const TEMPLATE_SET: &[u8] = &[
    0x00, 0x02, 0x00, 0x10, // template set, length 16
    0x01, 0x00, 0x00, 0x02, // template 256, 2 fields
    0x00, 0x08, 0x00, 0x04, // sourceIPv4Address
    0x00, 0x01, 0x00, 0x08, // octetDeltaCount
];

const DATA_SET: &[u8] = &[
    0x01, 0x00, 0x00, 0x10, // set 256, length 16
    10, 0, 0, 1, // sourceIPv4Address
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0xdc, // octetDeltaCount
];

#[test]
fn test_template_and_data_in_one_message() {
    let decoder = FlowDecoder::default();
    let buf = message(7, &[TEMPLATE_SET, DATA_SET]);
    let outcome = decoder.decode(&buf, exporter()).unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.protocol(), FlowProtocol::Ipfix);
    assert_eq!(record.exporter(), exporter());
    assert_eq!(record.observation_domain_id(), 7);
    assert_eq!(record.sequence_number(), Some(1));
    assert_eq!(
        record.export_time(),
        Some(Utc.with_ymd_and_hms(2024, 6, 20, 14, 0, 0).unwrap())
    );
    assert_eq!(
        record.get("sourceIPv4Address").map(Value::data),
        Some(&ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1)))
    );
    assert_eq!(
        record.get("octetDeltaCount").and_then(Value::as_u64),
        Some(1500)
    );
    assert!(decoder
        .ipfix_templates()
        .get(&TemplateKey::new(exporter(), 7, 256))
        .is_some());
    assert!(decoder.netflow_templates().is_empty());
}

#[test]
fn test_template_not_found_keeps_sibling_sets() {
    let decoder = FlowDecoder::default();
    let unknown_set: &[u8] = &[0x03, 0xe7, 0x00, 0x08, 0x01, 0x02, 0x03, 0x04];
    let buf = message(7, &[TEMPLATE_SET, unknown_set, DATA_SET]);
    let outcome = decoder.decode(&buf, exporter()).unwrap();
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TemplateNotFound {
            exporter: exporter(),
            observation_domain_id: 7,
            template_id: 999,
        }]
    );
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0]
            .get("octetDeltaCount")
            .and_then(Value::as_u64),
        Some(1500)
    );
}

#[test]
fn test_templates_are_scoped_by_observation_domain() {
    let decoder = FlowDecoder::default();
    decoder
        .decode(&message(7, &[TEMPLATE_SET]), exporter())
        .unwrap();
    let outcome = decoder.decode(&message(8, &[DATA_SET]), exporter()).unwrap();
    assert_eq!(outcome.records, vec![]);
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TemplateNotFound {
            exporter: exporter(),
            observation_domain_id: 8,
            template_id: 256,
        }]
    );
}

#[test]
fn test_template_replacement() {
    let decoder = FlowDecoder::default();
    decoder
        .decode(&message(7, &[TEMPLATE_SET, DATA_SET]), exporter())
        .unwrap();

    let new_template: &[u8] = &[
        0x00, 0x02, 0x00, 0x10, // template set, length 16
        0x01, 0x00, 0x00, 0x02, // template 256, 2 fields
        0x00, 0x0c, 0x00, 0x04, // destinationIPv4Address
        0x00, 0x07, 0x00, 0x02, // sourceTransportPort
    ];
    let outcome = decoder
        .decode(&message(7, &[new_template]), exporter())
        .unwrap();
    assert_eq!(outcome, Default::default());

    let data_set: &[u8] = &[
        0x01, 0x00, 0x00, 0x0a, // set 256, length 10
        192, 0, 2, 9, // destinationIPv4Address
        0x01, 0xbb, // sourceTransportPort
    ];
    let outcome = decoder
        .decode(&message(7, &[data_set]), exporter())
        .unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].fields(),
        &[
            Value::new(
                "destinationIPv4Address",
                ValueData::Ipv4Address(Ipv4Addr::new(192, 0, 2, 9))
            ),
            Value::new("sourceTransportPort", ValueData::Unsigned16(443)),
        ]
    );
}

#[test]
fn test_template_withdrawal() {
    let decoder = FlowDecoder::default();
    decoder
        .decode(&message(7, &[TEMPLATE_SET]), exporter())
        .unwrap();
    let withdrawal: &[u8] = &[0x00, 0x02, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00];
    let outcome = decoder
        .decode(&message(7, &[withdrawal, DATA_SET]), exporter())
        .unwrap();
    assert_eq!(outcome.records, vec![]);
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TemplateNotFound {
            exporter: exporter(),
            observation_domain_id: 7,
            template_id: 256,
        }]
    );
    assert!(decoder.ipfix_templates().is_empty());
}

/// Options template 258: scope observationDomainId(4), exportedMessageTotalCount(8)
const OPTIONS_TEMPLATE_SET: &[u8] = &[
    0x00, 0x03, 0x00, 0x12, // options template set, length 18
    0x01, 0x02, 0x00, 0x02, 0x00, 0x01, // template 258, 2 fields, 1 scope field
    0x00, 0x95, 0x00, 0x04, // observationDomainId
    0x00, 0x29, 0x00, 0x08, // exportedMessageTotalCount
];

#[test]
fn test_withdraw_all_options_templates_keeps_templates() {
    let decoder = FlowDecoder::default();
    decoder
        .decode(&message(7, &[TEMPLATE_SET, OPTIONS_TEMPLATE_SET]), exporter())
        .unwrap();
    assert_eq!(
        decoder.ipfix_templates().template_ids(exporter()),
        vec![(7, 256), (7, 258)]
    );

    let withdraw_all_options: &[u8] = &[0x00, 0x03, 0x00, 0x08, 0x00, 0x03, 0x00, 0x00];
    let outcome = decoder
        .decode(&message(7, &[withdraw_all_options, DATA_SET]), exporter())
        .unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(
        outcome.records[0]
            .get("octetDeltaCount")
            .and_then(Value::as_u64),
        Some(1500)
    );
    assert_eq!(
        decoder.ipfix_templates().template_ids(exporter()),
        vec![(7, 256)]
    );
}

#[test]
fn test_withdraw_all_templates_keeps_options_templates() {
    let decoder = FlowDecoder::default();
    decoder
        .decode(&message(7, &[TEMPLATE_SET, OPTIONS_TEMPLATE_SET]), exporter())
        .unwrap();
    let withdraw_all: &[u8] = &[0x00, 0x02, 0x00, 0x08, 0x00, 0x02, 0x00, 0x00];
    let outcome = decoder
        .decode(&message(7, &[withdraw_all]), exporter())
        .unwrap();
    assert_eq!(outcome, Default::default());
    assert_eq!(
        decoder.ipfix_templates().template_ids(exporter()),
        vec![(7, 258)]
    );
}

#[rstest]
fn test_reduced_size_unsigned64_is_never_negative(
    #[values(1, 2, 3, 4, 5, 6, 7, 8)] length: u16,
) {
    let decoder = FlowDecoder::default();
    let template_set: &[u8] = &[
        0x00, 0x02, 0x00, 0x0c, // template set, length 12
        0x01, 0x00, 0x00, 0x01, // template 256, 1 field
        0x00, 0x01, 0x00, length as u8, // octetDeltaCount, reduced size
    ];
    let mut data_set = vec![0x01, 0x00];
    data_set.extend_from_slice(&(4 + length).to_be_bytes());
    data_set.push(0x80);
    data_set.extend(std::iter::repeat(0xff).take(length as usize - 1));
    let outcome = decoder
        .decode(&message(7, &[template_set, &data_set]), exporter())
        .unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(outcome.records.len(), 1);

    let bits = 8 * u32::from(length);
    let expected = (1u64 << (bits - 1)) | ((1u64 << (bits - 8)) - 1);
    let value = outcome.records[0].get("octetDeltaCount").unwrap();
    assert_eq!(value.data(), &ValueData::Unsigned64(expected));
    assert_eq!(value.to_string(), expected.to_string());
}

#[test]
fn test_truncated_field_skips_only_its_set() {
    let decoder = FlowDecoder::default();
    let templates: &[u8] = &[
        0x00, 0x02, 0x00, 0x18, // template set, length 24
        0x01, 0x00, 0x00, 0x01, // template 256, 1 field
        0x00, 0x08, 0x00, 0x04, // sourceIPv4Address
        0x01, 0x01, 0x00, 0x02, // template 257, 2 fields
        0x00, 0x52, 0xff, 0xff, // interfaceName, variable length
        0x00, 0x08, 0x00, 0x04, // sourceIPv4Address
    ];
    let truncated: &[u8] = &[
        0x01, 0x01, 0x00, 0x09, // set 257, length 9
        0x05, b'e', b't', b'h', b'0', // announces 5 octets, carries 4
    ];
    let sibling: &[u8] = &[0x01, 0x00, 0x00, 0x08, 10, 0, 0, 1];
    let outcome = decoder
        .decode(&message(7, &[templates, truncated, sibling]), exporter())
        .unwrap();
    assert!(matches!(
        outcome.diagnostics.as_slice(),
        [DecodeError::TruncatedPacket {
            protocol: FlowProtocol::Ipfix,
            ..
        }]
    ));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].fields(),
        &[Value::new(
            "sourceIPv4Address",
            ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1))
        )]
    );
}

#[test]
fn test_dropped_set_reports_only_its_truncation() {
    let decoder = FlowDecoder::default();
    let template_set: &[u8] = &[
        0x00, 0x02, 0x00, 0x10, // template set, length 16
        0x01, 0x01, 0x00, 0x02, // template 257, 2 fields
        0x00, 0x07, 0x00, 0x04, // sourceTransportPort, longer than its 2 octets
        0x00, 0x52, 0xff, 0xff, // interfaceName, variable length
    ];
    let complete_record: &[u8] = &[0x00, 0x00, 0x01, 0xbb, 0x00];
    let mut complete = vec![0x01, 0x01, 0x00, 0x09];
    complete.extend_from_slice(complete_record);
    let outcome = decoder
        .decode(&message(7, &[template_set, &complete]), exporter())
        .unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert!(matches!(
        outcome.diagnostics.as_slice(),
        [DecodeError::FieldLength { length: 4, .. }]
    ));

    let mut truncated = vec![0x01, 0x01, 0x00, 0x11];
    truncated.extend_from_slice(complete_record);
    // announces 5 octets, carries 3
    truncated.extend_from_slice(&[0x00, 0x00, 0x01, 0xbb, 0x05, b'e', b't', b'h']);
    let outcome = decoder
        .decode(&message(7, &[&truncated]), exporter())
        .unwrap();
    assert_eq!(outcome.records, vec![]);
    assert!(matches!(
        outcome.diagnostics.as_slice(),
        [DecodeError::TruncatedPacket {
            protocol: FlowProtocol::Ipfix,
            ..
        }]
    ));
}

#[test]
fn test_set_longer_than_message() {
    let decoder = FlowDecoder::default();
    let mut buf = message(7, &[TEMPLATE_SET, DATA_SET]);
    // Set 256 claims 17 octets while 16 are left
    buf[35] = 0x11;
    let outcome = decoder.decode(&buf, exporter()).unwrap();
    assert_eq!(outcome.records, vec![]);
    assert_eq!(
        outcome.diagnostics,
        vec![DecodeError::TruncatedPacket {
            protocol: FlowProtocol::Ipfix,
            offset: 32,
            context: "set 256".to_string(),
        }]
    );
}

#[test]
fn test_message_longer_than_datagram() {
    let decoder = FlowDecoder::default();
    let mut buf = message(7, &[TEMPLATE_SET, DATA_SET]);
    buf.pop();
    assert!(matches!(
        decoder.decode(&buf, exporter()),
        Err(DecodeError::TruncatedPacket {
            protocol: FlowProtocol::Ipfix,
            ..
        })
    ));
}

#[test]
fn test_unknown_element_is_kept_raw() {
    let decoder = FlowDecoder::default();
    let template: &[u8] = &[
        0x00, 0x02, 0x00, 0x14, // template set, length 20
        0x01, 0x02, 0x00, 0x02, // template 258, 2 fields
        0x80, 0x01, 0x00, 0x02, 0x00, 0x00, 0x72, 0x79, // enterprise 29305, element 1
        0x00, 0x08, 0x00, 0x04, // sourceIPv4Address
    ];
    let data: &[u8] = &[0x01, 0x02, 0x00, 0x0a, 0xbe, 0xef, 10, 0, 0, 1];
    let outcome = decoder
        .decode(&message(7, &[template, data]), exporter())
        .unwrap();
    assert_eq!(outcome.diagnostics, vec![]);
    assert_eq!(
        outcome.records[0].fields(),
        &[
            Value::new("unknown_29305_1", ValueData::OctetArray(vec![0xbe, 0xef])),
            Value::new(
                "sourceIPv4Address",
                ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1))
            ),
        ]
    );
}

#[test]
fn test_round_trip() -> Result<(), IpfixPacketWritingError> {
    let template = TemplateRecord::new(
        256,
        Box::new([
            FieldSpecifier::new(0, 8, 4),
            FieldSpecifier::new(0, 12, 4),
            FieldSpecifier::new(0, 1, 8),
            FieldSpecifier::new(0, 82, FieldSpecifier::VARIABLE_LENGTH),
        ]),
    );
    let mut templates = TemplatesMap::default();
    templates.insert(256, Arc::new(DecodingTemplate::from(&template)));
    let packet = IpfixPacket::new(
        Utc.with_ymd_and_hms(2024, 6, 20, 14, 0, 0).unwrap(),
        42,
        7,
        vec![
            Set::Template(Box::new([template])),
            Set::Data {
                id: DataSetId::new(256).unwrap(),
                records: Box::new([DataRecord::new(
                    Box::new([]),
                    Box::new([
                        Value::new(
                            "sourceIPv4Address",
                            ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1)),
                        ),
                        Value::new(
                            "destinationIPv4Address",
                            ValueData::Ipv4Address(Ipv4Addr::new(192, 0, 2, 9)),
                        ),
                        Value::new("octetDeltaCount", ValueData::Unsigned64(u64::MAX)),
                        Value::new("interfaceName", ValueData::String("eth0".to_string())),
                    ]),
                )]),
            },
        ],
    );
    let mut buf = Vec::new();
    packet.write(&mut buf, Some(&templates))?;
    assert_eq!(buf.len(), packet.len(Some(&templates)));

    let decoder = FlowDecoder::default();
    let (info, diagnostics) = decoder.decode_packet(&buf, exporter()).unwrap();
    assert_eq!(diagnostics, vec![]);
    assert_eq!(info, FlowInfo::IPFIX(packet));
    Ok(())
}
