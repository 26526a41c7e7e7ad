use std::{
    io::Cursor,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use chrono::{TimeZone, Utc};

use telemetryd_flow_pkt::{
    decoder::FlowDecoder,
    ipfix::*,
    template::DecodingTemplate,
    value::{Value, ValueData},
    DataRecord, DataSetId, FieldSpecifier, FlowInfo,
};
use telemetryd_parse_utils::WritablePduWithOneInput;

fn main() {
    let decoder = FlowDecoder::default();
    let exporter: SocketAddr = "192.0.2.1:4739".parse().unwrap();

    let template = TemplateRecord::new(
        307,
        Box::new([
            FieldSpecifier::new(0, 8, 4),
            FieldSpecifier::new(0, 12, 4),
            FieldSpecifier::new(0, 1, 4),
            FieldSpecifier::new(0, 2, 4),
        ]),
    );
    // Templates used to write data sets with the exporter's field lengths
    let mut templates_map = TemplatesMap::default();
    templates_map.insert(307, Arc::new(DecodingTemplate::from(&template)));

    // IPFIX template packet
    let ipfix_template = IpfixPacket::new(
        Utc.with_ymd_and_hms(2023, 3, 4, 12, 0, 0).unwrap(),
        3812,
        0,
        vec![Set::Template(Box::new([template]))],
    );
    println!(
        "JSON representation of IPFIX Template packet: {}",
        serde_json::to_string(&ipfix_template).unwrap()
    );
    let mut buf: Vec<u8> = vec![];
    let mut cursor = Cursor::new(&mut buf);
    ipfix_template.write(&mut cursor, None).unwrap();
    assert_eq!(
        buf,
        vec![
            0, 10, 0, 40, 100, 3, 50, 192, 0, 0, 14, 228, 0, 0, 0, 0, 0, 2, 0, 24, 1, 51, 0, 4, 0,
            8, 0, 4, 0, 12, 0, 4, 0, 1, 0, 4, 0, 2, 0, 4,
        ]
    );
    // The decoder learns the template
    let (msg_back, diagnostics) = decoder.decode_packet(&buf, exporter).unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(FlowInfo::IPFIX(ipfix_template), msg_back);

    // IPFIX data packet
    let ipfix_data = IpfixPacket::new(
        Utc.with_ymd_and_hms(2023, 3, 4, 12, 0, 1).unwrap(),
        3812,
        0,
        vec![Set::Data {
            id: DataSetId::new(307).unwrap(),
            records: Box::new([DataRecord::new(
                Box::new([]),
                Box::new([
                    Value::new(
                        "sourceIPv4Address",
                        ValueData::Ipv4Address(Ipv4Addr::new(70, 1, 115, 1)),
                    ),
                    Value::new(
                        "destinationIPv4Address",
                        ValueData::Ipv4Address(Ipv4Addr::new(50, 0, 71, 1)),
                    ),
                    Value::new("octetDeltaCount", ValueData::Unsigned64(1312)),
                    Value::new("packetDeltaCount", ValueData::Unsigned64(9)),
                ]),
            )]),
        }],
    );

    let mut buf: Vec<u8> = vec![];
    let mut cursor = Cursor::new(&mut buf);
    ipfix_data.write(&mut cursor, Some(&templates_map)).unwrap();
    assert_eq!(
        buf,
        vec![
            0, 10, 0, 36, 100, 3, 50, 193, 0, 0, 14, 228, 0, 0, 0, 0, 1, 51, 0, 20, 70, 1, 115, 1,
            50, 0, 71, 1, 0, 0, 5, 32, 0, 0, 0, 9
        ]
    );
    // Decode it into flat records
    let outcome = decoder.decode(&buf, exporter).unwrap();
    assert!(outcome.diagnostics.is_empty());
    for record in &outcome.records {
        println!(
            "JSON representation of the decoded record: {}",
            serde_json::to_string(record).unwrap()
        );
    }
}
