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

use crate::{
    flatten_data_records,
    record::{DecodedRecord, FlowProtocol},
    template::DecodingTemplate,
    DataRecord, DataSetId, FieldSpecifier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, net::SocketAddr};

pub const NETFLOW_V9_VERSION: u16 = 9;

/// A value of 0 is reserved for Template Sets
pub const NETFLOW_TEMPLATE_SET_ID: u16 = 0;

/// A value of 1 is reserved for Options Template Sets
pub const NETFLOW_OPTIONS_TEMPLATE_SET_ID: u16 = 1;

/// ```text
/// +--------+--------------------------------------------------------+
/// |        | +----------+ +---------+     +-----------+ +---------+ |
/// | Packet | | Template | | Data    |     | Options   | | Data    | |
/// | Header | | FlowSet  | | FlowSet | ... | Template  | | FlowSet | |
/// |        | |          | |         |     | FlowSet   | |         | |
/// |        | +----------+ +---------+     +-----------+ +---------+ |
/// +--------+--------------------------------------------------------+
/// ```
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Version Number          |            Count              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           sysUpTime                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           UNIX Secs                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Sequence Number                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Source ID                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetFlowV9Packet {
    version: u16,
    sys_up_time: u32,
    unix_time: DateTime<Utc>,
    sequence_number: u32,
    source_id: u32,
    sets: Vec<Set>,
}

impl NetFlowV9Packet {
    pub const fn new(
        sys_up_time: u32,
        unix_time: DateTime<Utc>,
        sequence_number: u32,
        source_id: u32,
        sets: Vec<Set>,
    ) -> Self {
        Self {
            version: NETFLOW_V9_VERSION,
            sys_up_time,
            unix_time,
            sequence_number,
            source_id,
            sets,
        }
    }

    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Time in milliseconds since this device was first booted
    pub const fn sys_up_time(&self) -> u32 {
        self.sys_up_time
    }

    pub const fn unix_time(&self) -> DateTime<Utc> {
        self.unix_time
    }

    /// Incremental sequence counter of all export packets sent by this export
    /// device
    pub const fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Identifies the exporter observation domain, templates are scoped by
    /// it
    pub const fn source_id(&self) -> u32 {
        self.source_id
    }

    pub const fn sets(&self) -> &Vec<Set> {
        &self.sets
    }

    pub fn flatten(self, exporter: SocketAddr) -> Vec<DecodedRecord> {
        let unix_time = self.unix_time;
        let sequence_number = self.sequence_number;
        let source_id = self.source_id;
        self.sets
            .into_iter()
            .flat_map(|set| match set {
                Set::Data { records, .. } => Some(flatten_data_records(
                    FlowProtocol::NetFlowV9,
                    exporter,
                    source_id,
                    sequence_number,
                    unix_time,
                    records,
                )),
                Set::Template(_) | Set::OptionsTemplate(_) => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Set {
    Template(Box<[TemplateRecord]>),
    OptionsTemplate(Box<[OptionsTemplateRecord]>),
    Data {
        id: DataSetId,
        records: Box<[DataRecord]>,
    },
}

impl Set {
    pub const fn id(&self) -> u16 {
        match self {
            Self::Template(_) => NETFLOW_TEMPLATE_SET_ID,
            Self::OptionsTemplate(_) => NETFLOW_OPTIONS_TEMPLATE_SET_ID,
            Self::Data { id, .. } => id.id(),
        }
    }

    /// How many records of the packet header `count` this set accounts for
    pub fn record_count(&self) -> usize {
        match self {
            Self::Template(records) => records.len(),
            Self::OptionsTemplate(records) => records.len(),
            Self::Data { records, .. } => records.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    id: u16,
    field_specifiers: Box<[FieldSpecifier]>,
}

impl TemplateRecord {
    pub const fn new(id: u16, field_specifiers: Box<[FieldSpecifier]>) -> Self {
        Self {
            id,
            field_specifiers,
        }
    }

    pub const fn id(&self) -> u16 {
        self.id
    }

    pub fn field_specifiers(&self) -> &[FieldSpecifier] {
        &self.field_specifiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsTemplateRecord {
    id: u16,
    scope_field_specifiers: Box<[ScopeFieldSpecifier]>,
    field_specifiers: Box<[FieldSpecifier]>,
}

impl OptionsTemplateRecord {
    pub const fn new(
        id: u16,
        scope_field_specifiers: Box<[ScopeFieldSpecifier]>,
        field_specifiers: Box<[FieldSpecifier]>,
    ) -> Self {
        Self {
            id,
            scope_field_specifiers,
            field_specifiers,
        }
    }

    pub const fn id(&self) -> u16 {
        self.id
    }

    pub fn scope_field_specifiers(&self) -> &[ScopeFieldSpecifier] {
        &self.scope_field_specifiers
    }

    pub fn field_specifiers(&self) -> &[FieldSpecifier] {
        &self.field_specifiers
    }
}

impl From<&TemplateRecord> for DecodingTemplate {
    fn from(record: &TemplateRecord) -> Self {
        DecodingTemplate::new(Box::new([]), record.field_specifiers.clone())
    }
}

/// Scope fields are kept in the decoding template as field specifiers whose
/// element id is the scope type
impl From<&OptionsTemplateRecord> for DecodingTemplate {
    fn from(record: &OptionsTemplateRecord) -> Self {
        DecodingTemplate::new(
            record
                .scope_field_specifiers
                .iter()
                .map(|scope| {
                    let (pen, id) = scope.element_id.code();
                    FieldSpecifier::new(pen, id, scope.length)
                })
                .collect(),
            record.field_specifiers.clone(),
        )
    }
}

/// Scope field types of NetFlow v9 Options Templates (RFC 3954 section 6.1)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeIE {
    Unknown { pen: u32, id: u16 },
    System,
    Interface,
    LineCard,
    Cache,
    Template,
}

impl From<(u32, u16)> for ScopeIE {
    fn from(value: (u32, u16)) -> Self {
        let (pen, id) = value;
        match value {
            (0, 1) => ScopeIE::System,
            (0, 2) => ScopeIE::Interface,
            (0, 3) => ScopeIE::LineCard,
            (0, 4) => ScopeIE::Cache,
            (0, 5) => ScopeIE::Template,
            _ => ScopeIE::Unknown { pen, id },
        }
    }
}

impl ScopeIE {
    /// `(enterprise number, scope field type)`
    pub const fn code(&self) -> (u32, u16) {
        match self {
            Self::Unknown { pen, id } => (*pen, *id),
            Self::System => (0, 1),
            Self::Interface => (0, 2),
            Self::LineCard => (0, 3),
            Self::Cache => (0, 4),
            Self::Template => (0, 5),
        }
    }

    /// Name of the decoded scope value
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::System => Cow::Borrowed("scope_system"),
            Self::Interface => Cow::Borrowed("scope_interface"),
            Self::LineCard => Cow::Borrowed("scope_line_card"),
            Self::Cache => Cow::Borrowed("scope_cache"),
            Self::Template => Cow::Borrowed("scope_template"),
            Self::Unknown { pen: 0, id } => Cow::Owned(format!("scope_unknown_{id}")),
            Self::Unknown { pen, id } => Cow::Owned(format!("scope_unknown_{pen}_{id}")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeFieldSpecifier {
    element_id: ScopeIE,
    length: u16,
}

impl ScopeFieldSpecifier {
    pub const fn new(element_id: ScopeIE, length: u16) -> Self {
        Self { element_id, length }
    }

    pub const fn element_id(&self) -> ScopeIE {
        self.element_id
    }

    pub const fn length(&self) -> u16 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueData};
    use chrono::TimeZone;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_scope_ie() {
        assert_eq!(ScopeIE::from((0, 2)), ScopeIE::Interface);
        assert_eq!(ScopeIE::Interface.name(), "scope_interface");
        assert_eq!(
            ScopeIE::from((0, 9)),
            ScopeIE::Unknown { pen: 0, id: 9 }
        );
        assert_eq!(ScopeIE::from((0, 9)).name(), "scope_unknown_9");
        assert_eq!(ScopeIE::LineCard.code(), (0, 3));
    }

    #[test]
    fn test_options_template_to_decoding_template() {
        let record = OptionsTemplateRecord::new(
            260,
            Box::new([ScopeFieldSpecifier::new(ScopeIE::System, 4)]),
            Box::new([FieldSpecifier::new(0, 34, 4)]),
        );
        let template = DecodingTemplate::from(&record);
        assert_eq!(template.scope_fields(), &[FieldSpecifier::new(0, 1, 4)]);
        assert_eq!(template.min_record_length(), 8);
    }

    #[test]
    fn test_netflow_data_flatten() {
        let exporter = SocketAddr::new(IpAddr::from([192, 0, 2, 9]), 2055);
        let unix_time = Utc.with_ymd_and_hms(2024, 6, 20, 14, 0, 0).unwrap();
        let packet = NetFlowV9Packet::new(
            1000,
            unix_time,
            12,
            77,
            vec![Set::Data {
                id: DataSetId::new(400).unwrap(),
                records: Box::new([DataRecord::new(
                    Box::new([Value::new("scope_interface", ValueData::Unsigned32(100))]),
                    Box::new([Value::new(
                        "destinationIPv4Address",
                        ValueData::Ipv4Address(Ipv4Addr::new(10, 100, 0, 1)),
                    )]),
                )]),
            }],
        );
        let flattened = packet.flatten(exporter);
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].protocol(), FlowProtocol::NetFlowV9);
        assert_eq!(flattened[0].observation_domain_id(), 77);
        assert_eq!(flattened[0].export_time(), Some(unix_time));
        assert_eq!(
            flattened[0].get("scope_interface").and_then(Value::as_u64),
            Some(100)
        );
    }
}
