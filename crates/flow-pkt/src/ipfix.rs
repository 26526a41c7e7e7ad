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

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};

use crate::{
    flatten_data_records, record::DecodedRecord, record::FlowProtocol, template::DecodingTemplate,
    DataRecord, DataSetId, FieldSpecifier,
};

pub const IPFIX_VERSION: u16 = 10;

/// A value of 2 is reserved for Template Sets
pub const IPFIX_TEMPLATE_SET_ID: u16 = 2;

/// A value of 3 is reserved for Options Template Sets
pub const IPFIX_OPTIONS_TEMPLATE_SET_ID: u16 = 3;

/// Templates by id, used when writing Data Sets
pub type TemplatesMap = FxHashMap<u16, Arc<DecodingTemplate>>;

/// IP Flow Information Export (IPFIX) v10 Packet.
///
/// ```text
///  +--------+--------------------------------------------------------+
///  |        | +----------+ +---------+     +-----------+ +---------+ |
///  |Message | | Template | | Data    |     | Options   | | Data    | |
///  | Header | | Set      | | Set     | ... | Template  | | Set     | |
///  |        | |          | |         |     | Set       | |         | |
///  |        | +----------+ +---------+     +-----------+ +---------+ |
///  +--------+--------------------------------------------------------+
/// ```
/// ```text
/// 0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Version Number          |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Export Time                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Sequence Number                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Observation Domain ID                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpfixPacket {
    version: u16,
    export_time: DateTime<Utc>,
    sequence_number: u32,
    observation_domain_id: u32,
    sets: Vec<Set>,
}

impl IpfixPacket {
    pub const fn new(
        export_time: DateTime<Utc>,
        sequence_number: u32,
        observation_domain_id: u32,
        sets: Vec<Set>,
    ) -> Self {
        Self {
            version: IPFIX_VERSION,
            export_time,
            sequence_number,
            observation_domain_id,
            sets,
        }
    }

    /// IPFIX Protocol version
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Time at which the IPFIX Message Header leaves the Exporter.
    ///
    /// Note: The exporter is sending this value at a seconds granularity as
    /// UNIX epoch.
    pub const fn export_time(&self) -> DateTime<Utc> {
        self.export_time
    }

    /// Incremental sequence counter modulo 2^32 of all IPFIX Data Records sent
    /// in the current stream from the current Observation Domain by the
    /// Exporting Process.
    pub const fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// A 32-bit identifier of the Observation Domain that is locally unique to
    /// the Exporting Process.
    pub const fn observation_domain_id(&self) -> u32 {
        self.observation_domain_id
    }

    /// The Sets that could be decoded. Sets that failed are reported as
    /// diagnostics instead.
    pub const fn sets(&self) -> &Vec<Set> {
        &self.sets
    }

    pub fn flatten(self, exporter: SocketAddr) -> Vec<DecodedRecord> {
        let export_time = self.export_time;
        let sequence_number = self.sequence_number;
        let observation_domain_id = self.observation_domain_id;
        self.sets
            .into_iter()
            .flat_map(|set| match set {
                Set::Data { records, .. } => Some(flatten_data_records(
                    FlowProtocol::Ipfix,
                    exporter,
                    observation_domain_id,
                    sequence_number,
                    export_time,
                    records,
                )),
                Set::Template(_) | Set::OptionsTemplate(_) => None,
            })
            .flatten()
            .collect()
    }
}

/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Set ID               |          Length               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
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
            Self::Template(_) => IPFIX_TEMPLATE_SET_ID,
            Self::OptionsTemplate(_) => IPFIX_OPTIONS_TEMPLATE_SET_ID,
            Self::Data { id, .. } => id.id(),
        }
    }
}

/// A Template Record defines the structure and interpretation of fields in a
/// Data Record.
///
/// A record without any field withdraws the template, and withdrawing the
/// reserved id [`IPFIX_TEMPLATE_SET_ID`] withdraws all the templates of the
/// observation domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
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

    /// Each Template Record is given a unique Template ID in the range 256 to
    /// 65535.
    pub const fn id(&self) -> u16 {
        self.id
    }

    pub fn field_specifiers(&self) -> &[FieldSpecifier] {
        &self.field_specifiers
    }

    pub fn is_withdrawal(&self) -> bool {
        self.field_specifiers.is_empty()
    }
}

/// An Options Template Record defines the structure and interpretation of
/// fields in a Data Record, including defining how to scope the applicability
/// of the Data Record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct OptionsTemplateRecord {
    id: u16,
    scope_field_specifiers: Box<[FieldSpecifier]>,
    field_specifiers: Box<[FieldSpecifier]>,
}

impl OptionsTemplateRecord {
    pub const fn new(
        id: u16,
        scope_field_specifiers: Box<[FieldSpecifier]>,
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

    pub fn scope_field_specifiers(&self) -> &[FieldSpecifier] {
        &self.scope_field_specifiers
    }

    pub fn field_specifiers(&self) -> &[FieldSpecifier] {
        &self.field_specifiers
    }

    pub fn is_withdrawal(&self) -> bool {
        self.scope_field_specifiers.is_empty() && self.field_specifiers.is_empty()
    }
}

impl From<&TemplateRecord> for DecodingTemplate {
    fn from(record: &TemplateRecord) -> Self {
        DecodingTemplate::new(Box::new([]), record.field_specifiers.clone())
    }
}

impl From<&OptionsTemplateRecord> for DecodingTemplate {
    fn from(record: &OptionsTemplateRecord) -> Self {
        DecodingTemplate::new(
            record.scope_field_specifiers.clone(),
            record.field_specifiers.clone(),
        )
    }
}
