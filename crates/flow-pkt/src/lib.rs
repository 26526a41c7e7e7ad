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

//! Decoding of NetFlow v9, IPFIX and sFlow v5 datagrams into typed flow
//! records.
//!
//! [`decoder::FlowDecoder`] is the entry point: it recognizes the protocol of
//! a datagram, decodes it with the templates previously learned from the same
//! exporter and returns [`record::DecodedRecord`]s along with the
//! [`error::DecodeError`] diagnostics of the parts that had to be skipped.

pub mod decoder;
pub mod error;
mod iana;
pub mod ipfix;
pub mod netflow;
pub mod record;
pub mod registry;
pub mod scope;
pub mod sflow;
pub mod template;
pub mod value;
pub mod wire;

use crate::{
    record::{DecodedRecord, FlowProtocol},
    value::Value,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, ops::Deref};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowInfo {
    NetFlowV9(netflow::NetFlowV9Packet),
    IPFIX(ipfix::IpfixPacket),
    SFlow(sflow::SFlowDatagram),
}

impl FlowInfo {
    pub const fn protocol(&self) -> FlowProtocol {
        match self {
            Self::NetFlowV9(_) => FlowProtocol::NetFlowV9,
            Self::IPFIX(_) => FlowProtocol::Ipfix,
            Self::SFlow(_) => FlowProtocol::SFlow,
        }
    }

    /// One [`DecodedRecord`] per data record (NetFlow v9, IPFIX) or per
    /// sample (sFlow). Template sets don't produce records.
    pub fn flatten(self, exporter: SocketAddr) -> Vec<DecodedRecord> {
        match self {
            Self::NetFlowV9(pkt) => pkt.flatten(exporter),
            Self::IPFIX(pkt) => pkt.flatten(exporter),
            Self::SFlow(datagram) => datagram.flatten(exporter),
        }
    }
}

/// Field Specifier
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |E|  Information Element ident. |        Field Length           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Enterprise Number                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct FieldSpecifier {
    enterprise_number: u32,
    element_id: u16,
    length: u16,
}

impl FieldSpecifier {
    /// Length value announcing a variable length field
    pub const VARIABLE_LENGTH: u16 = 65535;

    /// `element_id` is kept without the enterprise bit, a non-zero
    /// `enterprise_number` sets it on the wire.
    pub const fn new(enterprise_number: u32, element_id: u16, length: u16) -> Self {
        Self {
            enterprise_number,
            element_id: element_id & 0x7fff,
            length,
        }
    }

    pub const fn enterprise_number(&self) -> u32 {
        self.enterprise_number
    }

    pub const fn element_id(&self) -> u16 {
        self.element_id
    }

    pub const fn length(&self) -> u16 {
        self.length
    }

    pub const fn is_enterprise(&self) -> bool {
        self.enterprise_number != 0
    }

    pub const fn is_variable_length(&self) -> bool {
        self.length == Self::VARIABLE_LENGTH
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DataSetIdError {
    InvalidId(u16),
}

impl std::fmt::Display for DataSetIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => {
                write!(f, "Invalid data set id specified {id}")
            }
        }
    }
}

impl std::error::Error for DataSetIdError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSetId(u16);

/// Values 256 and above are used for Data Sets
pub const DATA_SET_MIN_ID: u16 = 256;

impl DataSetId {
    pub const fn new(id: u16) -> Result<Self, DataSetIdError> {
        if id < DATA_SET_MIN_ID {
            Err(DataSetIdError::InvalidId(id))
        } else {
            Ok(Self(id))
        }
    }

    #[inline]
    pub const fn id(&self) -> u16 {
        self.0
    }
}

impl Deref for DataSetId {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A record of a Data Set, decoded with the template of the set.
///
/// Scope fields are only present when the template was an options template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    scope_fields: Box<[Value]>,
    fields: Box<[Value]>,
}

impl DataRecord {
    pub fn new(scope_fields: Box<[Value]>, fields: Box<[Value]>) -> Self {
        Self {
            scope_fields,
            fields,
        }
    }

    pub fn scope_fields(&self) -> &[Value] {
        &self.scope_fields
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Scope fields followed by the other fields
    pub fn into_values(self) -> Vec<Value> {
        let mut values = self.scope_fields.into_vec();
        values.extend(self.fields.into_vec());
        values
    }
}

/// Turn the data records of a set into [`DecodedRecord`]s sharing the message
/// header information.
pub(crate) fn flatten_data_records(
    protocol: FlowProtocol,
    exporter: SocketAddr,
    observation_domain_id: u32,
    sequence_number: u32,
    export_time: DateTime<Utc>,
    records: Box<[DataRecord]>,
) -> impl Iterator<Item = DecodedRecord> {
    records.into_vec().into_iter().map(move |record| {
        DecodedRecord::new(
            protocol,
            exporter,
            observation_domain_id,
            Some(sequence_number),
            Some(export_time),
            record.into_values(),
        )
    })
}
