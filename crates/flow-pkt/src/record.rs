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

use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use strum_macros::Display;

#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowProtocol {
    #[strum(to_string = "NetFlow v9")]
    NetFlowV9,
    #[strum(to_string = "IPFIX")]
    Ipfix,
    #[strum(to_string = "sFlow")]
    SFlow,
}

/// One flow (NetFlow v9 and IPFIX data record) or one sample (sFlow) with
/// the information of the message that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    protocol: FlowProtocol,
    exporter: SocketAddr,
    observation_domain_id: u32,
    sequence_number: Option<u32>,
    export_time: Option<DateTime<Utc>>,
    fields: Vec<Value>,
}

impl DecodedRecord {
    pub const fn new(
        protocol: FlowProtocol,
        exporter: SocketAddr,
        observation_domain_id: u32,
        sequence_number: Option<u32>,
        export_time: Option<DateTime<Utc>>,
        fields: Vec<Value>,
    ) -> Self {
        Self {
            protocol,
            exporter,
            observation_domain_id,
            sequence_number,
            export_time,
            fields,
        }
    }

    pub const fn protocol(&self) -> FlowProtocol {
        self.protocol
    }

    pub const fn exporter(&self) -> SocketAddr {
        self.exporter
    }

    /// IPFIX observation domain id, NetFlow v9 source id or sFlow sub-agent
    /// id
    pub const fn observation_domain_id(&self) -> u32 {
        self.observation_domain_id
    }

    pub const fn sequence_number(&self) -> Option<u32> {
        self.sequence_number
    }

    /// Not carried by sFlow datagrams
    pub const fn export_time(&self) -> Option<DateTime<Utc>> {
        self.export_time
    }

    /// First field with the given name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|value| value.name() == name)
    }

    /// All the fields, in wire order
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueData;
    use chrono::TimeZone;
    use std::net::IpAddr;

    #[test]
    fn test_protocol_display() {
        assert_eq!(FlowProtocol::NetFlowV9.to_string(), "NetFlow v9");
        assert_eq!(FlowProtocol::Ipfix.to_string(), "IPFIX");
        assert_eq!(FlowProtocol::SFlow.to_string(), "sFlow");
    }

    #[test]
    fn test_record_serde() {
        let record = DecodedRecord::new(
            FlowProtocol::Ipfix,
            SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 4739),
            3,
            Some(1),
            Some(Utc.with_ymd_and_hms(2024, 6, 20, 14, 0, 0).unwrap()),
            vec![
                Value::new("octetDeltaCount", ValueData::Unsigned64(u64::MAX)),
                Value::new("protocolIdentifier", ValueData::Unsigned8(6)),
            ],
        );
        assert_eq!(
            record.get("protocolIdentifier").and_then(Value::as_u64),
            Some(6)
        );
        assert!(record.get("missing").is_none());
        let json = serde_json::to_string(&record).unwrap();
        let parsed: DecodedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.into_fields().len(), 2);
    }
}
