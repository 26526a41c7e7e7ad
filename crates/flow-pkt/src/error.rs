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

use crate::record::FlowProtocol;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Errors reported while decoding a datagram.
///
/// [`DecodeError::UnsupportedProtocol`] and malformed message headers fail the
/// whole datagram. The other errors are diagnostics about the Set or Sample
/// that was skipped, decoding goes on with the next one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("unsupported flow protocol, version field is {0}")]
    UnsupportedProtocol(u32),

    #[error("{protocol} packet truncated at offset {offset} while reading {context}")]
    TruncatedPacket {
        protocol: FlowProtocol,
        offset: usize,
        context: String,
    },

    #[error(
        "no template {template_id} for exporter {exporter} in observation domain {observation_domain_id}"
    )]
    TemplateNotFound {
        exporter: SocketAddr,
        observation_domain_id: u32,
        template_id: u16,
    },

    #[error("field {field} has length {length}, expected between {min} and {max} octets")]
    FieldLength {
        field: String,
        length: usize,
        min: u16,
        max: u16,
    },

    #[error("invalid {protocol} {structure} at offset {offset}: {reason}")]
    InvalidPacket {
        protocol: FlowProtocol,
        structure: String,
        offset: usize,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn test_display() {
        assert_eq!(
            DecodeError::UnsupportedProtocol(7).to_string(),
            "unsupported flow protocol, version field is 7"
        );
        assert_eq!(
            DecodeError::TruncatedPacket {
                protocol: FlowProtocol::Ipfix,
                offset: 16,
                context: "set header".to_string(),
            }
            .to_string(),
            "IPFIX packet truncated at offset 16 while reading set header"
        );
        assert_eq!(
            DecodeError::TemplateNotFound {
                exporter: SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 2055),
                observation_domain_id: 0,
                template_id: 256,
            }
            .to_string(),
            "no template 256 for exporter 192.0.2.1:2055 in observation domain 0"
        );
    }
}
