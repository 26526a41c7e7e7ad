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

//! sFlow version 5 datagrams (<https://sflow.org/sflow_version_5.txt>).
//!
//! All the structures are XDR encoded: 32-bit big endian words, opaque data
//! and strings padded to a multiple of 4 octets and count prefixed arrays.

use crate::{
    record::{DecodedRecord, FlowProtocol},
    value::{MacAddress, Value, ValueData},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub const SFLOW_VERSION: u32 = 5;

pub const FLOW_SAMPLE_FORMAT: u32 = 1;
pub const COUNTER_SAMPLE_FORMAT: u32 = 2;
pub const EXPANDED_FLOW_SAMPLE_FORMAT: u32 = 3;
pub const EXPANDED_COUNTER_SAMPLE_FORMAT: u32 = 4;

/// ```text
/// struct sample_datagram_v5 {
///    address agent_address;
///    unsigned int sub_agent_id;
///    unsigned int sequence_number;
///    unsigned int uptime;
///    sample_record samples<>;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SFlowDatagram {
    agent_address: IpAddr,
    sub_agent_id: u32,
    sequence_number: u32,
    uptime: u32,
    samples: Vec<Sample>,
}

impl SFlowDatagram {
    pub const fn new(
        agent_address: IpAddr,
        sub_agent_id: u32,
        sequence_number: u32,
        uptime: u32,
        samples: Vec<Sample>,
    ) -> Self {
        Self {
            agent_address,
            sub_agent_id,
            sequence_number,
            uptime,
            samples,
        }
    }

    pub const fn version(&self) -> u32 {
        SFLOW_VERSION
    }

    pub const fn agent_address(&self) -> IpAddr {
        self.agent_address
    }

    pub const fn sub_agent_id(&self) -> u32 {
        self.sub_agent_id
    }

    pub const fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Milliseconds since the agent booted
    pub const fn uptime(&self) -> u32 {
        self.uptime
    }

    pub const fn samples(&self) -> &Vec<Sample> {
        &self.samples
    }

    /// One record per flow or counter sample. Unknown samples are skipped.
    pub fn flatten(self, exporter: SocketAddr) -> Vec<DecodedRecord> {
        let agent_address = Value::new("agent_address", ip_value(self.agent_address));
        let uptime = Value::new("uptime", ValueData::Unsigned32(self.uptime));
        let sub_agent_id = self.sub_agent_id;
        let sequence_number = self.sequence_number;
        self.samples
            .into_iter()
            .filter_map(|sample| {
                let mut fields = vec![agent_address.clone(), uptime.clone()];
                match sample {
                    Sample::Flow(sample) | Sample::ExpandedFlow(sample) => {
                        sample.flatten_into(&mut fields)
                    }
                    Sample::Counter(sample) | Sample::ExpandedCounter(sample) => {
                        sample.flatten_into(&mut fields)
                    }
                    Sample::Unknown { .. } => return None,
                }
                Some(DecodedRecord::new(
                    FlowProtocol::SFlow,
                    exporter,
                    sub_agent_id,
                    Some(sequence_number),
                    None,
                    fields,
                ))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sample {
    Flow(FlowSample),
    Counter(CounterSample),
    ExpandedFlow(FlowSample),
    ExpandedCounter(CounterSample),
    /// A sample format this decoder doesn't know, skipped by its length
    Unknown {
        enterprise: u32,
        format: u32,
        data: Vec<u8>,
    },
}

/// Interface number with its format: 0 for a single `ifIndex`, 1 for a
/// discarded packet (value is the reason), 2 for multiple interfaces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interface {
    pub format: u32,
    pub value: u32,
}

impl Interface {
    pub const fn new(format: u32, value: u32) -> Self {
        Self { format, value }
    }

    /// Compact encoding: the top 2 bits are the format
    pub const fn from_compact(raw: u32) -> Self {
        Self {
            format: raw >> 30,
            value: raw & 0x3fff_ffff,
        }
    }
}

/// Flow sample, in its compact or expanded encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSample {
    pub sequence_number: u32,
    pub source_id_type: u32,
    pub source_id_index: u32,
    pub sampling_rate: u32,
    pub sample_pool: u32,
    pub drops: u32,
    pub input: Interface,
    pub output: Interface,
    pub records: Vec<FlowRecord>,
}

impl FlowSample {
    fn flatten_into(self, fields: &mut Vec<Value>) {
        let mut builder = ValuesBuilder::new("flow_sample", fields);
        builder
            .u32("sequence_number", self.sequence_number)
            .u32("source_id_type", self.source_id_type)
            .u32("source_id_index", self.source_id_index)
            .u32("sampling_rate", self.sampling_rate)
            .u32("sample_pool", self.sample_pool)
            .u32("drops", self.drops)
            .u32("input_format", self.input.format)
            .u32("input", self.input.value)
            .u32("output_format", self.output.format)
            .u32("output", self.output.value);
        for record in self.records {
            record.flatten_into(fields);
        }
    }
}

/// Counter sample, in its compact or expanded encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSample {
    pub sequence_number: u32,
    pub source_id_type: u32,
    pub source_id_index: u32,
    pub records: Vec<CounterRecord>,
}

impl CounterSample {
    fn flatten_into(self, fields: &mut Vec<Value>) {
        ValuesBuilder::new("counter_sample", fields)
            .u32("sequence_number", self.sequence_number)
            .u32("source_id_type", self.source_id_type)
            .u32("source_id_index", self.source_id_index);
        for record in self.records {
            record.flatten_into(fields);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowRecord {
    SampledHeader(SampledHeader),
    SampledEthernet(SampledEthernet),
    SampledIpv4(SampledIpv4),
    SampledIpv6(SampledIpv6),
    ExtendedSwitch(ExtendedSwitch),
    ExtendedRouter(ExtendedRouter),
    ExtendedGateway(ExtendedGateway),
    ExtendedUser(ExtendedUser),
    ExtendedUrl(ExtendedUrl),
    ExtendedMpls(ExtendedMpls),
    ExtendedNat(ExtendedNat),
    ExtendedMplsTunnel(ExtendedMplsTunnel),
    ExtendedMplsVc(ExtendedMplsVc),
    ExtendedMplsFtn(ExtendedMplsFtn),
    ExtendedMplsLdpFec(ExtendedMplsLdpFec),
    ExtendedVlanTunnel(ExtendedVlanTunnel),
    ExtendedSocketIpv4(ExtendedSocketIpv4),
    ExtendedSocketIpv6(ExtendedSocketIpv6),
    Unknown {
        enterprise: u32,
        format: u32,
        data: Vec<u8>,
    },
}

impl FlowRecord {
    /// `(enterprise, format)` of the record
    pub const fn data_format(&self) -> (u32, u32) {
        match self {
            Self::SampledHeader(_) => (0, 1),
            Self::SampledEthernet(_) => (0, 2),
            Self::SampledIpv4(_) => (0, 3),
            Self::SampledIpv6(_) => (0, 4),
            Self::ExtendedSwitch(_) => (0, 1001),
            Self::ExtendedRouter(_) => (0, 1002),
            Self::ExtendedGateway(_) => (0, 1003),
            Self::ExtendedUser(_) => (0, 1004),
            Self::ExtendedUrl(_) => (0, 1005),
            Self::ExtendedMpls(_) => (0, 1006),
            Self::ExtendedNat(_) => (0, 1007),
            Self::ExtendedMplsTunnel(_) => (0, 1008),
            Self::ExtendedMplsVc(_) => (0, 1009),
            Self::ExtendedMplsFtn(_) => (0, 1010),
            Self::ExtendedMplsLdpFec(_) => (0, 1011),
            Self::ExtendedVlanTunnel(_) => (0, 1012),
            Self::ExtendedSocketIpv4(_) => (0, 2100),
            Self::ExtendedSocketIpv6(_) => (0, 2101),
            Self::Unknown {
                enterprise, format, ..
            } => (*enterprise, *format),
        }
    }

    fn flatten_into(self, fields: &mut Vec<Value>) {
        match self {
            Self::SampledHeader(r) => {
                ValuesBuilder::new("sampled_header", fields)
                    .u32("protocol", r.protocol)
                    .u32("frame_length", r.frame_length)
                    .u32("stripped", r.stripped)
                    .octets("header", r.header);
            }
            Self::SampledEthernet(r) => {
                ValuesBuilder::new("sampled_ethernet", fields)
                    .u32("length", r.length)
                    .mac("src_mac", r.src_mac)
                    .mac("dst_mac", r.dst_mac)
                    .u32("eth_type", r.eth_type);
            }
            Self::SampledIpv4(r) => {
                ValuesBuilder::new("sampled_ipv4", fields)
                    .u32("length", r.length)
                    .u32("protocol", r.protocol)
                    .ip("src_ip", IpAddr::V4(r.src_ip))
                    .ip("dst_ip", IpAddr::V4(r.dst_ip))
                    .u32("src_port", r.src_port)
                    .u32("dst_port", r.dst_port)
                    .u32("tcp_flags", r.tcp_flags)
                    .u32("tos", r.tos);
            }
            Self::SampledIpv6(r) => {
                ValuesBuilder::new("sampled_ipv6", fields)
                    .u32("length", r.length)
                    .u32("protocol", r.protocol)
                    .ip("src_ip", IpAddr::V6(r.src_ip))
                    .ip("dst_ip", IpAddr::V6(r.dst_ip))
                    .u32("src_port", r.src_port)
                    .u32("dst_port", r.dst_port)
                    .u32("tcp_flags", r.tcp_flags)
                    .u32("priority", r.priority);
            }
            Self::ExtendedSwitch(r) => {
                ValuesBuilder::new("extended_switch", fields)
                    .u32("src_vlan", r.src_vlan)
                    .u32("src_priority", r.src_priority)
                    .u32("dst_vlan", r.dst_vlan)
                    .u32("dst_priority", r.dst_priority);
            }
            Self::ExtendedRouter(r) => {
                ValuesBuilder::new("extended_router", fields)
                    .ip("next_hop", r.next_hop)
                    .u32("src_mask_len", r.src_mask_len)
                    .u32("dst_mask_len", r.dst_mask_len);
            }
            Self::ExtendedGateway(r) => {
                let as_path = r
                    .dst_as_path
                    .iter()
                    .flat_map(|segment| segment.asns.iter().copied())
                    .collect::<Vec<_>>();
                ValuesBuilder::new("extended_gateway", fields)
                    .ip("next_hop", r.next_hop)
                    .u32("as", r.as_number)
                    .u32("src_as", r.src_as)
                    .u32("src_peer_as", r.src_peer_as)
                    .u32_list("dst_as_path", &as_path)
                    .u32_list("communities", &r.communities)
                    .u32("local_pref", r.local_pref);
            }
            Self::ExtendedUser(r) => {
                ValuesBuilder::new("extended_user", fields)
                    .u32("src_charset", r.src_charset)
                    .string("src_user", r.src_user)
                    .u32("dst_charset", r.dst_charset)
                    .string("dst_user", r.dst_user);
            }
            Self::ExtendedUrl(r) => {
                ValuesBuilder::new("extended_url", fields)
                    .u32("direction", r.direction)
                    .string("url", r.url)
                    .string("host", r.host);
            }
            Self::ExtendedMpls(r) => {
                ValuesBuilder::new("extended_mpls", fields)
                    .ip("next_hop", r.next_hop)
                    .u32_list("in_stack", &r.in_stack)
                    .u32_list("out_stack", &r.out_stack);
            }
            Self::ExtendedNat(r) => {
                ValuesBuilder::new("extended_nat", fields)
                    .ip("src_address", r.src_address)
                    .ip("dst_address", r.dst_address);
            }
            Self::ExtendedMplsTunnel(r) => {
                ValuesBuilder::new("extended_mpls_tunnel", fields)
                    .string("tunnel_lsp_name", r.tunnel_lsp_name)
                    .u32("tunnel_id", r.tunnel_id)
                    .u32("tunnel_cos", r.tunnel_cos);
            }
            Self::ExtendedMplsVc(r) => {
                ValuesBuilder::new("extended_mpls_vc", fields)
                    .string("vc_instance_name", r.vc_instance_name)
                    .u32("vll_vc_id", r.vll_vc_id)
                    .u32("vc_label_cos", r.vc_label_cos);
            }
            Self::ExtendedMplsFtn(r) => {
                ValuesBuilder::new("extended_mpls_ftn", fields)
                    .string("mpls_ftn_descr", r.mpls_ftn_descr)
                    .u32("mpls_ftn_mask", r.mpls_ftn_mask);
            }
            Self::ExtendedMplsLdpFec(r) => {
                ValuesBuilder::new("extended_mpls_ldp_fec", fields).u32(
                    "mpls_fec_addr_prefix_length",
                    r.mpls_fec_addr_prefix_length,
                );
            }
            Self::ExtendedVlanTunnel(r) => {
                ValuesBuilder::new("extended_vlan_tunnel", fields).u32_list("stack", &r.stack);
            }
            Self::ExtendedSocketIpv4(r) => {
                ValuesBuilder::new("extended_socket_ipv4", fields)
                    .u32("protocol", r.protocol)
                    .ip("local_ip", IpAddr::V4(r.local_ip))
                    .ip("remote_ip", IpAddr::V4(r.remote_ip))
                    .u32("local_port", r.local_port)
                    .u32("remote_port", r.remote_port);
            }
            Self::ExtendedSocketIpv6(r) => {
                ValuesBuilder::new("extended_socket_ipv6", fields)
                    .u32("protocol", r.protocol)
                    .ip("local_ip", IpAddr::V6(r.local_ip))
                    .ip("remote_ip", IpAddr::V6(r.remote_ip))
                    .u32("local_port", r.local_port)
                    .u32("remote_port", r.remote_port);
            }
            Self::Unknown {
                enterprise,
                format,
                data,
            } => {
                fields.push(Value::new(
                    format!("flow_record_{enterprise}_{format}"),
                    ValueData::OctetArray(data),
                ));
            }
        }
    }
}

/// Sampled header (format 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledHeader {
    pub protocol: u32,
    pub frame_length: u32,
    pub stripped: u32,
    pub header: Vec<u8>,
}

/// Sampled Ethernet frame (format 2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledEthernet {
    pub length: u32,
    pub src_mac: MacAddress,
    pub dst_mac: MacAddress,
    pub eth_type: u32,
}

/// Sampled IPv4 packet (format 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledIpv4 {
    pub length: u32,
    pub protocol: u32,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u32,
    pub dst_port: u32,
    pub tcp_flags: u32,
    pub tos: u32,
}

/// Sampled IPv6 packet (format 4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledIpv6 {
    pub length: u32,
    pub protocol: u32,
    pub src_ip: Ipv6Addr,
    pub dst_ip: Ipv6Addr,
    pub src_port: u32,
    pub dst_port: u32,
    pub tcp_flags: u32,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedSwitch {
    pub src_vlan: u32,
    pub src_priority: u32,
    pub dst_vlan: u32,
    pub dst_priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedRouter {
    pub next_hop: IpAddr,
    pub src_mask_len: u32,
    pub dst_mask_len: u32,
}

/// AS path segment, `segment_type` is 1 for `AS_SET` and 2 for
/// `AS_SEQUENCE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsPathSegment {
    pub segment_type: u32,
    pub asns: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGateway {
    pub next_hop: IpAddr,
    pub as_number: u32,
    pub src_as: u32,
    pub src_peer_as: u32,
    pub dst_as_path: Vec<AsPathSegment>,
    pub communities: Vec<u32>,
    pub local_pref: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedUser {
    pub src_charset: u32,
    pub src_user: String,
    pub dst_charset: u32,
    pub dst_user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedUrl {
    pub direction: u32,
    pub url: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMpls {
    pub next_hop: IpAddr,
    pub in_stack: Vec<u32>,
    pub out_stack: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedNat {
    pub src_address: IpAddr,
    pub dst_address: IpAddr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMplsTunnel {
    pub tunnel_lsp_name: String,
    pub tunnel_id: u32,
    pub tunnel_cos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMplsVc {
    pub vc_instance_name: String,
    pub vll_vc_id: u32,
    pub vc_label_cos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMplsFtn {
    pub mpls_ftn_descr: String,
    pub mpls_ftn_mask: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMplsLdpFec {
    pub mpls_fec_addr_prefix_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedVlanTunnel {
    pub stack: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedSocketIpv4 {
    pub protocol: u32,
    pub local_ip: Ipv4Addr,
    pub remote_ip: Ipv4Addr,
    pub local_port: u32,
    pub remote_port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedSocketIpv6 {
    pub protocol: u32,
    pub local_ip: Ipv6Addr,
    pub remote_ip: Ipv6Addr,
    pub local_port: u32,
    pub remote_port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterRecord {
    GenericInterface(GenericInterfaceCounters),
    Ethernet(EthernetCounters),
    Vlan(VlanCounters),
    Processor(ProcessorCounters),
    Unknown {
        enterprise: u32,
        format: u32,
        data: Vec<u8>,
    },
}

impl CounterRecord {
    /// `(enterprise, format)` of the record
    pub const fn data_format(&self) -> (u32, u32) {
        match self {
            Self::GenericInterface(_) => (0, 1),
            Self::Ethernet(_) => (0, 2),
            Self::Vlan(_) => (0, 5),
            Self::Processor(_) => (0, 1001),
            Self::Unknown {
                enterprise, format, ..
            } => (*enterprise, *format),
        }
    }

    fn flatten_into(self, fields: &mut Vec<Value>) {
        match self {
            Self::GenericInterface(c) => {
                ValuesBuilder::new("generic_interface", fields)
                    .u32("if_index", c.if_index)
                    .u32("if_type", c.if_type)
                    .u64("if_speed", c.if_speed)
                    .u32("if_direction", c.if_direction)
                    .u32("if_status", c.if_status)
                    .u64("if_in_octets", c.if_in_octets)
                    .u32("if_in_ucast_pkts", c.if_in_ucast_pkts)
                    .u32("if_in_multicast_pkts", c.if_in_multicast_pkts)
                    .u32("if_in_broadcast_pkts", c.if_in_broadcast_pkts)
                    .u32("if_in_discards", c.if_in_discards)
                    .u32("if_in_errors", c.if_in_errors)
                    .u32("if_in_unknown_protos", c.if_in_unknown_protos)
                    .u64("if_out_octets", c.if_out_octets)
                    .u32("if_out_ucast_pkts", c.if_out_ucast_pkts)
                    .u32("if_out_multicast_pkts", c.if_out_multicast_pkts)
                    .u32("if_out_broadcast_pkts", c.if_out_broadcast_pkts)
                    .u32("if_out_discards", c.if_out_discards)
                    .u32("if_out_errors", c.if_out_errors)
                    .u32("if_promiscuous_mode", c.if_promiscuous_mode);
            }
            Self::Ethernet(c) => {
                ValuesBuilder::new("ethernet_interface", fields)
                    .u32("dot3_stats_alignment_errors", c.dot3_stats_alignment_errors)
                    .u32("dot3_stats_fcs_errors", c.dot3_stats_fcs_errors)
                    .u32(
                        "dot3_stats_single_collision_frames",
                        c.dot3_stats_single_collision_frames,
                    )
                    .u32(
                        "dot3_stats_multiple_collision_frames",
                        c.dot3_stats_multiple_collision_frames,
                    )
                    .u32("dot3_stats_sqe_test_errors", c.dot3_stats_sqe_test_errors)
                    .u32(
                        "dot3_stats_deferred_transmissions",
                        c.dot3_stats_deferred_transmissions,
                    )
                    .u32("dot3_stats_late_collisions", c.dot3_stats_late_collisions)
                    .u32(
                        "dot3_stats_excessive_collisions",
                        c.dot3_stats_excessive_collisions,
                    )
                    .u32(
                        "dot3_stats_internal_mac_transmit_errors",
                        c.dot3_stats_internal_mac_transmit_errors,
                    )
                    .u32(
                        "dot3_stats_carrier_sense_errors",
                        c.dot3_stats_carrier_sense_errors,
                    )
                    .u32("dot3_stats_frame_too_longs", c.dot3_stats_frame_too_longs)
                    .u32(
                        "dot3_stats_internal_mac_receive_errors",
                        c.dot3_stats_internal_mac_receive_errors,
                    )
                    .u32("dot3_stats_symbol_errors", c.dot3_stats_symbol_errors);
            }
            Self::Vlan(c) => {
                ValuesBuilder::new("vlan", fields)
                    .u32("vlan_id", c.vlan_id)
                    .u64("octets", c.octets)
                    .u32("ucast_pkts", c.ucast_pkts)
                    .u32("multicast_pkts", c.multicast_pkts)
                    .u32("broadcast_pkts", c.broadcast_pkts)
                    .u32("discards", c.discards);
            }
            Self::Processor(c) => {
                ValuesBuilder::new("processor", fields)
                    .u32("cpu_5s", c.cpu_5s)
                    .u32("cpu_1m", c.cpu_1m)
                    .u32("cpu_5m", c.cpu_5m)
                    .u64("total_memory", c.total_memory)
                    .u64("free_memory", c.free_memory);
            }
            Self::Unknown {
                enterprise,
                format,
                data,
            } => {
                fields.push(Value::new(
                    format!("counter_record_{enterprise}_{format}"),
                    ValueData::OctetArray(data),
                ));
            }
        }
    }
}

/// Generic interface counters (format 1), see RFC 2233
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericInterfaceCounters {
    pub if_index: u32,
    pub if_type: u32,
    pub if_speed: u64,
    pub if_direction: u32,
    pub if_status: u32,
    pub if_in_octets: u64,
    pub if_in_ucast_pkts: u32,
    pub if_in_multicast_pkts: u32,
    pub if_in_broadcast_pkts: u32,
    pub if_in_discards: u32,
    pub if_in_errors: u32,
    pub if_in_unknown_protos: u32,
    pub if_out_octets: u64,
    pub if_out_ucast_pkts: u32,
    pub if_out_multicast_pkts: u32,
    pub if_out_broadcast_pkts: u32,
    pub if_out_discards: u32,
    pub if_out_errors: u32,
    pub if_promiscuous_mode: u32,
}

/// Ethernet interface counters (format 2), see RFC 2358
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetCounters {
    pub dot3_stats_alignment_errors: u32,
    pub dot3_stats_fcs_errors: u32,
    pub dot3_stats_single_collision_frames: u32,
    pub dot3_stats_multiple_collision_frames: u32,
    pub dot3_stats_sqe_test_errors: u32,
    pub dot3_stats_deferred_transmissions: u32,
    pub dot3_stats_late_collisions: u32,
    pub dot3_stats_excessive_collisions: u32,
    pub dot3_stats_internal_mac_transmit_errors: u32,
    pub dot3_stats_carrier_sense_errors: u32,
    pub dot3_stats_frame_too_longs: u32,
    pub dot3_stats_internal_mac_receive_errors: u32,
    pub dot3_stats_symbol_errors: u32,
}

/// VLAN counters (format 5)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanCounters {
    pub vlan_id: u32,
    pub octets: u64,
    pub ucast_pkts: u32,
    pub multicast_pkts: u32,
    pub broadcast_pkts: u32,
    pub discards: u32,
}

/// Processor counters (format 1001), CPU loads are in hundredths of a percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorCounters {
    pub cpu_5s: u32,
    pub cpu_1m: u32,
    pub cpu_5m: u32,
    pub total_memory: u64,
    pub free_memory: u64,
}

fn ip_value(address: IpAddr) -> ValueData {
    match address {
        IpAddr::V4(address) => ValueData::Ipv4Address(address),
        IpAddr::V6(address) => ValueData::Ipv6Address(address),
    }
}

/// Appends `<structure>.<field>` values
struct ValuesBuilder<'a> {
    structure: &'static str,
    fields: &'a mut Vec<Value>,
}

impl<'a> ValuesBuilder<'a> {
    fn new(structure: &'static str, fields: &'a mut Vec<Value>) -> Self {
        Self { structure, fields }
    }

    fn push(&mut self, field: &str, data: ValueData) -> &mut Self {
        self.fields
            .push(Value::new(format!("{}.{field}", self.structure), data));
        self
    }

    fn u32(&mut self, field: &str, value: u32) -> &mut Self {
        self.push(field, ValueData::Unsigned32(value))
    }

    fn u64(&mut self, field: &str, value: u64) -> &mut Self {
        self.push(field, ValueData::Unsigned64(value))
    }

    fn ip(&mut self, field: &str, value: IpAddr) -> &mut Self {
        self.push(field, ip_value(value))
    }

    fn mac(&mut self, field: &str, value: MacAddress) -> &mut Self {
        self.push(field, ValueData::MacAddress(value))
    }

    fn string(&mut self, field: &str, value: String) -> &mut Self {
        self.push(field, ValueData::String(value))
    }

    fn octets(&mut self, field: &str, value: Vec<u8>) -> &mut Self {
        self.push(field, ValueData::OctetArray(value))
    }

    fn u32_list(&mut self, field: &str, values: &[u32]) -> &mut Self {
        let name = format!("{}.{field}", self.structure);
        let list = values
            .iter()
            .map(|value| Value::new(name.clone(), ValueData::Unsigned32(*value)))
            .collect();
        self.push(field, ValueData::BasicList(list))
    }
}
