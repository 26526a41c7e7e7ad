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

//! XDR decoding of sFlow v5 datagrams.
//!
//! Samples and records carry their length, so a structure that fails to
//! decode only costs its enclosing Sample. Unknown sample and record formats
//! are kept as raw octets.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use nom::{
    bytes::complete::take,
    error::ErrorKind,
    number::complete::{be_u128, be_u32, be_u64},
    IResult, InputTake, Slice,
};
use tracing::{debug, trace};

use crate::{
    sflow::*,
    value::MacAddress,
    wire::deserializer::{DecodingContext, WireError},
};
use telemetryd_parse_utils::{
    parse_into_located, LocatedParsingError, ReadablePdu, ReadablePduWithOneInput, Span,
};
use telemetryd_serde_macros::LocatedError;

const ADDRESS_TYPE_IPV4: u32 = 1;
const ADDRESS_TYPE_IPV6: u32 = 2;

/// `data_format` and `length` words in front of every sample and record
const TLV_HEADER_LENGTH: usize = 8;

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum SFlowDatagramParsingError {
    NomError(#[from_nom] ErrorKind),
    UnsupportedVersion(u32),
    AgentAddressError(#[from_located] StructureParsingError),
}

impl std::fmt::Display for SFlowDatagramParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::UnsupportedVersion(version) => write!(f, "unsupported sFlow version {version}"),
            Self::AgentAddressError(e) => write!(f, "agent address: {e}"),
        }
    }
}

impl std::error::Error for SFlowDatagramParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_) | Self::UnsupportedVersion(_) => None,
            Self::AgentAddressError(err) => Some(err),
        }
    }
}

impl WireError for SFlowDatagramParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::UnsupportedVersion(_) => false,
            Self::AgentAddressError(err) => err.is_truncation(),
        }
    }
}

/// Errors of the fixed layout structures nested in a Sample
#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum StructureParsingError {
    NomError(#[from_nom] ErrorKind),
    UnknownAddressType(u32),
}

impl std::fmt::Display for StructureParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(ErrorKind::Eof) => write!(f, "not enough octets left"),
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::UnknownAddressType(address_type) => {
                write!(f, "unknown address type {address_type}")
            }
        }
    }
}

impl std::error::Error for StructureParsingError {}

impl WireError for StructureParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

/// A structure failed to decode, along with the name of that structure
type StructureError<'a> = (&'static str, nom::Err<LocatedStructureParsingError<'a>>);

/// Decode the datagram header then the samples one by one. Only an
/// unreadable header fails the datagram, samples that can't be decoded are
/// reported to the context and skipped.
impl<'a>
    ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedSFlowDatagramParsingError<'a>>
    for SFlowDatagram
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedSFlowDatagramParsingError<'a>> {
        let input = buf;
        let (buf, version) = be_u32(buf)?;
        if version != SFLOW_VERSION {
            return Err(nom::Err::Error(LocatedSFlowDatagramParsingError::new(
                input,
                SFlowDatagramParsingError::UnsupportedVersion(version),
            )));
        }
        let (buf, Agent(agent_address)) = parse_into_located(buf)?;
        let (buf, sub_agent_id) = be_u32(buf)?;
        ctx.set_observation_domain_id(sub_agent_id);
        let (buf, sequence_number) = be_u32(buf)?;
        let (buf, uptime) = be_u32(buf)?;
        let (mut buf, count) = be_u32(buf)?;

        let mut samples = Vec::with_capacity((count as usize).min(buf.len() / TLV_HEADER_LENGTH));
        for index in 0..count {
            let offset = buf.location_offset();
            let Some((rest, enterprise, format, body)) = tlv(buf) else {
                ctx.report(ctx.truncated(offset, format!("sample {index} of {count}")));
                break;
            };
            buf = rest;
            match decode_sample(enterprise, format, body) {
                Ok(sample) => samples.push(sample),
                Err((structure, err)) => report_structure_error(ctx, structure, offset, err),
            }
        }
        Ok((
            buf,
            SFlowDatagram::new(agent_address, sub_agent_id, sequence_number, uptime, samples),
        ))
    }
}

/// Split `data_format`, `length` and the (padded) body of a sample or record.
/// `None` when the header is unreadable or the body is longer than `buf`.
fn tlv(buf: Span<'_>) -> Option<(Span<'_>, u32, u32, Span<'_>)> {
    let data_format = buf.peek_be_u32(0)?;
    let length = buf.peek_be_u32(4)? as usize;
    let buf = buf.slice(TLV_HEADER_LENGTH..);
    if length > buf.len() {
        return None;
    }
    let padded = (length + padding(length)).min(buf.len());
    let (rest, body) = buf.take_split(padded);
    let (_, body) = body.take_split(length);
    Some((rest, data_format >> 12, data_format & 0xfff, body))
}

const fn padding(length: usize) -> usize {
    (4 - length % 4) % 4
}

fn report_structure_error(
    ctx: &DecodingContext<'_>,
    structure: &'static str,
    offset: usize,
    err: nom::Err<LocatedStructureParsingError<'_>>,
) {
    let diagnostic = match err {
        nom::Err::Incomplete(_) => ctx.invalid(offset, structure, "not enough octets left"),
        nom::Err::Error(err) | nom::Err::Failure(err) => {
            ctx.invalid(err.location_offset(), structure, err.error().to_string())
        }
    };
    debug!(
        exporter = %ctx.exporter(),
        structure,
        %diagnostic,
        "skipping undecodable sFlow sample"
    );
    ctx.report(diagnostic);
}

fn decode_sample(enterprise: u32, format: u32, body: Span<'_>) -> Result<Sample, StructureError<'_>> {
    let sample = match (enterprise, format) {
        (0, FLOW_SAMPLE_FORMAT) => Sample::Flow(decode_flow_sample(body, false)?),
        (0, COUNTER_SAMPLE_FORMAT) => Sample::Counter(decode_counter_sample(body, false)?),
        (0, EXPANDED_FLOW_SAMPLE_FORMAT) => Sample::ExpandedFlow(decode_flow_sample(body, true)?),
        (0, EXPANDED_COUNTER_SAMPLE_FORMAT) => {
            Sample::ExpandedCounter(decode_counter_sample(body, true)?)
        }
        _ => {
            trace!(enterprise, format, "keeping unknown sFlow sample format as raw");
            Sample::Unknown {
                enterprise,
                format,
                data: body.to_vec(),
            }
        }
    };
    Ok(sample)
}

/// `(sequence_number, source_id_type, source_id_index)`, the compact form
/// packs the type in the top octet of the source id.
fn sample_header(
    buf: Span<'_>,
    expanded: bool,
) -> IResult<Span<'_>, (u32, u32, u32), LocatedStructureParsingError<'_>> {
    let (buf, sequence_number) = be_u32(buf)?;
    if expanded {
        let (buf, source_id_type) = be_u32(buf)?;
        let (buf, source_id_index) = be_u32(buf)?;
        Ok((buf, (sequence_number, source_id_type, source_id_index)))
    } else {
        let (buf, source_id) = be_u32(buf)?;
        Ok((buf, (sequence_number, source_id >> 24, source_id & 0x00ff_ffff)))
    }
}

fn interface(
    buf: Span<'_>,
    expanded: bool,
) -> IResult<Span<'_>, Interface, LocatedStructureParsingError<'_>> {
    if expanded {
        let (buf, format) = be_u32(buf)?;
        let (buf, value) = be_u32(buf)?;
        Ok((buf, Interface::new(format, value)))
    } else {
        let (buf, raw) = be_u32(buf)?;
        Ok((buf, Interface::from_compact(raw)))
    }
}

fn flow_sample_header(
    buf: Span<'_>,
    expanded: bool,
) -> StructureResult<'_, (FlowSample, u32)> {
    let (buf, (sequence_number, source_id_type, source_id_index)) = sample_header(buf, expanded)?;
    let (buf, sampling_rate) = be_u32(buf)?;
    let (buf, sample_pool) = be_u32(buf)?;
    let (buf, drops) = be_u32(buf)?;
    let (buf, input) = interface(buf, expanded)?;
    let (buf, output) = interface(buf, expanded)?;
    let (buf, count) = be_u32(buf)?;
    Ok((
        buf,
        (
            FlowSample {
                sequence_number,
                source_id_type,
                source_id_index,
                sampling_rate,
                sample_pool,
                drops,
                input,
                output,
                records: Vec::with_capacity((count as usize).min(buf.len() / TLV_HEADER_LENGTH)),
            },
            count,
        ),
    ))
}

fn decode_flow_sample(body: Span<'_>, expanded: bool) -> Result<FlowSample, StructureError<'_>> {
    let structure = if expanded {
        "expanded_flow_sample"
    } else {
        "flow_sample"
    };
    let (mut buf, (mut sample, count)) =
        flow_sample_header(body, expanded).map_err(|err| (structure, err))?;
    for _ in 0..count {
        let Some((rest, enterprise, format, record)) = tlv(buf) else {
            return Err((structure, truncated(buf)));
        };
        buf = rest;
        sample
            .records
            .push(decode_flow_record(enterprise, format, record)?);
    }
    Ok(sample)
}

fn decode_counter_sample(
    body: Span<'_>,
    expanded: bool,
) -> Result<CounterSample, StructureError<'_>> {
    let structure = if expanded {
        "expanded_counter_sample"
    } else {
        "counter_sample"
    };
    let (buf, (sequence_number, source_id_type, source_id_index)) =
        sample_header(body, expanded).map_err(|err| (structure, err))?;
    let (mut buf, count) = be_u32(buf).map_err(|err| (structure, err))?;
    let mut records = Vec::with_capacity((count as usize).min(buf.len() / TLV_HEADER_LENGTH));
    for _ in 0..count {
        let Some((rest, enterprise, format, record)) = tlv(buf) else {
            return Err((structure, truncated(buf)));
        };
        buf = rest;
        records.push(decode_counter_record(enterprise, format, record)?);
    }
    Ok(CounterSample {
        sequence_number,
        source_id_type,
        source_id_index,
        records,
    })
}

fn truncated(buf: Span<'_>) -> nom::Err<LocatedStructureParsingError<'_>> {
    nom::Err::Error(LocatedStructureParsingError::new(
        buf,
        StructureParsingError::NomError(ErrorKind::Eof),
    ))
}

/// Decode a whole record body, trailing octets are left for newer versions
/// of the structure.
fn record<'a, T>(structure: &'static str, body: Span<'a>) -> Result<T, StructureError<'a>>
where
    T: ReadablePdu<'a, LocatedStructureParsingError<'a>>,
{
    T::from_wire(body)
        .map(|(_, record)| record)
        .map_err(|err| (structure, err))
}

fn decode_flow_record(
    enterprise: u32,
    format: u32,
    body: Span<'_>,
) -> Result<FlowRecord, StructureError<'_>> {
    let flow_record = match (enterprise, format) {
        (0, 1) => FlowRecord::SampledHeader(record("sampled_header", body)?),
        (0, 2) => FlowRecord::SampledEthernet(record("sampled_ethernet", body)?),
        (0, 3) => FlowRecord::SampledIpv4(record("sampled_ipv4", body)?),
        (0, 4) => FlowRecord::SampledIpv6(record("sampled_ipv6", body)?),
        (0, 1001) => FlowRecord::ExtendedSwitch(record("extended_switch", body)?),
        (0, 1002) => FlowRecord::ExtendedRouter(record("extended_router", body)?),
        (0, 1003) => FlowRecord::ExtendedGateway(record("extended_gateway", body)?),
        (0, 1004) => FlowRecord::ExtendedUser(record("extended_user", body)?),
        (0, 1005) => FlowRecord::ExtendedUrl(record("extended_url", body)?),
        (0, 1006) => FlowRecord::ExtendedMpls(record("extended_mpls", body)?),
        (0, 1007) => FlowRecord::ExtendedNat(record("extended_nat", body)?),
        (0, 1008) => FlowRecord::ExtendedMplsTunnel(record("extended_mpls_tunnel", body)?),
        (0, 1009) => FlowRecord::ExtendedMplsVc(record("extended_mpls_vc", body)?),
        (0, 1010) => FlowRecord::ExtendedMplsFtn(record("extended_mpls_ftn", body)?),
        (0, 1011) => FlowRecord::ExtendedMplsLdpFec(record("extended_mpls_ldp_fec", body)?),
        (0, 1012) => FlowRecord::ExtendedVlanTunnel(record("extended_vlan_tunnel", body)?),
        (0, 2100) => FlowRecord::ExtendedSocketIpv4(record("extended_socket_ipv4", body)?),
        (0, 2101) => FlowRecord::ExtendedSocketIpv6(record("extended_socket_ipv6", body)?),
        _ => {
            trace!(enterprise, format, "keeping unknown sFlow flow record as raw");
            FlowRecord::Unknown {
                enterprise,
                format,
                data: body.to_vec(),
            }
        }
    };
    Ok(flow_record)
}

fn decode_counter_record(
    enterprise: u32,
    format: u32,
    body: Span<'_>,
) -> Result<CounterRecord, StructureError<'_>> {
    let counter_record = match (enterprise, format) {
        (0, 1) => CounterRecord::GenericInterface(record("generic_interface", body)?),
        (0, 2) => CounterRecord::Ethernet(record("ethernet_interface", body)?),
        (0, 5) => CounterRecord::Vlan(record("vlan", body)?),
        (0, 1001) => CounterRecord::Processor(record("processor", body)?),
        _ => {
            trace!(enterprise, format, "keeping unknown sFlow counter record as raw");
            CounterRecord::Unknown {
                enterprise,
                format,
                data: body.to_vec(),
            }
        }
    };
    Ok(counter_record)
}

type StructureResult<'a, T> = IResult<Span<'a>, T, LocatedStructureParsingError<'a>>;

/// ```text
/// union address (address_type type) {
///    case UNKNOWN: void;
///    case IP_V4: ip_v4;
///    case IP_V6: ip_v6;
/// }
/// ```
fn address(buf: Span<'_>) -> StructureResult<'_, IpAddr> {
    let input = buf;
    let (buf, address_type) = be_u32(buf)?;
    match address_type {
        ADDRESS_TYPE_IPV4 => ipv4(buf).map(|(buf, address)| (buf, IpAddr::V4(address))),
        ADDRESS_TYPE_IPV6 => ipv6(buf).map(|(buf, address)| (buf, IpAddr::V6(address))),
        address_type => Err(nom::Err::Error(LocatedStructureParsingError::new(
            input,
            StructureParsingError::UnknownAddressType(address_type),
        ))),
    }
}

fn ipv4(buf: Span<'_>) -> StructureResult<'_, Ipv4Addr> {
    let (buf, address) = be_u32(buf)?;
    Ok((buf, Ipv4Addr::from(address)))
}

fn ipv6(buf: Span<'_>) -> StructureResult<'_, Ipv6Addr> {
    let (buf, address) = be_u128(buf)?;
    Ok((buf, Ipv6Addr::from(address)))
}

/// 6 octets MAC address padded to 8 octets
fn mac_address(buf: Span<'_>) -> StructureResult<'_, MacAddress> {
    let (buf, octets) = take(6usize)(buf)?;
    let (buf, _) = take(2usize)(buf)?;
    let mut address = [0u8; 6];
    address.copy_from_slice(&octets);
    Ok((buf, MacAddress::new(address)))
}

fn opaque(buf: Span<'_>) -> StructureResult<'_, Span<'_>> {
    let (buf, length) = be_u32(buf)?;
    let (buf, data) = take(length)(buf)?;
    let (buf, _) = take(padding(length as usize))(buf)?;
    Ok((buf, data))
}

/// Strings are decoded leniently, exporters aren't always strict about UTF-8
fn string(buf: Span<'_>) -> StructureResult<'_, String> {
    let (buf, data) = opaque(buf)?;
    Ok((buf, String::from_utf8_lossy(&data).into_owned()))
}

fn u32_array(buf: Span<'_>) -> StructureResult<'_, Vec<u32>> {
    let (mut buf, count) = be_u32(buf)?;
    let mut values = Vec::with_capacity((count as usize).min(buf.len() / 4));
    for _ in 0..count {
        let (t, value) = be_u32(buf)?;
        values.push(value);
        buf = t;
    }
    Ok((buf, values))
}

/// The agent address in the datagram header
struct Agent(IpAddr);

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for Agent {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, agent) = address(buf)?;
        Ok((buf, Agent(agent)))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for SampledHeader {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, protocol) = be_u32(buf)?;
        let (buf, frame_length) = be_u32(buf)?;
        let (buf, stripped) = be_u32(buf)?;
        let (buf, header) = opaque(buf)?;
        Ok((
            buf,
            SampledHeader {
                protocol,
                frame_length,
                stripped,
                header: header.to_vec(),
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for SampledEthernet {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, length) = be_u32(buf)?;
        let (buf, src_mac) = mac_address(buf)?;
        let (buf, dst_mac) = mac_address(buf)?;
        let (buf, eth_type) = be_u32(buf)?;
        Ok((
            buf,
            SampledEthernet {
                length,
                src_mac,
                dst_mac,
                eth_type,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for SampledIpv4 {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, length) = be_u32(buf)?;
        let (buf, protocol) = be_u32(buf)?;
        let (buf, src_ip) = ipv4(buf)?;
        let (buf, dst_ip) = ipv4(buf)?;
        let (buf, src_port) = be_u32(buf)?;
        let (buf, dst_port) = be_u32(buf)?;
        let (buf, tcp_flags) = be_u32(buf)?;
        let (buf, tos) = be_u32(buf)?;
        Ok((
            buf,
            SampledIpv4 {
                length,
                protocol,
                src_ip,
                dst_ip,
                src_port,
                dst_port,
                tcp_flags,
                tos,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for SampledIpv6 {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, length) = be_u32(buf)?;
        let (buf, protocol) = be_u32(buf)?;
        let (buf, src_ip) = ipv6(buf)?;
        let (buf, dst_ip) = ipv6(buf)?;
        let (buf, src_port) = be_u32(buf)?;
        let (buf, dst_port) = be_u32(buf)?;
        let (buf, tcp_flags) = be_u32(buf)?;
        let (buf, priority) = be_u32(buf)?;
        Ok((
            buf,
            SampledIpv6 {
                length,
                protocol,
                src_ip,
                dst_ip,
                src_port,
                dst_port,
                tcp_flags,
                priority,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedSwitch {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, src_vlan) = be_u32(buf)?;
        let (buf, src_priority) = be_u32(buf)?;
        let (buf, dst_vlan) = be_u32(buf)?;
        let (buf, dst_priority) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedSwitch {
                src_vlan,
                src_priority,
                dst_vlan,
                dst_priority,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedRouter {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, next_hop) = address(buf)?;
        let (buf, src_mask_len) = be_u32(buf)?;
        let (buf, dst_mask_len) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedRouter {
                next_hop,
                src_mask_len,
                dst_mask_len,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for AsPathSegment {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, segment_type) = be_u32(buf)?;
        let (buf, asns) = u32_array(buf)?;
        Ok((buf, AsPathSegment { segment_type, asns }))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedGateway {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, next_hop) = address(buf)?;
        let (buf, as_number) = be_u32(buf)?;
        let (buf, src_as) = be_u32(buf)?;
        let (buf, src_peer_as) = be_u32(buf)?;
        let (mut buf, segments) = be_u32(buf)?;
        // Each segment is at least its type and count words
        let mut dst_as_path = Vec::with_capacity((segments as usize).min(buf.len() / 8));
        for _ in 0..segments {
            let (t, segment) = AsPathSegment::from_wire(buf)?;
            dst_as_path.push(segment);
            buf = t;
        }
        let (buf, communities) = u32_array(buf)?;
        let (buf, local_pref) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedGateway {
                next_hop,
                as_number,
                src_as,
                src_peer_as,
                dst_as_path,
                communities,
                local_pref,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedUser {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, src_charset) = be_u32(buf)?;
        let (buf, src_user) = string(buf)?;
        let (buf, dst_charset) = be_u32(buf)?;
        let (buf, dst_user) = string(buf)?;
        Ok((
            buf,
            ExtendedUser {
                src_charset,
                src_user,
                dst_charset,
                dst_user,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedUrl {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, direction) = be_u32(buf)?;
        let (buf, url) = string(buf)?;
        let (buf, host) = string(buf)?;
        Ok((
            buf,
            ExtendedUrl {
                direction,
                url,
                host,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedMpls {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, next_hop) = address(buf)?;
        let (buf, in_stack) = u32_array(buf)?;
        let (buf, out_stack) = u32_array(buf)?;
        Ok((
            buf,
            ExtendedMpls {
                next_hop,
                in_stack,
                out_stack,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedNat {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, src_address) = address(buf)?;
        let (buf, dst_address) = address(buf)?;
        Ok((
            buf,
            ExtendedNat {
                src_address,
                dst_address,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedMplsTunnel {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, tunnel_lsp_name) = string(buf)?;
        let (buf, tunnel_id) = be_u32(buf)?;
        let (buf, tunnel_cos) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedMplsTunnel {
                tunnel_lsp_name,
                tunnel_id,
                tunnel_cos,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedMplsVc {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, vc_instance_name) = string(buf)?;
        let (buf, vll_vc_id) = be_u32(buf)?;
        let (buf, vc_label_cos) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedMplsVc {
                vc_instance_name,
                vll_vc_id,
                vc_label_cos,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedMplsFtn {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, mpls_ftn_descr) = string(buf)?;
        let (buf, mpls_ftn_mask) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedMplsFtn {
                mpls_ftn_descr,
                mpls_ftn_mask,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedMplsLdpFec {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, mpls_fec_addr_prefix_length) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedMplsLdpFec {
                mpls_fec_addr_prefix_length,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedVlanTunnel {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, stack) = u32_array(buf)?;
        Ok((buf, ExtendedVlanTunnel { stack }))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedSocketIpv4 {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, protocol) = be_u32(buf)?;
        let (buf, local_ip) = ipv4(buf)?;
        let (buf, remote_ip) = ipv4(buf)?;
        let (buf, local_port) = be_u32(buf)?;
        let (buf, remote_port) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedSocketIpv4 {
                protocol,
                local_ip,
                remote_ip,
                local_port,
                remote_port,
            },
        ))
    }
}

/// 44 octets: protocol, two IPv6 addresses and two ports
impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ExtendedSocketIpv6 {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, protocol) = be_u32(buf)?;
        let (buf, local_ip) = ipv6(buf)?;
        let (buf, remote_ip) = ipv6(buf)?;
        let (buf, local_port) = be_u32(buf)?;
        let (buf, remote_port) = be_u32(buf)?;
        Ok((
            buf,
            ExtendedSocketIpv6 {
                protocol,
                local_ip,
                remote_ip,
                local_port,
                remote_port,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for GenericInterfaceCounters {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, if_index) = be_u32(buf)?;
        let (buf, if_type) = be_u32(buf)?;
        let (buf, if_speed) = be_u64(buf)?;
        let (buf, if_direction) = be_u32(buf)?;
        let (buf, if_status) = be_u32(buf)?;
        let (buf, if_in_octets) = be_u64(buf)?;
        let (buf, if_in_ucast_pkts) = be_u32(buf)?;
        let (buf, if_in_multicast_pkts) = be_u32(buf)?;
        let (buf, if_in_broadcast_pkts) = be_u32(buf)?;
        let (buf, if_in_discards) = be_u32(buf)?;
        let (buf, if_in_errors) = be_u32(buf)?;
        let (buf, if_in_unknown_protos) = be_u32(buf)?;
        let (buf, if_out_octets) = be_u64(buf)?;
        let (buf, if_out_ucast_pkts) = be_u32(buf)?;
        let (buf, if_out_multicast_pkts) = be_u32(buf)?;
        let (buf, if_out_broadcast_pkts) = be_u32(buf)?;
        let (buf, if_out_discards) = be_u32(buf)?;
        let (buf, if_out_errors) = be_u32(buf)?;
        let (buf, if_promiscuous_mode) = be_u32(buf)?;
        Ok((
            buf,
            GenericInterfaceCounters {
                if_index,
                if_type,
                if_speed,
                if_direction,
                if_status,
                if_in_octets,
                if_in_ucast_pkts,
                if_in_multicast_pkts,
                if_in_broadcast_pkts,
                if_in_discards,
                if_in_errors,
                if_in_unknown_protos,
                if_out_octets,
                if_out_ucast_pkts,
                if_out_multicast_pkts,
                if_out_broadcast_pkts,
                if_out_discards,
                if_out_errors,
                if_promiscuous_mode,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for EthernetCounters {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, dot3_stats_alignment_errors) = be_u32(buf)?;
        let (buf, dot3_stats_fcs_errors) = be_u32(buf)?;
        let (buf, dot3_stats_single_collision_frames) = be_u32(buf)?;
        let (buf, dot3_stats_multiple_collision_frames) = be_u32(buf)?;
        let (buf, dot3_stats_sqe_test_errors) = be_u32(buf)?;
        let (buf, dot3_stats_deferred_transmissions) = be_u32(buf)?;
        let (buf, dot3_stats_late_collisions) = be_u32(buf)?;
        let (buf, dot3_stats_excessive_collisions) = be_u32(buf)?;
        let (buf, dot3_stats_internal_mac_transmit_errors) = be_u32(buf)?;
        let (buf, dot3_stats_carrier_sense_errors) = be_u32(buf)?;
        let (buf, dot3_stats_frame_too_longs) = be_u32(buf)?;
        let (buf, dot3_stats_internal_mac_receive_errors) = be_u32(buf)?;
        let (buf, dot3_stats_symbol_errors) = be_u32(buf)?;
        Ok((
            buf,
            EthernetCounters {
                dot3_stats_alignment_errors,
                dot3_stats_fcs_errors,
                dot3_stats_single_collision_frames,
                dot3_stats_multiple_collision_frames,
                dot3_stats_sqe_test_errors,
                dot3_stats_deferred_transmissions,
                dot3_stats_late_collisions,
                dot3_stats_excessive_collisions,
                dot3_stats_internal_mac_transmit_errors,
                dot3_stats_carrier_sense_errors,
                dot3_stats_frame_too_longs,
                dot3_stats_internal_mac_receive_errors,
                dot3_stats_symbol_errors,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for VlanCounters {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, vlan_id) = be_u32(buf)?;
        let (buf, octets) = be_u64(buf)?;
        let (buf, ucast_pkts) = be_u32(buf)?;
        let (buf, multicast_pkts) = be_u32(buf)?;
        let (buf, broadcast_pkts) = be_u32(buf)?;
        let (buf, discards) = be_u32(buf)?;
        Ok((
            buf,
            VlanCounters {
                vlan_id,
                octets,
                ucast_pkts,
                multicast_pkts,
                broadcast_pkts,
                discards,
            },
        ))
    }
}

impl<'a> ReadablePdu<'a, LocatedStructureParsingError<'a>> for ProcessorCounters {
    fn from_wire(buf: Span<'a>) -> StructureResult<'a, Self> {
        let (buf, cpu_5s) = be_u32(buf)?;
        let (buf, cpu_1m) = be_u32(buf)?;
        let (buf, cpu_5m) = be_u32(buf)?;
        let (buf, total_memory) = be_u64(buf)?;
        let (buf, free_memory) = be_u64(buf)?;
        Ok((
            buf,
            ProcessorCounters {
                cpu_5s,
                cpu_1m,
                cpu_5m,
                total_memory,
                free_memory,
            },
        ))
    }
}
