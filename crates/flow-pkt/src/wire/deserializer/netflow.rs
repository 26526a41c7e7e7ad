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

use chrono::{LocalResult, TimeZone, Utc};
use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u32},
    IResult,
};
use tracing::trace;

use crate::{
    netflow::*,
    template::DecodingTemplate,
    wire::deserializer::{
        next_set, parse_data_records, DataRecordParsingError, DecodingContext,
        FieldSpecifierParsingError, LocatedDataRecordParsingError,
        LocatedFieldSpecifierParsingError, WireError, SET_HEADER_LENGTH,
    },
    DataSetId, FieldSpecifier, DATA_SET_MIN_ID,
};
use telemetryd_parse_utils::{
    parse_into_located, parse_into_located_one_input, parse_till_empty_into_located, ReadablePdu,
    ReadablePduWithOneInput, Span,
};
use telemetryd_serde_macros::LocatedError;

/// 2-octets version, 2-octets count, 4-octets * 4 (sysUpTime, UNIX secs,
/// seq no, source id)
pub const NETFLOW_V9_HEADER_LENGTH: usize = 20;

/// 2-octets template id, 2-octets field count
const TEMPLATE_RECORD_HEADER_LENGTH: usize = 4;

/// 2-octets template id, 2-octets scope length, 2-octets option length
const OPTIONS_TEMPLATE_RECORD_HEADER_LENGTH: usize = 6;

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum NetFlowV9PacketParsingError {
    NomError(#[from_nom] ErrorKind),
    UnsupportedVersion(u16),
    InvalidUnixTime(u32),
}

impl std::fmt::Display for NetFlowV9PacketParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported NetFlow version {version}")
            }
            Self::InvalidUnixTime(time) => write!(f, "invalid NetFlow v9 unix time {time}"),
        }
    }
}

impl std::error::Error for NetFlowV9PacketParsingError {}

impl WireError for NetFlowV9PacketParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

/// Decode a NetFlow v9 packet. The header `count` bounds the number of
/// records read, Sets failing to decode are skipped like in IPFIX.
impl<'a>
    ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedNetFlowV9PacketParsingError<'a>>
    for NetFlowV9Packet
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedNetFlowV9PacketParsingError<'a>> {
        let input = buf;
        let (buf, version) = be_u16(buf)?;
        if version != NETFLOW_V9_VERSION {
            return Err(nom::Err::Error(LocatedNetFlowV9PacketParsingError::new(
                input,
                NetFlowV9PacketParsingError::UnsupportedVersion(version),
            )));
        }
        let (buf, count) = be_u16(buf)?;
        let (buf, sys_up_time) = be_u32(buf)?;
        let input = buf;
        let (buf, unix_time) = be_u32(buf)?;
        let unix_time = match Utc.timestamp_opt(unix_time as i64, 0) {
            LocalResult::Single(time) => time,
            _ => {
                return Err(nom::Err::Error(LocatedNetFlowV9PacketParsingError::new(
                    input,
                    NetFlowV9PacketParsingError::InvalidUnixTime(unix_time),
                )));
            }
        };
        let (buf, sequence_number) = be_u32(buf)?;
        let (mut buf, source_id) = be_u32(buf)?;
        ctx.set_observation_domain_id(source_id);

        let mut sets = Vec::new();
        let mut remaining = count as usize;
        while remaining > 0 && !buf.is_empty() {
            let Some((rest, set_buf)) = next_set(buf, ctx) else {
                break;
            };
            buf = rest;
            let mark = ctx.diagnostics_mark();
            match Set::from_wire(set_buf, ctx) {
                Ok((_, set)) => {
                    remaining = remaining.saturating_sub(set.record_count().max(1));
                    sets.push(set);
                }
                Err(err) => {
                    remaining -= 1;
                    ctx.discard_diagnostics_since(mark);
                    ctx.report_nom_error("flowset", set_buf.location_offset(), err);
                }
            }
        }
        if !buf.is_empty() {
            trace!(
                exporter = %ctx.exporter(),
                ignored = buf.len(),
                "octets after the announced NetFlow v9 records"
            );
        }
        Ok((
            buf,
            NetFlowV9Packet::new(sys_up_time, unix_time, sequence_number, source_id, sets),
        ))
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum SetParsingError {
    NomError(#[from_nom] ErrorKind),
    InvalidLength(u16),
    InvalidSetId(u16),
    NoTemplateDefinedFor(u16),
    TemplateRecordError(#[from_located] TemplateRecordParsingError),
    OptionsTemplateRecordError(#[from_located] OptionsTemplateRecordParsingError),
    DataRecordError(#[from_located] DataRecordParsingError),
}

impl std::fmt::Display for SetParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::InvalidLength(length) => write!(f, "invalid flowset length {length}"),
            Self::InvalidSetId(id) => write!(f, "invalid flowset id {id}"),
            Self::NoTemplateDefinedFor(id) => {
                write!(f, "no template defined for flowset id {id}")
            }
            Self::TemplateRecordError(e) => write!(f, "{e}"),
            Self::OptionsTemplateRecordError(e) => write!(f, "{e}"),
            Self::DataRecordError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SetParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_)
            | Self::InvalidLength(_)
            | Self::InvalidSetId(_)
            | Self::NoTemplateDefinedFor(_) => None,
            Self::TemplateRecordError(err) => Some(err),
            Self::OptionsTemplateRecordError(err) => Some(err),
            Self::DataRecordError(err) => Some(err),
        }
    }
}

impl WireError for SetParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::InvalidLength(_) | Self::InvalidSetId(_) | Self::NoTemplateDefinedFor(_) => false,
            Self::TemplateRecordError(err) => err.is_truncation(),
            Self::OptionsTemplateRecordError(err) => err.is_truncation(),
            Self::DataRecordError(err) => err.is_truncation(),
        }
    }

    fn missing_template(&self) -> Option<u16> {
        match self {
            Self::NoTemplateDefinedFor(id) => Some(*id),
            _ => None,
        }
    }
}

impl<'a> ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedSetParsingError<'a>> for Set {
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedSetParsingError<'a>> {
        let input = buf;
        let (buf, id) = be_u16(buf)?;
        let length_input = buf;
        let (buf, length) = be_u16(buf)?;
        if length < SET_HEADER_LENGTH {
            return Err(nom::Err::Error(LocatedSetParsingError::new(
                length_input,
                SetParsingError::InvalidLength(length),
            )));
        }
        let (remainder, mut buf) = nom::bytes::complete::take(length - SET_HEADER_LENGTH)(buf)?;
        let set = match id {
            NETFLOW_TEMPLATE_SET_ID => {
                let mut templates = Vec::new();
                while buf.len() >= TEMPLATE_RECORD_HEADER_LENGTH {
                    let (t, template): (_, TemplateRecord) =
                        parse_into_located_one_input(buf, ctx)?;
                    buf = t;
                    templates.push(template);
                }
                Set::Template(templates.into_boxed_slice())
            }
            NETFLOW_OPTIONS_TEMPLATE_SET_ID => {
                let mut option_templates = Vec::new();
                // Like Wireshark, anything shorter than an options template
                // header is padding
                while buf.len() >= OPTIONS_TEMPLATE_RECORD_HEADER_LENGTH {
                    let (t, option_template): (_, OptionsTemplateRecord) =
                        parse_into_located_one_input(buf, ctx)?;
                    buf = t;
                    option_templates.push(option_template);
                }
                Set::OptionsTemplate(option_templates.into_boxed_slice())
            }
            id => {
                let data_set_id = DataSetId::new(id).map_err(|_| {
                    nom::Err::Error(LocatedSetParsingError::new(
                        input,
                        SetParsingError::InvalidSetId(id),
                    ))
                })?;
                let Some(template) = ctx.templates().get(&ctx.template_key(id)) else {
                    return Err(nom::Err::Error(LocatedSetParsingError::new(
                        input,
                        SetParsingError::NoTemplateDefinedFor(id),
                    )));
                };
                let (_padding, records) = parse_data_records(buf, &template, ctx)
                    .map_err(|err| err.map(LocatedSetParsingError::from))?;
                Set::Data {
                    id: data_set_id,
                    records: records.into_boxed_slice(),
                }
            }
        };
        Ok((remainder, set))
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum TemplateRecordParsingError {
    NomError(#[from_nom] ErrorKind),
    InvalidTemplateId(u16),
    FieldSpecifierError(#[from_located] FieldSpecifierParsingError),
}

impl std::fmt::Display for TemplateRecordParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::InvalidTemplateId(id) => write!(f, "invalid template id {id}"),
            Self::FieldSpecifierError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TemplateRecordParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_) | Self::InvalidTemplateId(_) => None,
            Self::FieldSpecifierError(err) => Some(err),
        }
    }
}

impl WireError for TemplateRecordParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::InvalidTemplateId(_) => false,
            Self::FieldSpecifierError(err) => err.is_truncation(),
        }
    }
}

impl<'a> ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedTemplateRecordParsingError<'a>>
    for TemplateRecord
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedTemplateRecordParsingError<'a>> {
        let input = buf;
        let (buf, template_id) = be_u16(buf)?;
        // Template IDs 0-255 are reserved for FlowSet IDs
        if template_id < DATA_SET_MIN_ID {
            return Err(nom::Err::Error(LocatedTemplateRecordParsingError::new(
                input,
                TemplateRecordParsingError::InvalidTemplateId(template_id),
            )));
        }
        let (mut buf, field_count) = be_u16(buf)?;
        if field_count == 0 {
            ctx.templates().remove(&ctx.template_key(template_id));
            return Ok((buf, TemplateRecord::new(template_id, Box::new([]))));
        }
        let mut fields = Vec::with_capacity((field_count as usize).min(buf.len() / 4));
        for _ in 0..field_count {
            let (t, field): (_, FieldSpecifier) = parse_into_located(buf)?;
            fields.push(field);
            buf = t;
        }
        let record = TemplateRecord::new(template_id, fields.into_boxed_slice());
        ctx.templates().put(
            ctx.template_key(template_id),
            DecodingTemplate::from(&record),
        );
        Ok((buf, record))
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum OptionsTemplateRecordParsingError {
    NomError(#[from_nom] ErrorKind),
    InvalidTemplateId(u16),
    ScopeFieldSpecifierError(#[from_located] ScopeFieldSpecifierParsingError),
    FieldSpecifierError(#[from_located] FieldSpecifierParsingError),
}

impl std::fmt::Display for OptionsTemplateRecordParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::InvalidTemplateId(id) => write!(f, "invalid options template id {id}"),
            Self::ScopeFieldSpecifierError(e) => write!(f, "{e}"),
            Self::FieldSpecifierError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OptionsTemplateRecordParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_) | Self::InvalidTemplateId(_) => None,
            Self::ScopeFieldSpecifierError(err) => Some(err),
            Self::FieldSpecifierError(err) => Some(err),
        }
    }
}

impl WireError for OptionsTemplateRecordParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::InvalidTemplateId(_) => false,
            Self::ScopeFieldSpecifierError(err) => err.is_truncation(),
            Self::FieldSpecifierError(err) => err.is_truncation(),
        }
    }
}

/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Template ID           |      Option Scope Length      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Option Length          |       Scope 1 Field Type      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Scope 1 Field Length      |               ...             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Unlike IPFIX, the scope and option lengths are in octets.
impl<'a>
    ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedOptionsTemplateRecordParsingError<'a>>
    for OptionsTemplateRecord
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedOptionsTemplateRecordParsingError<'a>> {
        let input = buf;
        let (buf, template_id) = be_u16(buf)?;
        if template_id < DATA_SET_MIN_ID {
            return Err(nom::Err::Error(
                LocatedOptionsTemplateRecordParsingError::new(
                    input,
                    OptionsTemplateRecordParsingError::InvalidTemplateId(template_id),
                ),
            ));
        }
        let (buf, options_scope_length) = be_u16(buf)?;
        let (buf, options_length) = be_u16(buf)?;
        let (buf, options_scope_buf) = nom::bytes::complete::take(options_scope_length)(buf)?;
        let (buf, options_buf) = nom::bytes::complete::take(options_length)(buf)?;
        let (_, scope_fields): (_, Vec<ScopeFieldSpecifier>) =
            parse_till_empty_into_located(options_scope_buf)?;
        let (_, fields): (_, Vec<FieldSpecifier>) = parse_till_empty_into_located(options_buf)?;
        let record = OptionsTemplateRecord::new(
            template_id,
            scope_fields.into_boxed_slice(),
            fields.into_boxed_slice(),
        );
        ctx.templates().put(
            ctx.template_key(template_id),
            DecodingTemplate::from(&record),
        );
        Ok((buf, record))
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum ScopeFieldSpecifierParsingError {
    NomError(#[from_nom] ErrorKind),
}

impl std::fmt::Display for ScopeFieldSpecifierParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
        }
    }
}

impl std::error::Error for ScopeFieldSpecifierParsingError {}

impl WireError for ScopeFieldSpecifierParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

impl<'a> ReadablePdu<'a, LocatedScopeFieldSpecifierParsingError<'a>> for ScopeFieldSpecifier {
    fn from_wire(
        buf: Span<'a>,
    ) -> IResult<Span<'a>, Self, LocatedScopeFieldSpecifierParsingError<'a>> {
        let (buf, code) = be_u16(buf)?;
        let (buf, length) = be_u16(buf)?;
        Ok((buf, ScopeFieldSpecifier::new(ScopeIE::from((0, code)), length)))
    }
}
