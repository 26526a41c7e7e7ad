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

use crate::{
    ipfix::*,
    template::DecodingTemplate,
    wire::deserializer::{
        next_set, parse_data_records, DataRecordParsingError, DecodingContext,
        FieldSpecifierParsingError, LocatedDataRecordParsingError,
        LocatedFieldSpecifierParsingError, WireError, SET_HEADER_LENGTH,
    },
    DataSetId, FieldSpecifier, DATA_SET_MIN_ID,
};
use telemetryd_parse_utils::{
    parse_into_located, parse_into_located_one_input, ReadablePduWithOneInput, Span,
};
use telemetryd_serde_macros::LocatedError;

/// 2-octets version, 2-octets length, 4-octets * 3 (export time, seq no,
/// observation domain id)
pub const IPFIX_HEADER_LENGTH: u16 = 16;

/// 2-octets template id, 2-octets field count
const TEMPLATE_RECORD_HEADER_LENGTH: usize = 4;

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum IpfixPacketParsingError {
    NomError(#[from_nom] ErrorKind),
    UnsupportedVersion(u16),
    InvalidLength(u16),
    InvalidExportTime(u32),
}

impl std::fmt::Display for IpfixPacketParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported IPFIX version {version}")
            }
            Self::InvalidLength(length) => write!(f, "invalid IPFIX message length {length}"),
            Self::InvalidExportTime(time) => write!(f, "invalid IPFIX export time {time}"),
        }
    }
}

impl std::error::Error for IpfixPacketParsingError {}

impl WireError for IpfixPacketParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

/// Decode an IPFIX message.
///
/// Only a malformed message header fails the whole message. Every Set is
/// isolated by its length, a Set that can't be decoded is reported in the
/// context diagnostics and skipped.
impl<'a> ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedIpfixPacketParsingError<'a>>
    for IpfixPacket
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedIpfixPacketParsingError<'a>> {
        let input = buf;
        let (buf, version) = be_u16(buf)?;
        if version != IPFIX_VERSION {
            return Err(nom::Err::Error(LocatedIpfixPacketParsingError::new(
                input,
                IpfixPacketParsingError::UnsupportedVersion(version),
            )));
        }
        let input = buf;
        let (buf, length) = be_u16(buf)?;
        if length < IPFIX_HEADER_LENGTH {
            return Err(nom::Err::Error(LocatedIpfixPacketParsingError::new(
                input,
                IpfixPacketParsingError::InvalidLength(length),
            )));
        }
        let (remainder, buf) = nom::bytes::complete::take(length - 4)(buf)?;
        let input = buf;
        let (buf, export_time) = be_u32(buf)?;
        let export_time = match Utc.timestamp_opt(export_time as i64, 0) {
            LocalResult::Single(time) => time,
            _ => {
                return Err(nom::Err::Error(LocatedIpfixPacketParsingError::new(
                    input,
                    IpfixPacketParsingError::InvalidExportTime(export_time),
                )));
            }
        };
        let (buf, sequence_number) = be_u32(buf)?;
        let (mut buf, observation_domain_id) = be_u32(buf)?;
        ctx.set_observation_domain_id(observation_domain_id);

        let mut sets = Vec::new();
        while !buf.is_empty() {
            let Some((rest, set_buf)) = next_set(buf, ctx) else {
                break;
            };
            buf = rest;
            let mark = ctx.diagnostics_mark();
            match Set::from_wire(set_buf, ctx) {
                Ok((_, set)) => sets.push(set),
                Err(err) => {
                    ctx.discard_diagnostics_since(mark);
                    ctx.report_nom_error("set", set_buf.location_offset(), err);
                }
            }
        }
        Ok((
            remainder,
            IpfixPacket::new(export_time, sequence_number, observation_domain_id, sets),
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
            Self::InvalidLength(length) => write!(f, "invalid set length {length}"),
            Self::InvalidSetId(id) => write!(f, "invalid set id {id}"),
            Self::NoTemplateDefinedFor(id) => write!(f, "no template defined for set id {id}"),
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
            IPFIX_TEMPLATE_SET_ID => {
                let mut templates = Vec::new();
                while buf.len() >= TEMPLATE_RECORD_HEADER_LENGTH {
                    let (t, template): (_, TemplateRecord) =
                        parse_into_located_one_input(buf, ctx)?;
                    buf = t;
                    templates.push(template);
                }
                Set::Template(templates.into_boxed_slice())
            }
            IPFIX_OPTIONS_TEMPLATE_SET_ID => {
                let mut option_templates = Vec::new();
                // Anything shorter than a withdrawal record is padding
                while buf.len() >= TEMPLATE_RECORD_HEADER_LENGTH {
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

/// Template records are learned (or withdrawn) as soon as they are read, so
/// the Data Sets that follow in the same message can use them.
impl<'a> ReadablePduWithOneInput<'a, &DecodingContext<'_>, LocatedTemplateRecordParsingError<'a>>
    for TemplateRecord
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedTemplateRecordParsingError<'a>> {
        let input = buf;
        let (buf, template_id) = be_u16(buf)?;
        let (mut buf, field_count) = be_u16(buf)?;
        // RFC 7011 section 8.1: withdraws all the (non options) templates
        if field_count == 0 && template_id == IPFIX_TEMPLATE_SET_ID {
            ctx.templates()
                .remove_domain(ctx.exporter(), ctx.observation_domain_id(), false);
            return Ok((buf, TemplateRecord::new(template_id, Box::new([]))));
        }
        // from RFC7011: Each Template Record is given a unique Template ID in the range
        // 256 to 65535.
        if template_id < DATA_SET_MIN_ID {
            return Err(nom::Err::Error(LocatedTemplateRecordParsingError::new(
                input,
                TemplateRecordParsingError::InvalidTemplateId(template_id),
            )));
        }
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
    /// Scope fields count must be at least one and at most the total fields
    /// count
    InvalidScopeFieldsCount(u16),
    FieldError(#[from_located] FieldSpecifierParsingError),
}

impl std::fmt::Display for OptionsTemplateRecordParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::InvalidTemplateId(id) => write!(f, "invalid options template id {id}"),
            Self::InvalidScopeFieldsCount(count) => {
                write!(f, "invalid options template scope fields count {count}")
            }
            Self::FieldError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OptionsTemplateRecordParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_) | Self::InvalidTemplateId(_) | Self::InvalidScopeFieldsCount(_) => {
                None
            }
            Self::FieldError(err) => Some(err),
        }
    }
}

impl WireError for OptionsTemplateRecordParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::InvalidTemplateId(_) | Self::InvalidScopeFieldsCount(_) => false,
            Self::FieldError(err) => err.is_truncation(),
        }
    }
}

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
        let (buf, total_fields_count) = be_u16(buf)?;
        if total_fields_count == 0 && template_id == IPFIX_OPTIONS_TEMPLATE_SET_ID {
            ctx.templates()
                .remove_domain(ctx.exporter(), ctx.observation_domain_id(), true);
            return Ok((
                buf,
                OptionsTemplateRecord::new(template_id, Box::new([]), Box::new([])),
            ));
        }
        if template_id < DATA_SET_MIN_ID {
            return Err(nom::Err::Error(
                LocatedOptionsTemplateRecordParsingError::new(
                    input,
                    OptionsTemplateRecordParsingError::InvalidTemplateId(template_id),
                ),
            ));
        }
        if total_fields_count == 0 {
            ctx.templates().remove(&ctx.template_key(template_id));
            return Ok((
                buf,
                OptionsTemplateRecord::new(template_id, Box::new([]), Box::new([])),
            ));
        }
        let input = buf;
        let (mut buf, scope_fields_count) = be_u16(buf)?;
        if scope_fields_count == 0 || scope_fields_count > total_fields_count {
            return Err(nom::Err::Error(
                LocatedOptionsTemplateRecordParsingError::new(
                    input,
                    OptionsTemplateRecordParsingError::InvalidScopeFieldsCount(scope_fields_count),
                ),
            ));
        }
        let mut scope_fields =
            Vec::with_capacity((scope_fields_count as usize).min(buf.len() / 4));
        for _ in 0..scope_fields_count {
            let (t, field): (_, FieldSpecifier) = parse_into_located(buf)?;
            scope_fields.push(field);
            buf = t;
        }
        let fields_count = total_fields_count - scope_fields_count;
        let mut fields = Vec::with_capacity((fields_count as usize).min(buf.len() / 4));
        for _ in 0..fields_count {
            let (t, field): (_, FieldSpecifier) = parse_into_located(buf)?;
            fields.push(field);
            buf = t;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::FlowProtocol, registry::FieldParserRegistry, template::TemplateCache};
    use nom::Slice;
    use std::net::{IpAddr, SocketAddr};
    use telemetryd_parse_utils::test_helpers::{
        test_parse_error_with_one_input, test_parsed_completely_with_one_input,
    };

    #[test]
    fn test_template_record() {
        let good_wire = [
            0x08, 0x01, 0x00, 0x02, 0x00, 0x1b, 0x00, 0x10, 0x00, 0x1c, 0x00, 0x10,
        ];
        let bad_template_id_wire = [
            0x00, 0x00, 0x00, 0x02, 0x00, 0x1b, 0x00, 0x10, 0x00, 0x1c, 0x00, 0x10,
        ];
        let good = TemplateRecord::new(
            2049,
            Box::new([FieldSpecifier::new(0, 27, 16), FieldSpecifier::new(0, 28, 16)]),
        );
        let bad_template_id = LocatedTemplateRecordParsingError::new(
            Span::new(&bad_template_id_wire),
            TemplateRecordParsingError::InvalidTemplateId(0),
        );

        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let exporter = SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 4739);
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter, &templates, &registry);
        test_parsed_completely_with_one_input(&good_wire, &ctx, &good);
        test_parse_error_with_one_input::<TemplateRecord, _, _>(
            &bad_template_id_wire,
            &ctx,
            &bad_template_id,
        );
        let template = templates.get(&ctx.template_key(2049)).unwrap();
        assert_eq!(template.fields(), good.field_specifiers());
        assert_eq!(template.min_record_length(), 32);
    }

    #[test]
    fn test_options_template_record_scope_count() {
        // 1 field in total but 2 scope fields
        let bad_wire = [0x01, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x0a, 0x00, 0x04];
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let exporter = SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 4739);
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter, &templates, &registry);
        test_parse_error_with_one_input::<OptionsTemplateRecord, _, _>(
            &bad_wire,
            &ctx,
            &LocatedOptionsTemplateRecordParsingError::new(
                Span::new(&bad_wire).slice(4..),
                OptionsTemplateRecordParsingError::InvalidScopeFieldsCount(2),
            ),
        );
        assert!(templates.is_empty());
    }
}
