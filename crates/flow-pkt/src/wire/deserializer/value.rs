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

//! Decoding of the fields of a Data Record, including the structured data
//! types of RFC 6313.

use std::sync::Arc;

use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u8},
    IResult,
};

use crate::{
    error::DecodeError,
    registry::FieldParser,
    template::DecodingTemplate,
    value::{Value, ValueData, ValueError, ValueKind},
    wire::deserializer::{
        DataRecordParsingError, DecodingContext, FieldSpecifierParsingError,
        LocatedDataRecordParsingError, LocatedFieldSpecifierParsingError, WireError,
        MAX_LIST_DEPTH,
    },
    DataRecord, FieldSpecifier, DATA_SET_MIN_ID,
};
use telemetryd_parse_utils::{
    parse_into_located, parse_into_located_two_inputs, ReadablePduWithTwoInputs, Span,
};
use telemetryd_serde_macros::LocatedError;

/// Variable length fields whose length doesn't fit in one octet use 255 then
/// a 2-octets length
const LONG_VARIABLE_LENGTH: u8 = 255;

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum FieldParsingError {
    NomError(#[from_nom] ErrorKind),
}

impl std::fmt::Display for FieldParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
        }
    }
}

impl std::error::Error for FieldParsingError {}

impl WireError for FieldParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

/// Decode one field as described by its field specifier.
///
/// Only running out of bytes fails the field. Content its kind rejects is
/// kept as raw octets and reported as a diagnostic.
impl<'a>
    ReadablePduWithTwoInputs<'a, &FieldSpecifier, &DecodingContext<'_>, LocatedFieldParsingError<'a>>
    for Value
{
    fn from_wire(
        buf: Span<'a>,
        spec: &FieldSpecifier,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedFieldParsingError<'a>> {
        let (buf, length) = if spec.is_variable_length() {
            variable_length(buf)?
        } else {
            (buf, spec.length())
        };
        let (buf, content) = nom::bytes::complete::take(length)(buf)?;
        let parser = ctx
            .registry()
            .resolve(spec.enterprise_number(), spec.element_id());
        let value = if parser.kind().is_list() {
            decode_list(content, &parser, ctx)
        } else {
            let (value, err) = parser.parse_or_raw(content.fragment());
            if let Some(err) = err {
                ctx.report(value_diagnostic(
                    ctx,
                    parser.name(),
                    content.location_offset(),
                    err,
                ));
            }
            value
        };
        Ok((buf, value))
    }
}

#[inline]
fn variable_length(buf: Span<'_>) -> IResult<Span<'_>, u16, LocatedFieldParsingError<'_>> {
    let (buf, length) = be_u8(buf)?;
    if length == LONG_VARIABLE_LENGTH {
        be_u16(buf)
    } else {
        Ok((buf, length as u16))
    }
}

fn value_diagnostic(
    ctx: &DecodingContext<'_>,
    field: &str,
    offset: usize,
    err: ValueError,
) -> DecodeError {
    match err {
        ValueError::InvalidLength {
            length, min, max, ..
        } => DecodeError::FieldLength {
            field: field.to_string(),
            length,
            min,
            max,
        },
        err => ctx.invalid(offset, field, err.to_string()),
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum ListParsingError {
    NomError(#[from_nom] ErrorKind),
    InvalidTemplateId(u16),
    NoTemplateDefinedFor(u16),
    InvalidLength(u16),
    ElementError(#[from_located] FieldParsingError),
    FieldSpecifierError(#[from_located] FieldSpecifierParsingError),
    RecordError(#[from_located] DataRecordParsingError),
}

impl std::fmt::Display for ListParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::InvalidTemplateId(id) => write!(f, "invalid template id {id}"),
            Self::NoTemplateDefinedFor(id) => write!(f, "no template defined for id {id}"),
            Self::InvalidLength(length) => write!(f, "invalid list block length {length}"),
            Self::ElementError(e) => write!(f, "{e}"),
            Self::FieldSpecifierError(e) => write!(f, "{e}"),
            Self::RecordError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ListParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_)
            | Self::InvalidTemplateId(_)
            | Self::NoTemplateDefinedFor(_)
            | Self::InvalidLength(_) => None,
            Self::ElementError(err) => Some(err),
            Self::FieldSpecifierError(err) => Some(err),
            Self::RecordError(err) => Some(err),
        }
    }
}

impl WireError for ListParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::InvalidTemplateId(_) | Self::NoTemplateDefinedFor(_) | Self::InvalidLength(_) => {
                false
            }
            Self::ElementError(err) => err.is_truncation(),
            Self::FieldSpecifierError(err) => err.is_truncation(),
            Self::RecordError(err) => err.is_truncation(),
        }
    }

    fn missing_template(&self) -> Option<u16> {
        match self {
            Self::NoTemplateDefinedFor(id) => Some(*id),
            _ => None,
        }
    }
}

/// A list that can't be understood is kept as the raw octets of the field
fn decode_list(content: Span<'_>, parser: &FieldParser, ctx: &DecodingContext<'_>) -> Value {
    let offset = content.location_offset();
    if !ctx.enter_list() {
        ctx.report(ctx.invalid(
            offset,
            parser.name(),
            format!("lists nested deeper than {MAX_LIST_DEPTH} levels"),
        ));
        return parser.named(ValueData::OctetArray(content.to_vec()));
    }
    let parsed = match parser.kind() {
        ValueKind::BasicList => basic_list(content, ctx),
        ValueKind::SubTemplateList => sub_template_list(content, ctx),
        _ => sub_template_multi_list(content, ctx),
    };
    ctx.leave_list();
    match parsed {
        Ok((_, data)) => parser.named(data),
        Err(err) => {
            ctx.report_nom_error(parser.name(), offset, err);
            parser.named(ValueData::OctetArray(content.to_vec()))
        }
    }
}

/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Semantic   |1|         Field ID            |   Element...  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ...Length     |               Enterprise Number ...           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      ...      |              basicList Content ...            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
fn basic_list<'a>(
    buf: Span<'a>,
    ctx: &DecodingContext<'_>,
) -> IResult<Span<'a>, ValueData, LocatedListParsingError<'a>> {
    let (buf, _semantic) = be_u8(buf)?;
    let (mut buf, element): (_, FieldSpecifier) = parse_into_located(buf)?;
    let mut elements = Vec::new();
    while !buf.is_empty() {
        let (t, value): (_, Value) = parse_into_located_two_inputs(buf, &element, ctx)?;
        if t.len() == buf.len() {
            break;
        }
        buf = t;
        elements.push(value);
    }
    Ok((buf, ValueData::BasicList(elements)))
}

/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Semantic    |         Template ID           |     ...       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                subTemplateList Content    ...                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
fn sub_template_list<'a>(
    buf: Span<'a>,
    ctx: &DecodingContext<'_>,
) -> IResult<Span<'a>, ValueData, LocatedListParsingError<'a>> {
    let (buf, _semantic) = be_u8(buf)?;
    let input = buf;
    let (buf, template_id) = be_u16(buf)?;
    let template = list_template(input, template_id, ctx)?;
    let (buf, records) = list_records(buf, &template, ctx)?;
    Ok((buf, ValueData::SubTemplateList(records)))
}

/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Semantic    |         Template ID X         |Data Records...|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ... Length X  |     Data Record X.1 Content ...               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
fn sub_template_multi_list<'a>(
    buf: Span<'a>,
    ctx: &DecodingContext<'_>,
) -> IResult<Span<'a>, ValueData, LocatedListParsingError<'a>> {
    let (mut buf, _semantic) = be_u8(buf)?;
    let mut records = Vec::new();
    while !buf.is_empty() {
        let input = buf;
        let (t, template_id) = be_u16(buf)?;
        let (t, length) = be_u16(t)?;
        if length < 4 {
            return Err(nom::Err::Error(LocatedListParsingError::new(
                input,
                ListParsingError::InvalidLength(length),
            )));
        }
        let (t, block) = nom::bytes::complete::take(length - 4)(t)?;
        let template = list_template(input, template_id, ctx)?;
        let (_, block_records) = list_records(block, &template, ctx)?;
        records.extend(block_records);
        buf = t;
    }
    Ok((buf, ValueData::SubTemplateMultiList(records)))
}

fn list_template<'a>(
    input: Span<'a>,
    template_id: u16,
    ctx: &DecodingContext<'_>,
) -> Result<Arc<DecodingTemplate>, nom::Err<LocatedListParsingError<'a>>> {
    if template_id < DATA_SET_MIN_ID {
        return Err(nom::Err::Error(LocatedListParsingError::new(
            input,
            ListParsingError::InvalidTemplateId(template_id),
        )));
    }
    ctx.templates()
        .get(&ctx.template_key(template_id))
        .ok_or_else(|| {
            nom::Err::Error(LocatedListParsingError::new(
                input,
                ListParsingError::NoTemplateDefinedFor(template_id),
            ))
        })
}

fn list_records<'a>(
    buf: Span<'a>,
    template: &DecodingTemplate,
    ctx: &DecodingContext<'_>,
) -> IResult<Span<'a>, Vec<Vec<Value>>, LocatedListParsingError<'a>> {
    let min_record_length = template.min_record_length().max(1);
    let mut buf = buf;
    let mut records = Vec::new();
    while buf.len() >= min_record_length {
        let (t, record): (_, DataRecord) = parse_into_located_two_inputs(buf, template, ctx)?;
        if t.len() == buf.len() {
            break;
        }
        buf = t;
        records.push(record.into_values());
    }
    Ok((buf, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::FlowProtocol,
        registry::FieldParserRegistry,
        template::{TemplateCache, TemplateKey},
    };
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    fn exporter() -> SocketAddr {
        SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 4739)
    }

    fn parse<'a>(
        buf: &'a [u8],
        spec: FieldSpecifier,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Value, LocatedFieldParsingError<'a>> {
        Value::from_wire(Span::new(buf), &spec, ctx)
    }

    #[test]
    fn test_fixed_and_variable_length() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);

        let (rest, value) = parse(&[0x00, 0x00, 0x01, 0x00], FieldSpecifier::new(0, 1, 4), &ctx)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            value,
            Value::new("octetDeltaCount", ValueData::Unsigned64(256))
        );

        let (rest, value) = parse(
            &[0x03, b'e', b't', b'h', 0xff],
            FieldSpecifier::new(0, 82, FieldSpecifier::VARIABLE_LENGTH),
            &ctx,
        )
        .unwrap();
        assert_eq!(rest.fragment(), &[0xff]);
        assert_eq!(
            value,
            Value::new("interfaceName", ValueData::String("eth".to_string()))
        );

        let (rest, value) = parse(
            &[0xff, 0x00, 0x02, b'g', b'i'],
            FieldSpecifier::new(0, 82, FieldSpecifier::VARIABLE_LENGTH),
            &ctx,
        )
        .unwrap();
        assert!(rest.is_empty());
        assert_eq!(value.to_string(), "gi");
        assert!(ctx.into_diagnostics().is_empty());
    }

    #[test]
    fn test_invalid_length_falls_back_to_raw() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let (_, value) = parse(&[10, 0, 0], FieldSpecifier::new(0, 8, 3), &ctx).unwrap();
        assert_eq!(
            value,
            Value::new("sourceIPv4Address", ValueData::OctetArray(vec![10, 0, 0]))
        );
        assert_eq!(
            ctx.into_diagnostics(),
            vec![DecodeError::FieldLength {
                field: "sourceIPv4Address".to_string(),
                length: 3,
                min: 4,
                max: 4,
            }]
        );
    }

    #[test]
    fn test_unknown_element_is_raw() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let (_, value) = parse(&[0xde, 0xad], FieldSpecifier::new(29305, 1, 2), &ctx).unwrap();
        assert_eq!(
            value,
            Value::new("unknown_29305_1", ValueData::OctetArray(vec![0xde, 0xad]))
        );
        assert!(ctx.into_diagnostics().is_empty());
    }

    #[test]
    fn test_truncated_field() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let buf = [10, 0, 0];
        let err = parse(&buf, FieldSpecifier::new(0, 8, 4), &ctx).unwrap_err();
        match err {
            nom::Err::Error(err) => {
                assert_eq!(err.location_offset(), 0);
                assert!(telemetryd_parse_utils::LocatedParsingError::error(&err).is_truncation());
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn test_basic_list() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let buf = [
            0x09, // variable length
            0x03, // allOf
            0x00, 0x07, // sourceTransportPort
            0x00, 0x02, // element length
            0x00, 0x50, 0x01, 0xbb,
        ];
        let (rest, value) = parse(
            &buf,
            FieldSpecifier::new(0, 291, FieldSpecifier::VARIABLE_LENGTH),
            &ctx,
        )
        .unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            value,
            Value::new(
                "basicList",
                ValueData::BasicList(vec![
                    Value::new("sourceTransportPort", ValueData::Unsigned16(80)),
                    Value::new("sourceTransportPort", ValueData::Unsigned16(443)),
                ])
            )
        );
        assert_eq!(value.to_string(), "[80, 443]");
    }

    #[test]
    fn test_sub_template_list() {
        let templates = TemplateCache::default();
        templates.put(
            TemplateKey::new(exporter(), 0, 300),
            DecodingTemplate::new(
                Box::new([]),
                Box::new([FieldSpecifier::new(0, 8, 4), FieldSpecifier::new(0, 11, 2)]),
            ),
        );
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let buf = [
            0x0f, // variable length
            0xff, // undefined semantic
            0x01, 0x2c, // template 300
            10, 0, 0, 1, 0x00, 0x50, // first record
            10, 0, 0, 2, 0x01, 0xbb, // second record
        ];
        let (rest, value) = parse(
            &buf,
            FieldSpecifier::new(0, 292, FieldSpecifier::VARIABLE_LENGTH),
            &ctx,
        )
        .unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            value.data(),
            &ValueData::SubTemplateList(vec![
                vec![
                    Value::new(
                        "sourceIPv4Address",
                        ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1))
                    ),
                    Value::new("destinationTransportPort", ValueData::Unsigned16(80)),
                ],
                vec![
                    Value::new(
                        "sourceIPv4Address",
                        ValueData::Ipv4Address(Ipv4Addr::new(10, 0, 0, 2))
                    ),
                    Value::new("destinationTransportPort", ValueData::Unsigned16(443)),
                ],
            ])
        );
        assert!(ctx.into_diagnostics().is_empty());
    }

    #[test]
    fn test_sub_template_multi_list() {
        let templates = TemplateCache::default();
        templates.put(
            TemplateKey::new(exporter(), 0, 300),
            DecodingTemplate::new(Box::new([]), Box::new([FieldSpecifier::new(0, 4, 1)])),
        );
        templates.put(
            TemplateKey::new(exporter(), 0, 301),
            DecodingTemplate::new(Box::new([]), Box::new([FieldSpecifier::new(0, 11, 2)])),
        );
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let buf = [
            0x01, // noneOf
            0x01, 0x2c, 0x00, 0x06, 0x06, 0x11, // template 300, two records
            0x01, 0x2d, 0x00, 0x06, 0x00, 0x35, // template 301, one record
        ];
        let (rest, value) = parse(&buf, FieldSpecifier::new(0, 293, 13), &ctx).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            value.data(),
            &ValueData::SubTemplateMultiList(vec![
                vec![Value::new("protocolIdentifier", ValueData::Unsigned8(6))],
                vec![Value::new("protocolIdentifier", ValueData::Unsigned8(17))],
                vec![Value::new("destinationTransportPort", ValueData::Unsigned16(53))],
            ])
        );
    }

    #[test]
    fn test_list_without_template_is_raw() {
        let templates = TemplateCache::default();
        let registry = FieldParserRegistry::iana();
        let ctx = DecodingContext::new(FlowProtocol::Ipfix, exporter(), &templates, &registry);
        let buf = [0xff, 0x01, 0x2c, 0x01, 0x02];
        let (_, value) = parse(&buf, FieldSpecifier::new(0, 292, 5), &ctx).unwrap();
        assert_eq!(
            value,
            Value::new("subTemplateList", ValueData::OctetArray(buf.to_vec()))
        );
        assert_eq!(
            ctx.into_diagnostics(),
            vec![DecodeError::TemplateNotFound {
                exporter: exporter(),
                observation_domain_id: 0,
                template_id: 300,
            }]
        );
    }
}
