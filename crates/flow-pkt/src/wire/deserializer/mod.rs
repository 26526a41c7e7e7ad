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

use std::{
    cell::{Cell, RefCell},
    net::SocketAddr,
};

use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u32},
    IResult, InputTake,
};
use tracing::debug;

use crate::{
    error::DecodeError,
    netflow::ScopeIE,
    record::FlowProtocol,
    registry::{FieldParser, FieldParserRegistry},
    template::{DecodingTemplate, TemplateCache, TemplateKey},
    value::{Value, ValueKind},
    DataRecord, FieldSpecifier,
};
use telemetryd_parse_utils::{
    parse_into_located_two_inputs, LocatedParsingError, ReadablePdu, ReadablePduWithTwoInputs,
    Span,
};
use telemetryd_serde_macros::LocatedError;

pub use value::{FieldParsingError, LocatedFieldParsingError};

pub mod ipfix;
pub mod netflow;
pub mod sflow;
pub mod value;

/// 2-octets set id, 2-octets set length
pub const SET_HEADER_LENGTH: u16 = 4;

/// How deep structured data (RFC 6313) lists may nest
pub const MAX_LIST_DEPTH: u8 = 8;

/// Everything a datagram is decoded against: the exporter it came from, the
/// templates learned so far and the field parsers. It also collects the
/// diagnostics of the parts that had to be skipped.
///
/// A context lives for the decoding of one datagram.
#[derive(Debug)]
pub struct DecodingContext<'c> {
    protocol: FlowProtocol,
    exporter: SocketAddr,
    templates: &'c TemplateCache,
    registry: &'c FieldParserRegistry,
    observation_domain_id: Cell<u32>,
    depth: Cell<u8>,
    diagnostics: RefCell<Vec<DecodeError>>,
}

impl<'c> DecodingContext<'c> {
    pub fn new(
        protocol: FlowProtocol,
        exporter: SocketAddr,
        templates: &'c TemplateCache,
        registry: &'c FieldParserRegistry,
    ) -> Self {
        Self {
            protocol,
            exporter,
            templates,
            registry,
            observation_domain_id: Cell::new(0),
            depth: Cell::new(0),
            diagnostics: RefCell::new(vec![]),
        }
    }

    pub const fn protocol(&self) -> FlowProtocol {
        self.protocol
    }

    pub const fn exporter(&self) -> SocketAddr {
        self.exporter
    }

    pub const fn templates(&self) -> &'c TemplateCache {
        self.templates
    }

    pub const fn registry(&self) -> &'c FieldParserRegistry {
        self.registry
    }

    /// Observation domain (IPFIX) or source id (NetFlow v9) of the message
    /// being decoded
    pub fn observation_domain_id(&self) -> u32 {
        self.observation_domain_id.get()
    }

    pub(crate) fn set_observation_domain_id(&self, observation_domain_id: u32) {
        self.observation_domain_id.set(observation_domain_id);
    }

    pub fn template_key(&self, template_id: u16) -> TemplateKey {
        TemplateKey::new(self.exporter, self.observation_domain_id(), template_id)
    }

    pub fn report(&self, diagnostic: DecodeError) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Diagnostics reported so far
    pub fn diagnostics(&self) -> Vec<DecodeError> {
        self.diagnostics.borrow().clone()
    }

    pub(crate) fn diagnostics_mark(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Forget what was reported about the records of a Set that is dropped
    /// as a whole
    pub(crate) fn discard_diagnostics_since(&self, mark: usize) {
        self.diagnostics.borrow_mut().truncate(mark);
    }

    pub fn into_diagnostics(self) -> Vec<DecodeError> {
        self.diagnostics.into_inner()
    }

    pub(crate) fn truncated(&self, offset: usize, context: impl Into<String>) -> DecodeError {
        DecodeError::TruncatedPacket {
            protocol: self.protocol,
            offset,
            context: context.into(),
        }
    }

    pub(crate) fn invalid(
        &self,
        offset: usize,
        structure: impl Into<String>,
        reason: impl Into<String>,
    ) -> DecodeError {
        DecodeError::InvalidPacket {
            protocol: self.protocol,
            structure: structure.into(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn template_not_found(&self, template_id: u16) -> DecodeError {
        DecodeError::TemplateNotFound {
            exporter: self.exporter,
            observation_domain_id: self.observation_domain_id(),
            template_id,
        }
    }

    /// Turn the error that made a structure unreadable into a diagnostic.
    /// `offset` is where the structure starts, used when the error carries no
    /// location.
    pub(crate) fn classify_nom_error<'a, L>(
        &self,
        structure: &str,
        offset: usize,
        err: nom::Err<L>,
    ) -> DecodeError
    where
        L: LocatedParsingError<Span = Span<'a>>,
        L::Error: WireError,
    {
        match err {
            nom::Err::Incomplete(_) => self.truncated(offset, structure),
            nom::Err::Error(err) | nom::Err::Failure(err) => {
                let offset = err.span().location_offset();
                let error = err.error();
                if let Some(template_id) = error.missing_template() {
                    self.template_not_found(template_id)
                } else if error.is_truncation() {
                    self.truncated(offset, structure)
                } else {
                    self.invalid(offset, structure, error.to_string())
                }
            }
        }
    }

    /// Classify and report the error of a structure that is skipped
    pub(crate) fn report_nom_error<'a, L>(&self, structure: &str, offset: usize, err: nom::Err<L>)
    where
        L: LocatedParsingError<Span = Span<'a>>,
        L::Error: WireError,
    {
        let diagnostic = self.classify_nom_error(structure, offset, err);
        debug!(
            exporter = %self.exporter,
            protocol = %self.protocol,
            structure,
            %diagnostic,
            "skipping undecodable structure"
        );
        self.report(diagnostic);
    }

    /// Track the nesting of structured data, `false` once it is too deep
    pub(crate) fn enter_list(&self) -> bool {
        let depth = self.depth.get();
        if depth >= MAX_LIST_DEPTH {
            return false;
        }
        self.depth.set(depth + 1);
        true
    }

    pub(crate) fn leave_list(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Wire errors as seen at the Set or Sample boundary where they are turned
/// into [`DecodeError`] diagnostics.
pub trait WireError: std::error::Error {
    /// The structure ran out of bytes
    fn is_truncation(&self) -> bool;

    /// A Data Set refers to a template that wasn't learned (yet)
    fn missing_template(&self) -> Option<u16> {
        None
    }
}

/// Isolate the next Set by its declared length. `None` ends the decoding of
/// the message, the reason is already reported.
pub(crate) fn next_set<'a>(
    buf: Span<'a>,
    ctx: &DecodingContext<'_>,
) -> Option<(Span<'a>, Span<'a>)> {
    let offset = buf.location_offset();
    let (Some(id), Some(length)) = (buf.peek_be_u16(0), buf.peek_be_u16(2)) else {
        ctx.report(ctx.truncated(offset, "set header"));
        return None;
    };
    if length < SET_HEADER_LENGTH {
        ctx.report(ctx.invalid(
            offset,
            "set header",
            format!("set {id} declares length {length}, shorter than its header"),
        ));
        return None;
    }
    if length as usize > buf.len() {
        ctx.report(ctx.truncated(offset, format!("set {id}")));
        return None;
    }
    Some(buf.take_split(length as usize))
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum FieldSpecifierParsingError {
    NomError(#[from_nom] ErrorKind),
}

impl std::fmt::Display for FieldSpecifierParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
        }
    }
}

impl std::error::Error for FieldSpecifierParsingError {}

impl WireError for FieldSpecifierParsingError {
    fn is_truncation(&self) -> bool {
        matches!(self, Self::NomError(ErrorKind::Eof))
    }
}

impl<'a> ReadablePdu<'a, LocatedFieldSpecifierParsingError<'a>> for FieldSpecifier {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedFieldSpecifierParsingError<'a>> {
        let (buf, code) = be_u16(buf)?;
        let is_enterprise = code & 0x8000u16 != 0;
        let (buf, length) = be_u16(buf)?;
        let (buf, pen) = if is_enterprise {
            be_u32(buf)?
        } else {
            (buf, 0)
        };
        Ok((buf, FieldSpecifier::new(pen, code, length)))
    }
}

#[derive(LocatedError, Eq, PartialEq, Clone, Debug)]
pub enum DataRecordParsingError {
    NomError(#[from_nom] ErrorKind),
    FieldError(#[from_located] FieldParsingError),
}

impl std::fmt::Display for DataRecordParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NomError(e) => write!(f, "{}", nom::Err::Error(e)),
            Self::FieldError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DataRecordParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NomError(_) => None,
            Self::FieldError(err) => Some(err),
        }
    }
}

impl WireError for DataRecordParsingError {
    fn is_truncation(&self) -> bool {
        match self {
            Self::NomError(kind) => *kind == ErrorKind::Eof,
            Self::FieldError(err) => err.is_truncation(),
        }
    }
}

impl<'a>
    ReadablePduWithTwoInputs<
        'a,
        &DecodingTemplate,
        &DecodingContext<'_>,
        LocatedDataRecordParsingError<'a>,
    > for DataRecord
{
    fn from_wire(
        buf: Span<'a>,
        template: &DecodingTemplate,
        ctx: &DecodingContext<'_>,
    ) -> IResult<Span<'a>, Self, LocatedDataRecordParsingError<'a>> {
        let mut buf = buf;
        let mut scope_fields = Vec::with_capacity(template.scope_fields().len());
        for spec in template.scope_fields() {
            let (t, value) = if ctx.protocol() == FlowProtocol::NetFlowV9 {
                netflow_scope_field(buf, spec)?
            } else {
                parse_into_located_two_inputs(buf, spec, ctx)?
            };
            buf = t;
            scope_fields.push(value);
        }
        let mut fields = Vec::with_capacity(template.fields().len());
        for spec in template.fields() {
            let (t, value) = parse_into_located_two_inputs(buf, spec, ctx)?;
            buf = t;
            fields.push(value);
        }
        Ok((
            buf,
            DataRecord::new(scope_fields.into_boxed_slice(), fields.into_boxed_slice()),
        ))
    }
}

/// NetFlow v9 scope fields identify the system, interface, line card, cache
/// or template the options apply to. They are decoded as unsigned values.
fn netflow_scope_field<'a>(
    buf: Span<'a>,
    spec: &FieldSpecifier,
) -> IResult<Span<'a>, Value, LocatedDataRecordParsingError<'a>> {
    let (buf, content) = nom::bytes::complete::take(spec.length())(buf)?;
    let kind = match spec.length() {
        1..=4 => ValueKind::Unsigned32,
        5..=8 => ValueKind::Unsigned64,
        _ => ValueKind::OctetArray,
    };
    let scope = ScopeIE::from((spec.enterprise_number(), spec.element_id()));
    let (value, _) = FieldParser::new(scope.name(), kind).parse_or_raw(content.fragment());
    Ok((buf, value))
}

/// Repeat the template over a Data Set body. What is left once less than a
/// minimal record remains is padding.
pub(crate) fn parse_data_records<'a>(
    buf: Span<'a>,
    template: &DecodingTemplate,
    ctx: &DecodingContext<'_>,
) -> IResult<Span<'a>, Vec<DataRecord>, LocatedDataRecordParsingError<'a>> {
    let min_record_length = template.min_record_length().max(1);
    let mut buf = buf;
    let mut records = Vec::new();
    while buf.len() >= min_record_length {
        let (t, record) = DataRecord::from_wire(buf, template, ctx)?;
        if t.len() == buf.len() {
            break;
        }
        buf = t;
        records.push(record);
    }
    Ok((buf, records))
}
