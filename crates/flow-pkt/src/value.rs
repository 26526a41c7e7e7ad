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

//! Typed field values and the catalog of IPFIX abstract data types
//! ([RFC 7011 section 6.1](https://datatracker.ietf.org/doc/html/rfc7011#section-6.1)
//! and [RFC 6313](https://datatracker.ietf.org/doc/html/rfc6313)).
//!
//! Every [`ValueKind`] knows the range of encoded lengths it accepts and the
//! function that turns an exactly sized slice into a [`ValueData`].

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
};
use strum_macros::Display;

/// Seconds between the NTP era 0 epoch (1900-01-01) and the UNIX epoch.
pub(crate) const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// The largest length a field specifier can carry, also used as the variable
/// length marker.
pub const MAX_FIELD_LENGTH: u16 = u16::MAX;

#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum ValueKind {
    OctetArray,
    Unsigned8,
    Unsigned16,
    Unsigned32,
    Unsigned64,
    Signed8,
    Signed16,
    Signed32,
    Signed64,
    Float32,
    Float64,
    Boolean,
    MacAddress,
    String,
    DateTimeSeconds,
    DateTimeMilliseconds,
    DateTimeMicroseconds,
    DateTimeNanoseconds,
    Ipv4Address,
    Ipv6Address,
    BasicList,
    SubTemplateList,
    SubTemplateMultiList,
}

/// Turns an encoded slice, already checked against the kind's length bounds,
/// into a value.
pub type ParseFn = fn(&[u8]) -> Result<ValueData, ValueError>;

impl ValueKind {
    /// Smallest accepted encoded length in octets (inclusive).
    pub const fn min_length(&self) -> u16 {
        match self {
            Self::Unsigned8
            | Self::Unsigned16
            | Self::Unsigned32
            | Self::Unsigned64
            | Self::Signed8
            | Self::Signed16
            | Self::Signed32
            | Self::Signed64
            | Self::Boolean => 1,
            Self::Float32 | Self::Float64 => 4,
            Self::MacAddress => 6,
            Self::DateTimeSeconds | Self::Ipv4Address => 4,
            Self::DateTimeMilliseconds | Self::DateTimeMicroseconds | Self::DateTimeNanoseconds => 8,
            Self::Ipv6Address => 16,
            Self::OctetArray
            | Self::String
            | Self::BasicList
            | Self::SubTemplateList
            | Self::SubTemplateMultiList => 0,
        }
    }

    /// Largest accepted encoded length in octets (inclusive). Integers may use
    /// reduced-size encoding, so only the upper bound is their natural width.
    pub const fn max_length(&self) -> u16 {
        match self {
            Self::Unsigned8 | Self::Signed8 | Self::Boolean => 1,
            Self::Unsigned16 | Self::Signed16 => 2,
            Self::Unsigned32 | Self::Signed32 | Self::Float32 => 4,
            Self::Unsigned64 | Self::Signed64 | Self::Float64 => 8,
            Self::MacAddress => 6,
            Self::DateTimeSeconds | Self::Ipv4Address => 4,
            Self::DateTimeMilliseconds | Self::DateTimeMicroseconds | Self::DateTimeNanoseconds => 8,
            Self::Ipv6Address => 16,
            Self::OctetArray
            | Self::String
            | Self::BasicList
            | Self::SubTemplateList
            | Self::SubTemplateMultiList => MAX_FIELD_LENGTH,
        }
    }

    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            Self::BasicList | Self::SubTemplateList | Self::SubTemplateMultiList
        )
    }

    /// The parser function for this kind. List kinds need the template cache
    /// to be understood, out of that context they are read as raw octets.
    pub fn parse_fn(&self) -> ParseFn {
        match self {
            Self::OctetArray | Self::BasicList | Self::SubTemplateList | Self::SubTemplateMultiList => {
                parse_octets
            }
            Self::Unsigned8 => parse_unsigned8,
            Self::Unsigned16 => parse_unsigned16,
            Self::Unsigned32 => parse_unsigned32,
            Self::Unsigned64 => parse_unsigned64,
            Self::Signed8 => parse_signed8,
            Self::Signed16 => parse_signed16,
            Self::Signed32 => parse_signed32,
            Self::Signed64 => parse_signed64,
            Self::Float32 => parse_float32,
            Self::Float64 => parse_float64,
            Self::Boolean => parse_boolean,
            Self::MacAddress => parse_mac_address,
            Self::String => parse_string,
            Self::DateTimeSeconds => parse_date_time_seconds,
            Self::DateTimeMilliseconds => parse_date_time_milliseconds,
            Self::DateTimeMicroseconds => parse_date_time_microseconds,
            Self::DateTimeNanoseconds => parse_date_time_nanoseconds,
            Self::Ipv4Address => parse_ipv4_address,
            Self::Ipv6Address => parse_ipv6_address,
        }
    }

    /// Check the length bounds and parse `buf`.
    pub fn parse(&self, buf: &[u8]) -> Result<ValueData, ValueError> {
        self.check_length(buf.len())?;
        (self.parse_fn())(buf)
    }

    pub const fn check_length(&self, length: usize) -> Result<(), ValueError> {
        let min = self.min_length();
        let max = self.max_length();
        if length < min as usize || length > max as usize {
            return Err(ValueError::InvalidLength {
                kind: *self,
                length,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid length {length} for {kind}, expected between {min} and {max} octets")]
    InvalidLength {
        kind: ValueKind,
        length: usize,
        min: u16,
        max: u16,
    },
    #[error("invalid boolean value {0}, expected 1 (true) or 2 (false)")]
    InvalidBoolean(u8),
    #[error("timestamp is out of the representable range")]
    InvalidTimestamp,
}

/// EUI-48 hardware address
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueData {
    OctetArray(Vec<u8>),
    Unsigned8(u8),
    Unsigned16(u16),
    Unsigned32(u32),
    Unsigned64(u64),
    Signed8(i8),
    Signed16(i16),
    Signed32(i32),
    Signed64(i64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    Boolean(bool),
    MacAddress(MacAddress),
    String(String),
    DateTimeSeconds(DateTime<Utc>),
    DateTimeMilliseconds(DateTime<Utc>),
    DateTimeMicroseconds(DateTime<Utc>),
    DateTimeNanoseconds(DateTime<Utc>),
    Ipv4Address(Ipv4Addr),
    Ipv6Address(Ipv6Addr),
    /// Elements of a `basicList`, all of the same information element
    BasicList(Vec<Value>),
    /// Records of a `subTemplateList`, all following the same template
    SubTemplateList(Vec<Vec<Value>>),
    /// Records of every block of a `subTemplateMultiList`, flattened in order
    SubTemplateMultiList(Vec<Vec<Value>>),
}

impl ValueData {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::OctetArray(_) => ValueKind::OctetArray,
            Self::Unsigned8(_) => ValueKind::Unsigned8,
            Self::Unsigned16(_) => ValueKind::Unsigned16,
            Self::Unsigned32(_) => ValueKind::Unsigned32,
            Self::Unsigned64(_) => ValueKind::Unsigned64,
            Self::Signed8(_) => ValueKind::Signed8,
            Self::Signed16(_) => ValueKind::Signed16,
            Self::Signed32(_) => ValueKind::Signed32,
            Self::Signed64(_) => ValueKind::Signed64,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::MacAddress(_) => ValueKind::MacAddress,
            Self::String(_) => ValueKind::String,
            Self::DateTimeSeconds(_) => ValueKind::DateTimeSeconds,
            Self::DateTimeMilliseconds(_) => ValueKind::DateTimeMilliseconds,
            Self::DateTimeMicroseconds(_) => ValueKind::DateTimeMicroseconds,
            Self::DateTimeNanoseconds(_) => ValueKind::DateTimeNanoseconds,
            Self::Ipv4Address(_) => ValueKind::Ipv4Address,
            Self::Ipv6Address(_) => ValueKind::Ipv6Address,
            Self::BasicList(_) => ValueKind::BasicList,
            Self::SubTemplateList(_) => ValueKind::SubTemplateList,
            Self::SubTemplateMultiList(_) => ValueKind::SubTemplateMultiList,
        }
    }
}

fn fmt_record(f: &mut fmt::Formatter<'_>, record: &[Value]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, value) in record.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}={}", value.name(), value.data())?;
    }
    write!(f, "}}")
}

fn fmt_records(f: &mut fmt::Formatter<'_>, records: &[Vec<Value>]) -> fmt::Result {
    write!(f, "[")?;
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_record(f, record)?;
    }
    write!(f, "]")
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OctetArray(octets) => {
                for octet in octets {
                    write!(f, "{octet:02x}")?;
                }
                Ok(())
            }
            Self::Unsigned8(v) => write!(f, "{v}"),
            Self::Unsigned16(v) => write!(f, "{v}"),
            Self::Unsigned32(v) => write!(f, "{v}"),
            Self::Unsigned64(v) => write!(f, "{v}"),
            Self::Signed8(v) => write!(f, "{v}"),
            Self::Signed16(v) => write!(f, "{v}"),
            Self::Signed32(v) => write!(f, "{v}"),
            Self::Signed64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::MacAddress(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::DateTimeSeconds(v) => write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::DateTimeMilliseconds(v) => {
                write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::DateTimeMicroseconds(v) => {
                write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            Self::DateTimeNanoseconds(v) => {
                write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Nanos, true))
            }
            Self::Ipv4Address(v) => write!(f, "{v}"),
            Self::Ipv6Address(v) => write!(f, "{v}"),
            Self::BasicList(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value.data())?;
                }
                write!(f, "]")
            }
            Self::SubTemplateList(records) | Self::SubTemplateMultiList(records) => {
                fmt_records(f, records)
            }
        }
    }
}

/// A named, typed field value of a decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    name: Cow<'static, str>,
    data: ValueData,
}

impl Value {
    pub fn new(name: impl Into<Cow<'static, str>>, data: ValueData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn into_data(self) -> ValueData {
        self.data
    }

    pub const fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    /// Integer value widened to `u64`, `None` for negative or non integer
    /// values.
    pub fn as_u64(&self) -> Option<u64> {
        match self.data {
            ValueData::Unsigned8(v) => Some(v.into()),
            ValueData::Unsigned16(v) => Some(v.into()),
            ValueData::Unsigned32(v) => Some(v.into()),
            ValueData::Unsigned64(v) => Some(v),
            ValueData::Signed8(v) => u64::try_from(v).ok(),
            ValueData::Signed16(v) => u64::try_from(v).ok(),
            ValueData::Signed32(v) => u64::try_from(v).ok(),
            ValueData::Signed64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Integer value as `i64`, `None` when it doesn't fit or isn't an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self.data {
            ValueData::Signed8(v) => Some(v.into()),
            ValueData::Signed16(v) => Some(v.into()),
            ValueData::Signed32(v) => Some(v.into()),
            ValueData::Signed64(v) => Some(v),
            ValueData::Unsigned8(v) => Some(v.into()),
            ValueData::Unsigned16(v) => Some(v.into()),
            ValueData::Unsigned32(v) => Some(v.into()),
            ValueData::Unsigned64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data {
            ValueData::Float32(v) => Some(f64::from(v.0)),
            ValueData::Float64(v) => Some(v.0),
            _ => self
                .as_i64()
                .map(|v| v as f64)
                .or_else(|| self.as_u64().map(|v| v as f64)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// Big endian magnitude of up to 8 octets
#[inline]
fn read_unsigned(buf: &[u8]) -> u64 {
    buf.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// Big endian two's complement of up to 8 octets, sign extended from the
/// most significant encoded bit
#[inline]
fn read_signed(buf: &[u8]) -> i64 {
    if buf.is_empty() {
        return 0;
    }
    let shift = 64 - 8 * buf.len() as u32;
    ((read_unsigned(buf) << shift) as i64) >> shift
}

/// Integer kinds accept reduced-size encodings up to their natural width
#[inline]
fn integer(kind: ValueKind, buf: &[u8]) -> Result<&[u8], ValueError> {
    kind.check_length(buf.len())?;
    Ok(buf)
}

/// Fixed size kinds read through this, so calling a [`ParseFn`] directly
/// with a short slice is an error rather than a panic
#[inline]
fn exact<const N: usize>(kind: ValueKind, buf: &[u8]) -> Result<[u8; N], ValueError> {
    buf.try_into().map_err(|_| ValueError::InvalidLength {
        kind,
        length: buf.len(),
        min: kind.min_length(),
        max: kind.max_length(),
    })
}

fn parse_octets(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::OctetArray(buf.to_vec()))
}

fn parse_unsigned8(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Unsigned8(read_unsigned(integer(ValueKind::Unsigned8, buf)?) as u8))
}

fn parse_unsigned16(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Unsigned16(read_unsigned(integer(ValueKind::Unsigned16, buf)?) as u16))
}

fn parse_unsigned32(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Unsigned32(read_unsigned(integer(ValueKind::Unsigned32, buf)?) as u32))
}

fn parse_unsigned64(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Unsigned64(read_unsigned(integer(ValueKind::Unsigned64, buf)?)))
}

fn parse_signed8(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Signed8(read_signed(integer(ValueKind::Signed8, buf)?) as i8))
}

fn parse_signed16(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Signed16(read_signed(integer(ValueKind::Signed16, buf)?) as i16))
}

fn parse_signed32(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Signed32(read_signed(integer(ValueKind::Signed32, buf)?) as i32))
}

fn parse_signed64(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Signed64(read_signed(integer(ValueKind::Signed64, buf)?)))
}

fn parse_float32(buf: &[u8]) -> Result<ValueData, ValueError> {
    let bits = read_unsigned(buf) as u32;
    Ok(ValueData::Float32(OrderedFloat(f32::from_bits(bits))))
}

/// float64 fields may use the reduced-size (float32) encoding
fn parse_float64(buf: &[u8]) -> Result<ValueData, ValueError> {
    match buf.len() {
        4 => {
            let bits = read_unsigned(buf) as u32;
            Ok(ValueData::Float64(OrderedFloat(f64::from(f32::from_bits(
                bits,
            )))))
        }
        8 => Ok(ValueData::Float64(OrderedFloat(f64::from_bits(
            read_unsigned(buf),
        )))),
        length => Err(ValueError::InvalidLength {
            kind: ValueKind::Float64,
            length,
            min: 4,
            max: 8,
        }),
    }
}

fn parse_boolean(buf: &[u8]) -> Result<ValueData, ValueError> {
    match buf.first().copied().unwrap_or_default() {
        1 => Ok(ValueData::Boolean(true)),
        2 => Ok(ValueData::Boolean(false)),
        other => Err(ValueError::InvalidBoolean(other)),
    }
}

fn parse_mac_address(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::MacAddress(MacAddress(exact(ValueKind::MacAddress, buf)?)))
}

fn parse_string(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::String(String::from_utf8_lossy(buf).into_owned()))
}

fn parse_date_time_seconds(buf: &[u8]) -> Result<ValueData, ValueError> {
    let seconds = read_unsigned(buf) as i64;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(ValueData::DateTimeSeconds)
        .ok_or(ValueError::InvalidTimestamp)
}

fn parse_date_time_milliseconds(buf: &[u8]) -> Result<ValueData, ValueError> {
    let millis = i64::try_from(read_unsigned(buf)).map_err(|_| ValueError::InvalidTimestamp)?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(ValueData::DateTimeMilliseconds)
        .ok_or(ValueError::InvalidTimestamp)
}

/// NTP timestamp: 32 bits of seconds since 1900 and 32 bits of fraction
fn read_ntp(kind: ValueKind, buf: &[u8], fraction_mask: u32) -> Result<DateTime<Utc>, ValueError> {
    let [s0, s1, s2, s3, f0, f1, f2, f3] = exact(kind, buf)?;
    let seconds = i64::from(u32::from_be_bytes([s0, s1, s2, s3])) - NTP_UNIX_OFFSET;
    let fraction = u64::from(u32::from_be_bytes([f0, f1, f2, f3]) & fraction_mask);
    let nanos = ((fraction * 1_000_000_000) >> 32) as u32;
    Utc.timestamp_opt(seconds, nanos)
        .single()
        .ok_or(ValueError::InvalidTimestamp)
}

/// The lower 11 bits of the fraction are ignored for microsecond precision
fn parse_date_time_microseconds(buf: &[u8]) -> Result<ValueData, ValueError> {
    read_ntp(ValueKind::DateTimeMicroseconds, buf, 0xffff_f800).map(ValueData::DateTimeMicroseconds)
}

fn parse_date_time_nanoseconds(buf: &[u8]) -> Result<ValueData, ValueError> {
    read_ntp(ValueKind::DateTimeNanoseconds, buf, u32::MAX).map(ValueData::DateTimeNanoseconds)
}

fn parse_ipv4_address(buf: &[u8]) -> Result<ValueData, ValueError> {
    Ok(ValueData::Ipv4Address(Ipv4Addr::from(
        read_unsigned(buf) as u32
    )))
}

fn parse_ipv6_address(buf: &[u8]) -> Result<ValueData, ValueError> {
    let octets: [u8; 16] = exact(ValueKind::Ipv6Address, buf)?;
    Ok(ValueData::Ipv6Address(Ipv6Addr::from(octets)))
}
