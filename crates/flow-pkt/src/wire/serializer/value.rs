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

use byteorder::{NetworkEndian, WriteBytesExt};
use std::io::Write;

use crate::{
    value::{Value, ValueData, ValueKind, NTP_UNIX_OFFSET},
    FieldSpecifier,
};
use telemetryd_parse_utils::WritablePduWithOneInput;
use telemetryd_serde_macros::WritingError;

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum FieldWritingError {
    StdIOError(#[from_std_io_error] String),
    /// The value can't be encoded in the length announced by the template
    InvalidLength { kind: ValueKind, length: u16 },
    /// Structured data is only decoded
    UnsupportedValue(ValueKind),
}

impl std::fmt::Display for FieldWritingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StdIOError(err) => write!(f, "{err}"),
            Self::InvalidLength { kind, length } => {
                write!(f, "{kind} value can't be written in {length} octets")
            }
            Self::UnsupportedValue(kind) => write!(f, "writing {kind} values is not supported"),
        }
    }
}

impl std::error::Error for FieldWritingError {}

const fn is_variable_kind(kind: ValueKind) -> bool {
    matches!(
        kind,
        ValueKind::OctetArray
            | ValueKind::String
            | ValueKind::BasicList
            | ValueKind::SubTemplateList
            | ValueKind::SubTemplateMultiList
    )
}

/// One octet length, or 255 followed by a two octets length
const fn variable_length_prefix(length: usize) -> usize {
    if length < 255 {
        1
    } else {
        3
    }
}

/// Natural big endian encoding of the value
fn natural_octets(data: &ValueData) -> Result<Vec<u8>, FieldWritingError> {
    let octets = match data {
        ValueData::OctetArray(octets) => octets.clone(),
        ValueData::Unsigned8(v) => v.to_be_bytes().to_vec(),
        ValueData::Unsigned16(v) => v.to_be_bytes().to_vec(),
        ValueData::Unsigned32(v) => v.to_be_bytes().to_vec(),
        ValueData::Unsigned64(v) => v.to_be_bytes().to_vec(),
        ValueData::Signed8(v) => v.to_be_bytes().to_vec(),
        ValueData::Signed16(v) => v.to_be_bytes().to_vec(),
        ValueData::Signed32(v) => v.to_be_bytes().to_vec(),
        ValueData::Signed64(v) => v.to_be_bytes().to_vec(),
        ValueData::Float32(v) => v.0.to_be_bytes().to_vec(),
        ValueData::Float64(v) => v.0.to_be_bytes().to_vec(),
        ValueData::Boolean(v) => vec![if *v { 1 } else { 2 }],
        ValueData::MacAddress(v) => v.octets().to_vec(),
        ValueData::String(v) => v.as_bytes().to_vec(),
        ValueData::DateTimeSeconds(v) => (v.timestamp() as u32).to_be_bytes().to_vec(),
        ValueData::DateTimeMilliseconds(v) => (v.timestamp_millis() as u64).to_be_bytes().to_vec(),
        ValueData::DateTimeMicroseconds(v) => {
            ntp_octets(v.timestamp(), v.timestamp_subsec_nanos(), 0xffff_f800)
        }
        ValueData::DateTimeNanoseconds(v) => {
            ntp_octets(v.timestamp(), v.timestamp_subsec_nanos(), u32::MAX)
        }
        ValueData::Ipv4Address(v) => v.octets().to_vec(),
        ValueData::Ipv6Address(v) => v.octets().to_vec(),
        ValueData::BasicList(_)
        | ValueData::SubTemplateList(_)
        | ValueData::SubTemplateMultiList(_) => {
            return Err(FieldWritingError::UnsupportedValue(data.kind()));
        }
    };
    Ok(octets)
}

fn ntp_octets(seconds: i64, nanos: u32, fraction_mask: u32) -> Vec<u8> {
    let seconds = (seconds + NTP_UNIX_OFFSET) as u32;
    // Rounded up so that reading it back yields the same nanoseconds
    let fraction = (((u64::from(nanos) << 32) + 999_999_999) / 1_000_000_000) as u32;
    let mut octets = seconds.to_be_bytes().to_vec();
    octets.extend_from_slice(&(fraction & fraction_mask).to_be_bytes());
    octets
}

/// Reduced-size encoding (RFC 7011 section 6.2) keeps the least significant
/// octets, provided the dropped ones carry no information.
fn reduce(data: &ValueData, octets: Vec<u8>, length: u16) -> Result<Vec<u8>, FieldWritingError> {
    let invalid = || FieldWritingError::InvalidLength {
        kind: data.kind(),
        length,
    };
    let target = length as usize;
    if target == octets.len() {
        return Ok(octets);
    }
    let kind = data.kind();
    if target == 0 || target > octets.len() || target < kind.min_length() as usize {
        return Err(invalid());
    }
    match data {
        ValueData::Float64(v) if target == 4 => Ok((v.0 as f32).to_be_bytes().to_vec()),
        ValueData::Unsigned8(_)
        | ValueData::Unsigned16(_)
        | ValueData::Unsigned32(_)
        | ValueData::Unsigned64(_) => {
            let (dropped, kept) = octets.split_at(octets.len() - target);
            if dropped.iter().any(|octet| *octet != 0) {
                return Err(invalid());
            }
            Ok(kept.to_vec())
        }
        ValueData::Signed8(_)
        | ValueData::Signed16(_)
        | ValueData::Signed32(_)
        | ValueData::Signed64(_) => {
            let (dropped, kept) = octets.split_at(octets.len() - target);
            let sign = if kept[0] & 0x80 == 0 { 0x00 } else { 0xff };
            if dropped.iter().any(|octet| *octet != sign) {
                return Err(invalid());
            }
            Ok(kept.to_vec())
        }
        _ => Err(invalid()),
    }
}

/// The input is the field length from the template, [`None`] writes the
/// natural length of the value (and variable length for strings and octets).
impl WritablePduWithOneInput<Option<u16>, FieldWritingError> for Value {
    const BASE_LENGTH: usize = 0;

    fn len(&self, length: Option<u16>) -> usize {
        match length {
            Some(length) if length != FieldSpecifier::VARIABLE_LENGTH => length as usize,
            _ => {
                let payload = natural_octets(self.data()).map(|x| x.len()).unwrap_or(0);
                if length.is_some() || is_variable_kind(self.kind()) {
                    variable_length_prefix(payload) + payload
                } else {
                    payload
                }
            }
        }
    }

    fn write<T: Write>(&self, writer: &mut T, length: Option<u16>) -> Result<(), FieldWritingError> {
        let octets = natural_octets(self.data())?;
        let variable = match length {
            Some(length) => length == FieldSpecifier::VARIABLE_LENGTH,
            None => is_variable_kind(self.kind()),
        };
        if variable {
            if octets.len() < 255 {
                writer.write_u8(octets.len() as u8)?;
            } else {
                let length = u16::try_from(octets.len()).map_err(|_| {
                    FieldWritingError::InvalidLength {
                        kind: self.kind(),
                        length: FieldSpecifier::VARIABLE_LENGTH,
                    }
                })?;
                writer.write_u8(255)?;
                writer.write_u16::<NetworkEndian>(length)?;
            }
            writer.write_all(&octets)?;
            return Ok(());
        }
        let octets = match length {
            Some(length) => reduce(self.data(), octets, length)?,
            None => octets,
        };
        writer.write_all(&octets)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use telemetryd_parse_utils::test_helpers::test_write_with_one_input;

    #[rstest]
    #[case(ValueData::Unsigned64(1500), Some(2), &[0x05, 0xdc])]
    #[case(ValueData::Unsigned64(1500), None, &[0, 0, 0, 0, 0, 0, 0x05, 0xdc])]
    #[case(ValueData::Signed32(-2), Some(1), &[0xfe])]
    #[case(ValueData::Boolean(false), Some(1), &[2])]
    #[case(ValueData::String("eth0".to_string()), Some(65535), &[4, b'e', b't', b'h', b'0'])]
    #[case(ValueData::String("eth0".to_string()), Some(4), b"eth0")]
    #[case(ValueData::OctetArray(vec![1, 2]), None, &[2, 1, 2])]
    fn test_write_value(
        #[case] data: ValueData,
        #[case] length: Option<u16>,
        #[case] expected: &[u8],
    ) -> Result<(), FieldWritingError> {
        test_write_with_one_input(&Value::new("test", data), length, expected)
    }

    #[test]
    fn test_long_variable_length() -> Result<(), FieldWritingError> {
        let value = Value::new("test", ValueData::OctetArray(vec![0xaa; 300]));
        let mut expected = vec![255, 0x01, 0x2c];
        expected.extend_from_slice(&[0xaa; 300]);
        test_write_with_one_input(&value, Some(65535), &expected)
    }

    #[test]
    fn test_reduced_size_overflow() {
        let value = Value::new("test", ValueData::Unsigned32(70000));
        assert_eq!(
            value.write(&mut Vec::new(), Some(2)),
            Err(FieldWritingError::InvalidLength {
                kind: ValueKind::Unsigned32,
                length: 2
            })
        );
        let value = Value::new("test", ValueData::Signed16(200));
        assert_eq!(
            value.write(&mut Vec::new(), Some(1)),
            Err(FieldWritingError::InvalidLength {
                kind: ValueKind::Signed16,
                length: 1
            })
        );
    }

    #[test]
    fn test_ntp_timestamp_reads_back() {
        let time = Utc.timestamp_opt(1_718_892_000, 123_456_789).unwrap();
        let octets = natural_octets(&ValueData::DateTimeNanoseconds(time)).unwrap();
        assert_eq!(
            ValueKind::DateTimeNanoseconds.parse(&octets),
            Ok(ValueData::DateTimeNanoseconds(time))
        );
    }

    #[test]
    fn test_lists_are_not_written() {
        let value = Value::new("test", ValueData::BasicList(vec![]));
        assert_eq!(
            value.write(&mut Vec::new(), None),
            Err(FieldWritingError::UnsupportedValue(ValueKind::BasicList))
        );
    }
}
