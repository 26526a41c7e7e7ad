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

//! Writing IPFIX messages, mostly to produce synthetic packets for tests and
//! tools.

pub mod ipfix;
pub mod value;

use crate::FieldSpecifier;
use byteorder::{NetworkEndian, WriteBytesExt};
use std::io::Write;
use telemetryd_parse_utils::WritablePdu;
use telemetryd_serde_macros::WritingError;

#[derive(WritingError, Eq, PartialEq, Clone, Debug)]
pub enum FieldSpecifierWritingError {
    StdIOError(#[from_std_io_error] String),
}

impl std::fmt::Display for FieldSpecifierWritingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StdIOError(e) => write!(f, "StdIO error: {e}"),
        }
    }
}

impl std::error::Error for FieldSpecifierWritingError {}

impl WritablePdu<FieldSpecifierWritingError> for FieldSpecifier {
    /// 2-octets field id, 2-octets length
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + if self.is_enterprise() { 4 } else { 0 }
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), FieldSpecifierWritingError> {
        if self.is_enterprise() {
            // Set Enterprise bit
            writer.write_u16::<NetworkEndian>(self.element_id() | 0x8000)?;
        } else {
            writer.write_u16::<NetworkEndian>(self.element_id())?;
        }
        writer.write_u16::<NetworkEndian>(self.length())?;
        if self.is_enterprise() {
            writer.write_u32::<NetworkEndian>(self.enterprise_number())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetryd_parse_utils::test_helpers::test_write;

    #[test]
    fn test_field_specifier() -> Result<(), FieldSpecifierWritingError> {
        test_write(&FieldSpecifier::new(0, 8, 4), &[0x00, 0x08, 0x00, 0x04])?;
        test_write(
            &FieldSpecifier::new(29305, 1, 0xffff),
            &[0x80, 0x01, 0xff, 0xff, 0x00, 0x00, 0x72, 0x79],
        )?;
        Ok(())
    }
}
