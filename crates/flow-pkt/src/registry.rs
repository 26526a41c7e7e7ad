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

//! Mapping from `(enterprise number, element id)` to the name and the
//! abstract data type used to decode a field.

use crate::{
    iana::IANA_INFORMATION_ELEMENTS,
    value::{Value, ValueData, ValueError, ValueKind},
};
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::borrow::Cow;

/// Decodes the bytes of one field into a named [`Value`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParser {
    name: Cow<'static, str>,
    kind: ValueKind,
}

impl FieldParser {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn parse(&self, buf: &[u8]) -> Result<Value, ValueError> {
        let data = self.kind.parse(buf)?;
        Ok(self.named(data))
    }

    /// Attach the field name to data decoded elsewhere, e.g. structured data
    pub fn named(&self, data: ValueData) -> Value {
        Value::new(self.name.clone(), data)
    }

    /// Like [`FieldParser::parse`], but keeps the field as raw octets when its
    /// kind rejects the bytes, handing back the reason.
    pub fn parse_or_raw(&self, buf: &[u8]) -> (Value, Option<ValueError>) {
        match self.parse(buf) {
            Ok(value) => (value, None),
            Err(err) => (
                Value::new(self.name.clone(), ValueData::OctetArray(buf.to_vec())),
                Some(err),
            ),
        }
    }
}

/// Field parsers keyed by `(enterprise number, element id)`, where enterprise
/// number `0` is the IANA registry.
///
/// Built once and shared between decoders behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FieldParserRegistry {
    parsers: FxHashMap<(u32, u16), FieldParser>,
}

impl Default for FieldParserRegistry {
    fn default() -> Self {
        Self::iana()
    }
}

impl FieldParserRegistry {
    /// A registry without any known element
    pub fn empty() -> Self {
        Self {
            parsers: FxHashMap::with_hasher(FxBuildHasher),
        }
    }

    /// The IANA IPFIX information elements, which also cover the NetFlow v9
    /// field types.
    pub fn iana() -> Self {
        let mut parsers = FxHashMap::with_capacity_and_hasher(
            IANA_INFORMATION_ELEMENTS.len(),
            FxBuildHasher,
        );
        for (id, name, kind) in IANA_INFORMATION_ELEMENTS {
            parsers.insert((0, *id), FieldParser::new(*name, *kind));
        }
        Self { parsers }
    }

    /// Add or override the definition of an element
    pub fn register(
        &mut self,
        enterprise_number: u32,
        element_id: u16,
        name: impl Into<Cow<'static, str>>,
        kind: ValueKind,
    ) {
        self.parsers.insert(
            (enterprise_number, element_id),
            FieldParser::new(name, kind),
        );
    }

    /// The parser for an element. Elements that aren't registered are decoded
    /// as raw octets under the name `unknown_<id>` or
    /// `unknown_<enterprise>_<id>`.
    pub fn resolve(&self, enterprise_number: u32, element_id: u16) -> Cow<'_, FieldParser> {
        match self.parsers.get(&(enterprise_number, element_id)) {
            Some(parser) => Cow::Borrowed(parser),
            None => {
                let name = if enterprise_number == 0 {
                    format!("unknown_{element_id}")
                } else {
                    format!("unknown_{enterprise_number}_{element_id}")
                };
                Cow::Owned(FieldParser::new(name, ValueKind::OctetArray))
            }
        }
    }

    pub fn contains(&self, enterprise_number: u32, element_id: u16) -> bool {
        self.parsers.contains_key(&(enterprise_number, element_id))
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_iana_lookup() {
        let registry = FieldParserRegistry::iana();
        let parser = registry.resolve(0, 8);
        assert_eq!(parser.name(), "sourceIPv4Address");
        assert_eq!(parser.kind(), ValueKind::Ipv4Address);
        assert_eq!(
            parser.parse(&[192, 168, 1, 1]),
            Ok(Value::new(
                "sourceIPv4Address",
                ValueData::Ipv4Address(Ipv4Addr::new(192, 168, 1, 1))
            ))
        );
        assert!(registry.contains(0, 291));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_unknown_elements_are_raw() {
        let registry = FieldParserRegistry::iana();
        let parser = registry.resolve(0, 60000);
        assert_eq!(parser.name(), "unknown_60000");
        assert_eq!(parser.kind(), ValueKind::OctetArray);
        let parser = registry.resolve(6876, 5);
        assert_eq!(parser.name(), "unknown_6876_5");
        assert_eq!(
            parser.parse(&[1, 2]).map(Value::into_data),
            Ok(ValueData::OctetArray(vec![1, 2]))
        );
    }

    #[test]
    fn test_register_enterprise_element() {
        let mut registry = FieldParserRegistry::empty();
        assert_eq!(registry.len(), 0);
        registry.register(29305, 1, "vmwareTenantProtocol", ValueKind::Unsigned8);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(29305, 1).name(), "vmwareTenantProtocol");
        registry.register(29305, 1, "tenantProtocol", ValueKind::Unsigned16);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(29305, 1).kind(), ValueKind::Unsigned16);
    }

    #[test]
    fn test_parse_or_raw_falls_back() {
        let registry = FieldParserRegistry::iana();
        // sourceIPv4Address with 3 octets
        let (value, err) = registry.resolve(0, 8).parse_or_raw(&[10, 0, 0]);
        assert_eq!(value.name(), "sourceIPv4Address");
        assert_eq!(value.data(), &ValueData::OctetArray(vec![10, 0, 0]));
        assert!(matches!(
            err,
            Some(ValueError::InvalidLength {
                kind: ValueKind::Ipv4Address,
                length: 3,
                ..
            })
        ));
    }
}
