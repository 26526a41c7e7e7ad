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

//! Metadata about the monitored entities (nodes, interfaces, services) that
//! adapters attach to decoded records.
//!
//! The decoder only knows the [`EntityScopeProvider`] contract, the inventory
//! behind it is supplied by the caller.

use crate::record::DecodedRecord;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, net::IpAddr};

/// `(context, key) -> value` metadata, e.g. `("node", "label") -> "edge-1"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    values: BTreeMap<(String, String), String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        context: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.values
            .insert((context.into(), key.into()), value.into())
    }

    pub fn get(&self, context: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(context.to_string(), key.to_string()))
            .map(String::as_str)
    }

    /// Add the entries of `other` that are not already present
    pub fn merge(&mut self, other: Scope) {
        for (key, value) in other.values {
            self.values.entry(key).or_insert(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.values
            .iter()
            .map(|((context, key), value)| (context.as_str(), key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub trait EntityScopeProvider: Send + Sync {
    fn scope_for_node(&self, node_id: u32) -> Scope;

    fn scope_for_interface(&self, node_id: u32, address: IpAddr) -> Scope;

    fn scope_for_interface_by_if_index(&self, node_id: u32, if_index: u32) -> Scope;

    fn scope_for_service(&self, node_id: u32, address: IpAddr, service: &str) -> Scope;
}

/// Provider without any inventory
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScopeProvider;

impl EntityScopeProvider for EmptyScopeProvider {
    fn scope_for_node(&self, _node_id: u32) -> Scope {
        Scope::default()
    }

    fn scope_for_interface(&self, _node_id: u32, _address: IpAddr) -> Scope {
        Scope::default()
    }

    fn scope_for_interface_by_if_index(&self, _node_id: u32, _if_index: u32) -> Scope {
        Scope::default()
    }

    fn scope_for_service(&self, _node_id: u32, _address: IpAddr, _service: &str) -> Scope {
        Scope::default()
    }
}

const INGRESS_FIELDS: [&str; 2] = ["ingressInterface", "flow_sample.input"];
const EGRESS_FIELDS: [&str; 2] = ["egressInterface", "flow_sample.output"];

impl DecodedRecord {
    fn if_index(&self, names: &[&str]) -> Option<u32> {
        names
            .iter()
            .find_map(|name| self.get(name))
            .and_then(|value| value.as_u64())
            .and_then(|value| u32::try_from(value).ok())
    }

    /// Scope of the node the record was exported by: the node itself, the
    /// exporter's interface, then the ingress and egress interfaces of the
    /// flow. Earlier entries win over later ones.
    pub fn resolve_scope(&self, node_id: u32, provider: &dyn EntityScopeProvider) -> Scope {
        let mut scope = provider.scope_for_node(node_id);
        scope.merge(provider.scope_for_interface(node_id, self.exporter().ip()));
        for names in [&INGRESS_FIELDS[..], &EGRESS_FIELDS[..]] {
            if let Some(if_index) = self.if_index(names) {
                scope.merge(provider.scope_for_interface_by_if_index(node_id, if_index));
            }
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::FlowProtocol,
        value::{Value, ValueData},
    };
    use std::{net::SocketAddr, sync::Mutex};

    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
    }

    impl EntityScopeProvider for RecordingProvider {
        fn scope_for_node(&self, node_id: u32) -> Scope {
            self.calls.lock().unwrap().push(format!("node {node_id}"));
            let mut scope = Scope::new();
            scope.insert("node", "label", "edge-1");
            scope
        }

        fn scope_for_interface(&self, node_id: u32, address: IpAddr) -> Scope {
            self.calls
                .lock()
                .unwrap()
                .push(format!("interface {node_id} {address}"));
            let mut scope = Scope::new();
            scope.insert("node", "label", "ignored");
            scope.insert("interface", "if-alias", "uplink");
            scope
        }

        fn scope_for_interface_by_if_index(&self, node_id: u32, if_index: u32) -> Scope {
            self.calls
                .lock()
                .unwrap()
                .push(format!("ifindex {node_id} {if_index}"));
            let mut scope = Scope::new();
            scope.insert("interface", format!("if-{if_index}"), "up");
            scope
        }

        fn scope_for_service(&self, _node_id: u32, _address: IpAddr, _service: &str) -> Scope {
            Scope::new()
        }
    }

    fn record(fields: Vec<Value>) -> DecodedRecord {
        DecodedRecord::new(
            FlowProtocol::Ipfix,
            SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 4739),
            0,
            None,
            None,
            fields,
        )
    }

    #[test]
    fn test_resolve_scope() {
        let provider = RecordingProvider::default();
        let record = record(vec![
            Value::new("ingressInterface", ValueData::Unsigned32(3)),
            Value::new("egressInterface", ValueData::Unsigned32(7)),
        ]);
        let scope = record.resolve_scope(42, &provider);
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec![
                "node 42".to_string(),
                "interface 42 192.0.2.1".to_string(),
                "ifindex 42 3".to_string(),
                "ifindex 42 7".to_string(),
            ]
        );
        assert_eq!(scope.get("node", "label"), Some("edge-1"));
        assert_eq!(scope.get("interface", "if-alias"), Some("uplink"));
        assert_eq!(scope.get("interface", "if-3"), Some("up"));
        assert_eq!(scope.len(), 4);
    }

    #[test]
    fn test_empty_provider() {
        let record = record(vec![Value::new(
            "flow_sample.input",
            ValueData::Unsigned32(1),
        )]);
        let scope = record.resolve_scope(1, &EmptyScopeProvider);
        assert!(scope.is_empty());
        assert_eq!(scope.iter().count(), 0);
    }
}
