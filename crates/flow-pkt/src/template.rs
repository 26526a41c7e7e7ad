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

//! Templates learned from exporters, shared between the threads decoding
//! their datagrams.

use crate::FieldSpecifier;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::debug;

/// Templates are scoped by the exporter that sent them and the observation
/// domain (IPFIX) or source id (NetFlow v9) they were sent for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateKey {
    pub exporter: SocketAddr,
    pub observation_domain_id: u32,
    pub template_id: u16,
}

impl TemplateKey {
    pub const fn new(exporter: SocketAddr, observation_domain_id: u32, template_id: u16) -> Self {
        Self {
            exporter,
            observation_domain_id,
            template_id,
        }
    }
}

/// Simpler template that is used to decode data records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodingTemplate {
    scope_fields: Box<[FieldSpecifier]>,
    fields: Box<[FieldSpecifier]>,
}

impl DecodingTemplate {
    pub fn new(scope_fields: Box<[FieldSpecifier]>, fields: Box<[FieldSpecifier]>) -> Self {
        Self {
            scope_fields,
            fields,
        }
    }

    pub fn scope_fields(&self) -> &[FieldSpecifier] {
        &self.scope_fields
    }

    pub fn fields(&self) -> &[FieldSpecifier] {
        &self.fields
    }

    /// Options templates carry at least one scope field
    pub fn is_options(&self) -> bool {
        !self.scope_fields.is_empty()
    }

    /// Number of scope and non-scope fields
    pub fn field_count(&self) -> usize {
        self.scope_fields.len() + self.fields.len()
    }

    /// Scope fields followed by the other fields, in record order
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpecifier> {
        self.scope_fields.iter().chain(self.fields.iter())
    }

    /// The shortest record this template can describe. Variable length
    /// fields take at least their one octet length prefix.
    pub fn min_record_length(&self) -> usize {
        self.iter()
            .map(|field| {
                if field.is_variable_length() {
                    1
                } else {
                    field.length() as usize
                }
            })
            .sum()
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCacheConfig {
    /// Upper bound on the number of cached templates, the least recently used
    /// template is evicted past it. Unbounded when not set.
    #[serde(default, skip_serializing_if = "::std::option::Option::is_none")]
    pub max_entries: Option<usize>,

    /// Templates not used for this long are dropped by
    /// [`crate::decoder::FlowDecoder::evict_idle_templates`].
    #[serde(default, skip_serializing_if = "::std::option::Option::is_none")]
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    pub idle_timeout: Option<Duration>,
}

#[derive(Debug)]
struct Entry {
    template: Arc<DecodingTemplate>,
    last_used: Instant,
}

/// Concurrent template store.
///
/// The lock is only held to look up or swap an [`Arc`], so a decoder always
/// sees a complete template even while another thread replaces it.
#[derive(Debug)]
pub struct TemplateCache {
    entries: Mutex<LruCache<TemplateKey, Entry, FxBuildHasher>>,
    max_entries: Option<usize>,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(&TemplateCacheConfig::default())
    }
}

impl TemplateCache {
    pub fn new(config: &TemplateCacheConfig) -> Self {
        Self {
            // The bound is enforced in `put` so evictions can be logged
            entries: Mutex::new(LruCache::unbounded_with_hasher(FxBuildHasher)),
            max_entries: config.max_entries.map(|max| max.max(1)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<TemplateKey, Entry, FxBuildHasher>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a template, returning the one it replaced
    pub fn put(
        &self,
        key: TemplateKey,
        template: DecodingTemplate,
    ) -> Option<Arc<DecodingTemplate>> {
        let entry = Entry {
            template: Arc::new(template),
            last_used: Instant::now(),
        };
        let mut entries = self.lock();
        let previous = entries.put(key, entry).map(|entry| entry.template);
        debug!(
            exporter = %key.exporter,
            observation_domain_id = key.observation_domain_id,
            template_id = key.template_id,
            replaced = previous.is_some(),
            "template learned"
        );
        if let Some(max_entries) = self.max_entries {
            // The new template is the most recently used, it is never the victim
            while entries.len() > max_entries {
                let Some((victim, _)) = entries.pop_lru() else {
                    break;
                };
                debug!(
                    exporter = %victim.exporter,
                    observation_domain_id = victim.observation_domain_id,
                    template_id = victim.template_id,
                    "least recently used template evicted"
                );
            }
        }
        previous
    }

    pub fn get(&self, key: &TemplateKey) -> Option<Arc<DecodingTemplate>> {
        let mut entries = self.lock();
        entries.get_mut(key).map(|entry| {
            entry.last_used = Instant::now();
            Arc::clone(&entry.template)
        })
    }

    /// Template withdrawal
    pub fn remove(&self, key: &TemplateKey) -> Option<Arc<DecodingTemplate>> {
        let removed = self.lock().pop(key).map(|entry| entry.template);
        if removed.is_some() {
            debug!(
                exporter = %key.exporter,
                observation_domain_id = key.observation_domain_id,
                template_id = key.template_id,
                "template withdrawn"
            );
        }
        removed
    }

    /// Withdraw every template, or every options template, of one
    /// observation domain of an exporter
    pub fn remove_domain(
        &self,
        exporter: SocketAddr,
        observation_domain_id: u32,
        options: bool,
    ) -> usize {
        self.retain(|key, entry| {
            key.exporter != exporter
                || key.observation_domain_id != observation_domain_id
                || entry.template.is_options() != options
        })
    }

    /// Drop every template of an exporter that went away
    pub fn evict_all(&self, exporter: SocketAddr) -> usize {
        self.retain(|key, _| key.exporter != exporter)
    }

    /// Drop the templates that were not used for at least `max_idle`
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        self.retain(|_, entry| now.saturating_duration_since(entry.last_used) < max_idle)
    }

    fn retain(&self, mut keep: impl FnMut(&TemplateKey, &Entry) -> bool) -> usize {
        let mut entries = self.lock();
        let victims = entries
            .iter()
            .filter(|&(key, entry)| !keep(key, entry))
            .map(|(key, _)| *key)
            .collect::<Vec<_>>();
        for key in &victims {
            entries.pop(key);
            debug!(
                exporter = %key.exporter,
                observation_domain_id = key.observation_domain_id,
                template_id = key.template_id,
                "template evicted"
            );
        }
        victims.len()
    }

    /// `(observation domain id, template id)` of the templates known for an
    /// exporter, sorted
    pub fn template_ids(&self, exporter: SocketAddr) -> Vec<(u32, u16)> {
        let entries = self.lock();
        let mut ids = entries
            .iter()
            .filter(|(key, _)| key.exporter == exporter)
            .map(|(key, _)| (key.observation_domain_id, key.template_id))
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
