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

//! Entry point of the decoding engine: finds out which protocol a datagram
//! carries and hands it to the matching decoder.
//! It works with [`FlowInfo`] which is an enum that combines IPFIX, NetFlow V9
//! and sFlow into one object to make it easier to handle.

use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, instrument, warn};

use crate::{
    error::DecodeError,
    ipfix::{IpfixPacket, IPFIX_VERSION},
    netflow::{NetFlowV9Packet, NETFLOW_V9_VERSION},
    record::{DecodedRecord, FlowProtocol},
    registry::FieldParserRegistry,
    sflow::{SFlowDatagram, SFLOW_VERSION},
    template::{TemplateCache, TemplateCacheConfig},
    wire::deserializer::DecodingContext,
    FlowInfo,
};
use telemetryd_parse_utils::{ReadablePduWithOneInput, Span};

/// Decoder settings, meant to be embedded in the caller's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default)]
    pub template_cache: TemplateCacheConfig,
}

/// Records decoded from a datagram, along with the diagnostics of the parts
/// that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub records: Vec<DecodedRecord>,
    pub diagnostics: Vec<DecodeError>,
}

/// Decodes NetFlow v9, IPFIX and sFlow v5 datagrams.
///
/// The decoder keeps the templates learned from every exporter, it is meant
/// to be shared (e.g. in an [`Arc`]) by all the threads receiving datagrams.
#[derive(Debug)]
pub struct FlowDecoder {
    registry: Arc<FieldParserRegistry>,
    ipfix_templates: TemplateCache,
    netflow_templates: TemplateCache,
    idle_timeout: Option<Duration>,
    /// The first unsupported datagram is logged at `warn`, the next at `debug`
    unsupported_logged: AtomicBool,
}

impl Default for FlowDecoder {
    fn default() -> Self {
        Self::new(Arc::new(FieldParserRegistry::iana()))
    }
}

impl FlowDecoder {
    pub fn new(registry: Arc<FieldParserRegistry>) -> Self {
        Self::with_config(registry, &DecoderConfig::default())
    }

    pub fn with_config(registry: Arc<FieldParserRegistry>, config: &DecoderConfig) -> Self {
        Self {
            registry,
            ipfix_templates: TemplateCache::new(&config.template_cache),
            netflow_templates: TemplateCache::new(&config.template_cache),
            idle_timeout: config.template_cache.idle_timeout,
            unsupported_logged: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &FieldParserRegistry {
        &self.registry
    }

    pub const fn ipfix_templates(&self) -> &TemplateCache {
        &self.ipfix_templates
    }

    pub const fn netflow_templates(&self) -> &TemplateCache {
        &self.netflow_templates
    }

    /// Decode a datagram into flat records
    pub fn decode(&self, buf: &[u8], exporter: SocketAddr) -> Result<DecodeOutcome, DecodeError> {
        let (info, diagnostics) = self.decode_packet(buf, exporter)?;
        Ok(DecodeOutcome {
            records: info.flatten(exporter),
            diagnostics,
        })
    }

    /// Decode a datagram into the protocol structures.
    ///
    /// The version is peeked without consuming anything: 9 is NetFlow v9, 10
    /// is IPFIX and a 32-bit 5 is sFlow v5.
    pub fn decode_packet(
        &self,
        buf: &[u8],
        exporter: SocketAddr,
    ) -> Result<(FlowInfo, Vec<DecodeError>), DecodeError> {
        let span = Span::new(buf);
        match span.peek_be_u16(0) {
            Some(NETFLOW_V9_VERSION) => self.parse_netflow_v9(span, exporter),
            Some(IPFIX_VERSION) => self.parse_ipfix(span, exporter),
            Some(0) if span.peek_be_u32(0) == Some(SFLOW_VERSION) => {
                self.parse_sflow(span, exporter)
            }
            // Only sFlow-style datagrams start with a 32-bit version
            Some(0) | None => {
                let version = span.peek_be_u32(0).unwrap_or_default();
                Err(self.unsupported(version, exporter))
            }
            Some(version) => Err(self.unsupported(u32::from(version), exporter)),
        }
    }

    fn unsupported(&self, version: u32, exporter: SocketAddr) -> DecodeError {
        if self.unsupported_logged.swap(true, Ordering::Relaxed) {
            debug!(%exporter, version, "dropping datagram of unsupported flow protocol");
        } else {
            warn!(%exporter, version, "dropping datagram of unsupported flow protocol");
        }
        DecodeError::UnsupportedProtocol(version)
    }

    #[instrument(skip_all)]
    fn parse_ipfix(
        &self,
        span: Span<'_>,
        exporter: SocketAddr,
    ) -> Result<(FlowInfo, Vec<DecodeError>), DecodeError> {
        let ctx = DecodingContext::new(
            FlowProtocol::Ipfix,
            exporter,
            &self.ipfix_templates,
            &self.registry,
        );
        match IpfixPacket::from_wire(span, &ctx) {
            Ok((_, pkt)) => Ok((FlowInfo::IPFIX(pkt), ctx.into_diagnostics())),
            Err(err) => Err(ctx.classify_nom_error("message header", 0, err)),
        }
    }

    #[instrument(skip_all)]
    fn parse_netflow_v9(
        &self,
        span: Span<'_>,
        exporter: SocketAddr,
    ) -> Result<(FlowInfo, Vec<DecodeError>), DecodeError> {
        let ctx = DecodingContext::new(
            FlowProtocol::NetFlowV9,
            exporter,
            &self.netflow_templates,
            &self.registry,
        );
        match NetFlowV9Packet::from_wire(span, &ctx) {
            Ok((_, pkt)) => Ok((FlowInfo::NetFlowV9(pkt), ctx.into_diagnostics())),
            Err(err) => Err(ctx.classify_nom_error("packet header", 0, err)),
        }
    }

    #[instrument(skip_all)]
    fn parse_sflow(
        &self,
        span: Span<'_>,
        exporter: SocketAddr,
    ) -> Result<(FlowInfo, Vec<DecodeError>), DecodeError> {
        // sFlow is template free, the cache is never consulted
        let ctx = DecodingContext::new(
            FlowProtocol::SFlow,
            exporter,
            &self.ipfix_templates,
            &self.registry,
        );
        match SFlowDatagram::from_wire(span, &ctx) {
            Ok((_, datagram)) => Ok((FlowInfo::SFlow(datagram), ctx.into_diagnostics())),
            Err(err) => Err(ctx.classify_nom_error("datagram header", 0, err)),
        }
    }

    /// Forget all the templates of an exporter, e.g. once its session is gone
    pub fn evict_exporter(&self, exporter: SocketAddr) -> usize {
        self.ipfix_templates.evict_all(exporter) + self.netflow_templates.evict_all(exporter)
    }

    /// Drop the templates unused for longer than the configured idle timeout.
    /// Does nothing when no timeout is configured.
    pub fn evict_idle_templates(&self) -> usize {
        match self.idle_timeout {
            Some(max_idle) => {
                self.ipfix_templates.evict_idle(max_idle)
                    + self.netflow_templates.evict_idle(max_idle)
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use tracing_test::traced_test;

    fn exporter() -> SocketAddr {
        SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 2055)
    }

    #[test]
    fn test_config_serde() {
        let yaml = "template_cache:\n  max_entries: 1000\n  idle_timeout: 1800\n";
        let config: DecoderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.template_cache.max_entries, Some(1000));
        assert_eq!(
            config.template_cache.idle_timeout,
            Some(Duration::from_secs(1800))
        );
        let config: DecoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    #[traced_test]
    fn test_unsupported_protocol() {
        let decoder = FlowDecoder::default();
        let buf = [0x00, 0x07, 0x00, 0x01, 0x00, 0x00];
        assert_eq!(
            decoder.decode(&buf, exporter()),
            Err(DecodeError::UnsupportedProtocol(7))
        );
        assert!(logs_contain("unsupported flow protocol"));
        assert!(logs_contain("version=7"));
        // NetFlow v5 header
        let buf = [0x00, 0x05, 0x00, 0x01, 0x00, 0x00, 0x10, 0x00];
        assert_eq!(
            decoder.decode(&buf, exporter()),
            Err(DecodeError::UnsupportedProtocol(5))
        );
        assert_eq!(
            decoder.decode(&[0x00, 0x00, 0x00, 0x04, 0x00], exporter()),
            Err(DecodeError::UnsupportedProtocol(4))
        );
        assert_eq!(
            decoder.decode(&[], exporter()),
            Err(DecodeError::UnsupportedProtocol(0))
        );
        assert_eq!(
            decoder.decode(&[0x00, 0x06], exporter()),
            Err(DecodeError::UnsupportedProtocol(6))
        );
    }

    #[test]
    fn test_truncated_header() {
        let decoder = FlowDecoder::default();
        let buf = [0x00, 0x0a, 0x00, 0x20, 0x66];
        assert!(matches!(
            decoder.decode(&buf, exporter()),
            Err(DecodeError::TruncatedPacket {
                protocol: FlowProtocol::Ipfix,
                ..
            })
        ));
    }

    #[test]
    fn test_evict_idle_without_timeout() {
        let decoder = FlowDecoder::default();
        assert_eq!(decoder.evict_idle_templates(), 0);
        assert_eq!(decoder.evict_exporter(exporter()), 0);
    }
}
