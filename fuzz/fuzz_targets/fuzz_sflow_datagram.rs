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

#![no_main]
extern crate libfuzzer_sys;
use libfuzzer_sys::fuzz_target;
use std::net::{IpAddr, SocketAddr};
use telemetryd_flow_pkt::decoder::FlowDecoder;

fuzz_target!(|data: &[u8]| {
    let decoder = FlowDecoder::default();
    let exporter = SocketAddr::new(IpAddr::from([192, 0, 2, 1]), 6343);
    let mut datagram = vec![0x00, 0x00, 0x00, 0x05];
    datagram.extend_from_slice(data);
    let _ = decoder.decode(&datagram, exporter);
});
