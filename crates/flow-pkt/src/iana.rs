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

//! IANA IPFIX information elements
//! (<https://www.iana.org/assignments/ipfix/ipfix.xhtml>). Ids 1 to 127 are
//! shared with the NetFlow v9 field types of RFC 3954.

use crate::value::ValueKind as K;

/// `(element id, name, abstract data type)`, sorted by element id
pub(crate) static IANA_INFORMATION_ELEMENTS: &[(u16, &str, K)] = &[
    (1, "octetDeltaCount", K::Unsigned64),
    (2, "packetDeltaCount", K::Unsigned64),
    (3, "deltaFlowCount", K::Unsigned64),
    (4, "protocolIdentifier", K::Unsigned8),
    (5, "ipClassOfService", K::Unsigned8),
    (6, "tcpControlBits", K::Unsigned16),
    (7, "sourceTransportPort", K::Unsigned16),
    (8, "sourceIPv4Address", K::Ipv4Address),
    (9, "sourceIPv4PrefixLength", K::Unsigned8),
    (10, "ingressInterface", K::Unsigned32),
    (11, "destinationTransportPort", K::Unsigned16),
    (12, "destinationIPv4Address", K::Ipv4Address),
    (13, "destinationIPv4PrefixLength", K::Unsigned8),
    (14, "egressInterface", K::Unsigned32),
    (15, "ipNextHopIPv4Address", K::Ipv4Address),
    (16, "bgpSourceAsNumber", K::Unsigned32),
    (17, "bgpDestinationAsNumber", K::Unsigned32),
    (18, "bgpNextHopIPv4Address", K::Ipv4Address),
    (19, "postMCastPacketDeltaCount", K::Unsigned64),
    (20, "postMCastOctetDeltaCount", K::Unsigned64),
    (21, "flowEndSysUpTime", K::Unsigned32),
    (22, "flowStartSysUpTime", K::Unsigned32),
    (23, "postOctetDeltaCount", K::Unsigned64),
    (24, "postPacketDeltaCount", K::Unsigned64),
    (25, "minimumIpTotalLength", K::Unsigned64),
    (26, "maximumIpTotalLength", K::Unsigned64),
    (27, "sourceIPv6Address", K::Ipv6Address),
    (28, "destinationIPv6Address", K::Ipv6Address),
    (29, "sourceIPv6PrefixLength", K::Unsigned8),
    (30, "destinationIPv6PrefixLength", K::Unsigned8),
    (31, "flowLabelIPv6", K::Unsigned32),
    (32, "icmpTypeCodeIPv4", K::Unsigned16),
    (33, "igmpType", K::Unsigned8),
    (34, "samplingInterval", K::Unsigned32),
    (35, "samplingAlgorithm", K::Unsigned8),
    (36, "flowActiveTimeout", K::Unsigned16),
    (37, "flowIdleTimeout", K::Unsigned16),
    (38, "engineType", K::Unsigned8),
    (39, "engineId", K::Unsigned8),
    (40, "exportedOctetTotalCount", K::Unsigned64),
    (41, "exportedMessageTotalCount", K::Unsigned64),
    (42, "exportedFlowRecordTotalCount", K::Unsigned64),
    (43, "ipv4RouterSc", K::Ipv4Address),
    (44, "sourceIPv4Prefix", K::Ipv4Address),
    (45, "destinationIPv4Prefix", K::Ipv4Address),
    (46, "mplsTopLabelType", K::Unsigned8),
    (47, "mplsTopLabelIPv4Address", K::Ipv4Address),
    (48, "samplerId", K::Unsigned8),
    (49, "samplerMode", K::Unsigned8),
    (50, "samplerRandomInterval", K::Unsigned32),
    (51, "classId", K::Unsigned8),
    (52, "minimumTTL", K::Unsigned8),
    (53, "maximumTTL", K::Unsigned8),
    (54, "fragmentIdentification", K::Unsigned32),
    (55, "postIpClassOfService", K::Unsigned8),
    (56, "sourceMacAddress", K::MacAddress),
    (57, "postDestinationMacAddress", K::MacAddress),
    (58, "vlanId", K::Unsigned16),
    (59, "postVlanId", K::Unsigned16),
    (60, "ipVersion", K::Unsigned8),
    (61, "flowDirection", K::Unsigned8),
    (62, "ipNextHopIPv6Address", K::Ipv6Address),
    (63, "bgpNextHopIPv6Address", K::Ipv6Address),
    (64, "ipv6ExtensionHeaders", K::Unsigned32),
    (70, "mplsTopLabelStackSection", K::OctetArray),
    (71, "mplsLabelStackSection2", K::OctetArray),
    (72, "mplsLabelStackSection3", K::OctetArray),
    (73, "mplsLabelStackSection4", K::OctetArray),
    (74, "mplsLabelStackSection5", K::OctetArray),
    (75, "mplsLabelStackSection6", K::OctetArray),
    (76, "mplsLabelStackSection7", K::OctetArray),
    (77, "mplsLabelStackSection8", K::OctetArray),
    (78, "mplsLabelStackSection9", K::OctetArray),
    (79, "mplsLabelStackSection10", K::OctetArray),
    (80, "destinationMacAddress", K::MacAddress),
    (81, "postSourceMacAddress", K::MacAddress),
    (82, "interfaceName", K::String),
    (83, "interfaceDescription", K::String),
    (84, "samplerName", K::String),
    (85, "octetTotalCount", K::Unsigned64),
    (86, "packetTotalCount", K::Unsigned64),
    (87, "flagsAndSamplerId", K::Unsigned32),
    (88, "fragmentOffset", K::Unsigned16),
    (89, "forwardingStatus", K::Unsigned32),
    (90, "mplsVpnRouteDistinguisher", K::OctetArray),
    (91, "mplsTopLabelPrefixLength", K::Unsigned8),
    (92, "srcTrafficIndex", K::Unsigned32),
    (93, "dstTrafficIndex", K::Unsigned32),
    (94, "applicationDescription", K::String),
    (95, "applicationId", K::OctetArray),
    (96, "applicationName", K::String),
    (98, "postIpDiffServCodePoint", K::Unsigned8),
    (99, "multicastReplicationFactor", K::Unsigned32),
    (100, "className", K::String),
    (101, "classificationEngineId", K::Unsigned8),
    (102, "layer2packetSectionOffset", K::Unsigned16),
    (103, "layer2packetSectionSize", K::Unsigned16),
    (104, "layer2packetSectionData", K::OctetArray),
    (128, "bgpNextAdjacentAsNumber", K::Unsigned32),
    (129, "bgpPrevAdjacentAsNumber", K::Unsigned32),
    (130, "exporterIPv4Address", K::Ipv4Address),
    (131, "exporterIPv6Address", K::Ipv6Address),
    (132, "droppedOctetDeltaCount", K::Unsigned64),
    (133, "droppedPacketDeltaCount", K::Unsigned64),
    (134, "droppedOctetTotalCount", K::Unsigned64),
    (135, "droppedPacketTotalCount", K::Unsigned64),
    (136, "flowEndReason", K::Unsigned8),
    (137, "commonPropertiesId", K::Unsigned64),
    (138, "observationPointId", K::Unsigned64),
    (139, "icmpTypeCodeIPv6", K::Unsigned16),
    (140, "mplsTopLabelIPv6Address", K::Ipv6Address),
    (141, "lineCardId", K::Unsigned32),
    (142, "portId", K::Unsigned32),
    (143, "meteringProcessId", K::Unsigned32),
    (144, "exportingProcessId", K::Unsigned32),
    (145, "templateId", K::Unsigned16),
    (146, "wlanChannelId", K::Unsigned8),
    (147, "wlanSSID", K::String),
    (148, "flowId", K::Unsigned64),
    (149, "observationDomainId", K::Unsigned32),
    (150, "flowStartSeconds", K::DateTimeSeconds),
    (151, "flowEndSeconds", K::DateTimeSeconds),
    (152, "flowStartMilliseconds", K::DateTimeMilliseconds),
    (153, "flowEndMilliseconds", K::DateTimeMilliseconds),
    (154, "flowStartMicroseconds", K::DateTimeMicroseconds),
    (155, "flowEndMicroseconds", K::DateTimeMicroseconds),
    (156, "flowStartNanoseconds", K::DateTimeNanoseconds),
    (157, "flowEndNanoseconds", K::DateTimeNanoseconds),
    (158, "flowStartDeltaMicroseconds", K::Unsigned32),
    (159, "flowEndDeltaMicroseconds", K::Unsigned32),
    (160, "systemInitTimeMilliseconds", K::DateTimeMilliseconds),
    (161, "flowDurationMilliseconds", K::Unsigned32),
    (162, "flowDurationMicroseconds", K::Unsigned32),
    (163, "observedFlowTotalCount", K::Unsigned64),
    (164, "ignoredPacketTotalCount", K::Unsigned64),
    (165, "ignoredOctetTotalCount", K::Unsigned64),
    (166, "notSentFlowTotalCount", K::Unsigned64),
    (167, "notSentPacketTotalCount", K::Unsigned64),
    (168, "notSentOctetTotalCount", K::Unsigned64),
    (169, "destinationIPv6Prefix", K::Ipv6Address),
    (170, "sourceIPv6Prefix", K::Ipv6Address),
    (171, "postOctetTotalCount", K::Unsigned64),
    (172, "postPacketTotalCount", K::Unsigned64),
    (173, "flowKeyIndicator", K::Unsigned64),
    (174, "postMCastPacketTotalCount", K::Unsigned64),
    (175, "postMCastOctetTotalCount", K::Unsigned64),
    (176, "icmpTypeIPv4", K::Unsigned8),
    (177, "icmpCodeIPv4", K::Unsigned8),
    (178, "icmpTypeIPv6", K::Unsigned8),
    (179, "icmpCodeIPv6", K::Unsigned8),
    (180, "udpSourcePort", K::Unsigned16),
    (181, "udpDestinationPort", K::Unsigned16),
    (182, "tcpSourcePort", K::Unsigned16),
    (183, "tcpDestinationPort", K::Unsigned16),
    (184, "tcpSequenceNumber", K::Unsigned32),
    (185, "tcpAcknowledgementNumber", K::Unsigned32),
    (186, "tcpWindowSize", K::Unsigned16),
    (187, "tcpUrgentPointer", K::Unsigned16),
    (188, "tcpHeaderLength", K::Unsigned8),
    (189, "ipHeaderLength", K::Unsigned8),
    (190, "totalLengthIPv4", K::Unsigned16),
    (191, "payloadLengthIPv6", K::Unsigned16),
    (192, "ipTTL", K::Unsigned8),
    (193, "nextHeaderIPv6", K::Unsigned8),
    (194, "mplsPayloadLength", K::Unsigned32),
    (195, "ipDiffServCodePoint", K::Unsigned8),
    (196, "ipPrecedence", K::Unsigned8),
    (197, "fragmentFlags", K::Unsigned8),
    (198, "octetDeltaSumOfSquares", K::Unsigned64),
    (199, "octetTotalSumOfSquares", K::Unsigned64),
    (200, "mplsTopLabelTTL", K::Unsigned8),
    (201, "mplsLabelStackLength", K::Unsigned32),
    (202, "mplsLabelStackDepth", K::Unsigned32),
    (203, "mplsTopLabelExp", K::Unsigned8),
    (204, "ipPayloadLength", K::Unsigned32),
    (205, "udpMessageLength", K::Unsigned16),
    (206, "isMulticast", K::Unsigned8),
    (207, "ipv4IHL", K::Unsigned8),
    (208, "ipv4Options", K::Unsigned32),
    (209, "tcpOptions", K::Unsigned64),
    (210, "paddingOctets", K::OctetArray),
    (211, "collectorIPv4Address", K::Ipv4Address),
    (212, "collectorIPv6Address", K::Ipv6Address),
    (213, "exportInterface", K::Unsigned32),
    (214, "exportProtocolVersion", K::Unsigned8),
    (215, "exportTransportProtocol", K::Unsigned8),
    (216, "collectorTransportPort", K::Unsigned16),
    (217, "exporterTransportPort", K::Unsigned16),
    (218, "tcpSynTotalCount", K::Unsigned64),
    (219, "tcpFinTotalCount", K::Unsigned64),
    (220, "tcpRstTotalCount", K::Unsigned64),
    (221, "tcpPshTotalCount", K::Unsigned64),
    (222, "tcpAckTotalCount", K::Unsigned64),
    (223, "tcpUrgTotalCount", K::Unsigned64),
    (224, "ipTotalLength", K::Unsigned64),
    (225, "postNATSourceIPv4Address", K::Ipv4Address),
    (226, "postNATDestinationIPv4Address", K::Ipv4Address),
    (227, "postNAPTSourceTransportPort", K::Unsigned16),
    (228, "postNAPTDestinationTransportPort", K::Unsigned16),
    (229, "natOriginatingAddressRealm", K::Unsigned8),
    (230, "natEvent", K::Unsigned8),
    (231, "initiatorOctets", K::Unsigned64),
    (232, "responderOctets", K::Unsigned64),
    (233, "firewallEvent", K::Unsigned8),
    (234, "ingressVRFID", K::Unsigned32),
    (235, "egressVRFID", K::Unsigned32),
    (236, "VRFname", K::String),
    (237, "postMplsTopLabelExp", K::Unsigned8),
    (238, "tcpWindowScale", K::Unsigned16),
    (239, "biflowDirection", K::Unsigned8),
    (240, "ethernetHeaderLength", K::Unsigned8),
    (241, "ethernetPayloadLength", K::Unsigned16),
    (242, "ethernetTotalLength", K::Unsigned16),
    (243, "dot1qVlanId", K::Unsigned16),
    (244, "dot1qPriority", K::Unsigned8),
    (245, "dot1qCustomerVlanId", K::Unsigned16),
    (246, "dot1qCustomerPriority", K::Unsigned8),
    (247, "metroEvcId", K::String),
    (248, "metroEvcType", K::Unsigned8),
    (249, "pseudoWireId", K::Unsigned32),
    (250, "pseudoWireType", K::Unsigned16),
    (251, "pseudoWireControlWord", K::Unsigned32),
    (252, "ingressPhysicalInterface", K::Unsigned32),
    (253, "egressPhysicalInterface", K::Unsigned32),
    (254, "postDot1qVlanId", K::Unsigned16),
    (255, "postDot1qCustomerVlanId", K::Unsigned16),
    (256, "ethernetType", K::Unsigned16),
    (257, "postIpPrecedence", K::Unsigned8),
    (258, "collectionTimeMilliseconds", K::DateTimeMilliseconds),
    (259, "exportSctpStreamId", K::Unsigned16),
    (260, "maxExportSeconds", K::DateTimeSeconds),
    (261, "maxFlowEndSeconds", K::DateTimeSeconds),
    (262, "messageMD5Checksum", K::OctetArray),
    (263, "messageScope", K::Unsigned8),
    (264, "minExportSeconds", K::DateTimeSeconds),
    (265, "minFlowStartSeconds", K::DateTimeSeconds),
    (266, "opaqueOctets", K::OctetArray),
    (267, "sessionScope", K::Unsigned8),
    (268, "maxFlowEndMicroseconds", K::DateTimeMicroseconds),
    (269, "maxFlowEndMilliseconds", K::DateTimeMilliseconds),
    (270, "maxFlowEndNanoseconds", K::DateTimeNanoseconds),
    (271, "minFlowStartMicroseconds", K::DateTimeMicroseconds),
    (272, "minFlowStartMilliseconds", K::DateTimeMilliseconds),
    (273, "minFlowStartNanoseconds", K::DateTimeNanoseconds),
    (274, "collectorCertificate", K::OctetArray),
    (275, "exporterCertificate", K::OctetArray),
    (276, "dataRecordsReliability", K::Boolean),
    (277, "observationPointType", K::Unsigned8),
    (278, "newConnectionDeltaCount", K::Unsigned32),
    (279, "connectionSumDurationSeconds", K::Unsigned64),
    (280, "connectionTransactionId", K::Unsigned64),
    (281, "postNATSourceIPv6Address", K::Ipv6Address),
    (282, "postNATDestinationIPv6Address", K::Ipv6Address),
    (283, "natPoolId", K::Unsigned32),
    (284, "natPoolName", K::String),
    (285, "anonymizationFlags", K::Unsigned16),
    (286, "anonymizationTechnique", K::Unsigned16),
    (287, "informationElementIndex", K::Unsigned16),
    (288, "p2pTechnology", K::String),
    (289, "tunnelTechnology", K::String),
    (290, "encryptedTechnology", K::String),
    (291, "basicList", K::BasicList),
    (292, "subTemplateList", K::SubTemplateList),
    (293, "subTemplateMultiList", K::SubTemplateMultiList),
    (294, "bgpValidityState", K::Unsigned8),
    (295, "IPSecSPI", K::Unsigned32),
    (296, "greKey", K::Unsigned32),
    (297, "natType", K::Unsigned8),
    (298, "initiatorPackets", K::Unsigned64),
    (299, "responderPackets", K::Unsigned64),
    (300, "observationDomainName", K::String),
    (301, "selectionSequenceId", K::Unsigned64),
    (302, "selectorId", K::Unsigned64),
    (303, "informationElementId", K::Unsigned16),
    (304, "selectorAlgorithm", K::Unsigned16),
    (305, "samplingPacketInterval", K::Unsigned32),
    (306, "samplingPacketSpace", K::Unsigned32),
    (307, "samplingTimeInterval", K::Unsigned32),
    (308, "samplingTimeSpace", K::Unsigned32),
    (309, "samplingSize", K::Unsigned32),
    (310, "samplingPopulation", K::Unsigned32),
    (311, "samplingProbability", K::Float64),
    (312, "dataLinkFrameSize", K::Unsigned16),
    (313, "ipHeaderPacketSection", K::OctetArray),
    (314, "ipPayloadPacketSection", K::OctetArray),
    (315, "dataLinkFrameSection", K::OctetArray),
    (316, "mplsLabelStackSection", K::OctetArray),
    (317, "mplsPayloadPacketSection", K::OctetArray),
    (318, "selectorIdTotalPktsObserved", K::Unsigned64),
    (319, "selectorIdTotalPktsSelected", K::Unsigned64),
    (320, "absoluteError", K::Float64),
    (321, "relativeError", K::Float64),
    (322, "observationTimeSeconds", K::DateTimeSeconds),
    (323, "observationTimeMilliseconds", K::DateTimeMilliseconds),
    (324, "observationTimeMicroseconds", K::DateTimeMicroseconds),
    (325, "observationTimeNanoseconds", K::DateTimeNanoseconds),
    (326, "digestHashValue", K::Unsigned64),
    (327, "hashIPPayloadOffset", K::Unsigned64),
    (328, "hashIPPayloadSize", K::Unsigned64),
    (329, "hashOutputRangeMin", K::Unsigned64),
    (330, "hashOutputRangeMax", K::Unsigned64),
    (331, "hashSelectedRangeMin", K::Unsigned64),
    (332, "hashSelectedRangeMax", K::Unsigned64),
    (333, "hashDigestOutput", K::Boolean),
    (334, "hashInitialiserValue", K::Unsigned64),
    (335, "selectorName", K::String),
    (336, "upperCILimit", K::Float64),
    (337, "lowerCILimit", K::Float64),
    (338, "confidenceLevel", K::Float64),
    (339, "informationElementDataType", K::Unsigned8),
    (340, "informationElementDescription", K::String),
    (341, "informationElementName", K::String),
    (342, "informationElementRangeBegin", K::Unsigned64),
    (343, "informationElementRangeEnd", K::Unsigned64),
    (344, "informationElementSemantics", K::Unsigned8),
    (345, "informationElementUnits", K::Unsigned16),
    (346, "privateEnterpriseNumber", K::Unsigned32),
    (347, "virtualStationInterfaceId", K::OctetArray),
    (348, "virtualStationInterfaceName", K::String),
    (349, "virtualStationUUID", K::OctetArray),
    (350, "virtualStationName", K::String),
    (351, "layer2SegmentId", K::Unsigned64),
    (352, "layer2OctetDeltaCount", K::Unsigned64),
    (353, "layer2OctetTotalCount", K::Unsigned64),
];
