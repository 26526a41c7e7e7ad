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

//! A cursor over a received datagram that remembers how far it is from the
//! first byte of the datagram.
//!
//! Every sub-span produced while parsing keeps pointing into the caller's
//! buffer, so the protocol router can peek at the version field and hand the
//! very same span to the selected decoder, and every error can report the
//! absolute offset where it happened.


use nom::{AsBytes, InputIter, InputLength, InputTake, Offset, Slice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySpan<'a> {
    offset: usize,
    fragment: &'a [u8],
}

impl<'a> BinarySpan<'a> {
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            offset: 0,
            fragment: buffer,
        }
    }

    /// Number of octets between the start of the datagram and the start of
    /// this span.
    #[inline]
    pub const fn location_offset(&self) -> usize {
        self.offset
    }

    /// The bytes not yet consumed.
    #[inline]
    pub const fn fragment(&self) -> &'a [u8] {
        self.fragment
    }

    /// Read one octet at `at` (relative to this span) without consuming it.
    #[inline]
    pub fn peek_u8(&self, at: usize) -> Option<u8> {
        self.fragment.get(at).copied()
    }

    /// Read a network order `u16` at `at` (relative to this span) without
    /// consuming it.
    #[inline]
    pub fn peek_be_u16(&self, at: usize) -> Option<u16> {
        let end = at.checked_add(2)?;
        let bytes = self.fragment.get(at..end)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a network order `u32` at `at` (relative to this span) without
    /// consuming it.
    #[inline]
    pub fn peek_be_u32(&self, at: usize) -> Option<u32> {
        let end = at.checked_add(4)?;
        let bytes = self.fragment.get(at..end)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl<'a, R> Slice<R> for BinarySpan<'a>
where
    &'a [u8]: Slice<R>,
{
    #[inline]
    fn slice(&self, range: R) -> Self {
        let next = self.fragment.slice(range);
        let consumed = self.fragment.offset(&next);
        BinarySpan {
            offset: self.offset + consumed,
            fragment: next,
        }
    }
}

impl<'a> InputIter for BinarySpan<'a> {
    type Item = <&'a [u8] as InputIter>::Item;
    type Iter = <&'a [u8] as InputIter>::Iter;
    type IterElem = <&'a [u8] as InputIter>::IterElem;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.fragment.iter_indices()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.fragment.iter_elements()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.fragment.position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, nom::Needed> {
        self.fragment.slice_index(count)
    }
}

impl InputLength for BinarySpan<'_> {
    #[inline]
    fn input_len(&self) -> usize {
        self.fragment.len()
    }
}

impl InputTake for BinarySpan<'_> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        self.slice(..count)
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        (self.slice(count..), self.slice(..count))
    }
}

impl Offset for BinarySpan<'_> {
    #[inline]
    fn offset(&self, second: &Self) -> usize {
        second.offset - self.offset
    }
}

impl AsBytes for BinarySpan<'_> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.fragment
    }
}

impl core::ops::Deref for BinarySpan<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.fragment
    }
}

impl<'a> From<&'a [u8]> for BinarySpan<'a> {
    #[inline]
    fn from(buffer: &'a [u8]) -> Self {
        Self::new(buffer)
    }
}
