// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Decoder contracts consumed by the column reader.
//!
//! RLE/bit-packed level decoding, dictionary resolution and the physical
//! value encodings all live behind these traits; implementations are
//! supplied per page by the [`PageReader`](crate::column::page::PageReader).

use crate::errors::Result;

/// Decodes level data for a single page into `i16` output slices.
pub trait LevelDecoder: Send {
    /// Fills up to `out.len()` levels, returning the number written.
    ///
    /// Short reads are legal at page boundaries; a return of zero means the
    /// page's level stream is exhausted.
    fn read(&mut self, out: &mut [i16]) -> Result<usize>;
}

/// Decodes value data for a single page.
pub trait ValueDecoder<T>: Send {
    /// Dense decode of exactly `out.len()` values, returning the number
    /// decoded.
    fn decode(&mut self, out: &mut [T]) -> Result<usize>;

    /// Decodes `out.len() - null_count` values, placing each at the next
    /// position in `out` whose bit in `valid_bits` (starting at
    /// `valid_bits_offset`) is set. Positions with a cleared bit are left in
    /// a type-valid but unspecified state.
    ///
    /// Returns the number of non-null values decoded.
    fn decode_spaced(
        &mut self,
        out: &mut [T],
        null_count: usize,
        valid_bits: &[u8],
        valid_bits_offset: usize,
    ) -> Result<usize>;
}
