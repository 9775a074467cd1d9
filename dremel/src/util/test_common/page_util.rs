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

//! In-memory stand-ins for the external page reader and decoders, used to
//! drive the record readers from literal level/value vectors in tests.

use arrow_buffer::bit_util;

use crate::column::page::{DataPage, PageReader};
use crate::column::reader::decoder::{LevelDecoder, ValueDecoder};
use crate::errors::Result;

/// A level decoder backed by a plain vector.
pub struct MemoryLevelDecoder {
    levels: Vec<i16>,
    pos: usize,
}

impl MemoryLevelDecoder {
    pub fn new(levels: Vec<i16>) -> Self {
        Self { levels, pos: 0 }
    }
}

impl LevelDecoder for MemoryLevelDecoder {
    fn read(&mut self, out: &mut [i16]) -> Result<usize> {
        let remaining = self.levels.len() - self.pos;
        let to_read = remaining.min(out.len());
        out[..to_read].copy_from_slice(&self.levels[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }
}

/// A value decoder backed by a plain vector of already decoded values.
pub struct MemoryValueDecoder<T> {
    values: Vec<T>,
    pos: usize,
}

impl<T> MemoryValueDecoder<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values, pos: 0 }
    }

    fn take(&mut self, num: usize) -> Result<&[T]> {
        let remaining = self.values.len() - self.pos;
        if num > remaining {
            return Err(decode_err!(
                "requested {} values but only {} remain in page",
                num,
                remaining
            ));
        }
        let slice = &self.values[self.pos..self.pos + num];
        self.pos += num;
        Ok(slice)
    }
}

impl<T: Clone + Send> ValueDecoder<T> for MemoryValueDecoder<T> {
    fn decode(&mut self, out: &mut [T]) -> Result<usize> {
        let values = self.take(out.len())?;
        out.clone_from_slice(values);
        Ok(out.len())
    }

    fn decode_spaced(
        &mut self,
        out: &mut [T],
        null_count: usize,
        valid_bits: &[u8],
        valid_bits_offset: usize,
    ) -> Result<usize> {
        let to_read = out.len() - null_count;
        let values = self.take(to_read)?.to_vec();
        let mut next = values.into_iter();
        for (idx, slot) in out.iter_mut().enumerate() {
            if bit_util::get_bit(valid_bits, valid_bits_offset + idx) {
                *slot = next.next().expect("valid bits disagree with null count");
            }
        }
        Ok(to_read)
    }
}

/// A value decoder that always fails, for exercising error paths.
pub struct PanickyValueDecoder;

impl<T: Send> ValueDecoder<T> for PanickyValueDecoder {
    fn decode(&mut self, _out: &mut [T]) -> Result<usize> {
        Err(decode_err!("decoder failure injected by test"))
    }

    fn decode_spaced(
        &mut self,
        _out: &mut [T],
        _null_count: usize,
        _valid_bits: &[u8],
        _valid_bits_offset: usize,
    ) -> Result<usize> {
        Err(decode_err!("decoder failure injected by test"))
    }
}

/// A page reader that serves pages from memory.
pub struct MemoryPageReader<T> {
    pages: std::vec::IntoIter<DataPage<T>>,
}

impl<T> MemoryPageReader<T> {
    pub fn new(pages: Vec<DataPage<T>>) -> Self {
        Self {
            pages: pages.into_iter(),
        }
    }
}

impl<T: Send> PageReader<T> for MemoryPageReader<T> {
    fn get_next_page(&mut self) -> Result<Option<DataPage<T>>> {
        Ok(self.pages.next())
    }
}

/// Builds a [`DataPage`] from literal level and value vectors. The slot
/// count is taken from the level vectors when present, else from `values`.
pub fn page<T: Clone + Send + 'static>(
    def_levels: Option<Vec<i16>>,
    rep_levels: Option<Vec<i16>>,
    values: Vec<T>,
) -> DataPage<T> {
    let num_values = def_levels
        .as_ref()
        .map(|d| d.len())
        .or_else(|| rep_levels.as_ref().map(|r| r.len()))
        .unwrap_or(values.len());

    DataPage::new(
        num_values,
        def_levels.map(|d| Box::new(MemoryLevelDecoder::new(d)) as Box<dyn LevelDecoder>),
        rep_levels.map(|r| Box::new(MemoryLevelDecoder::new(r)) as Box<dyn LevelDecoder>),
        Box::new(MemoryValueDecoder::new(values)),
    )
}
