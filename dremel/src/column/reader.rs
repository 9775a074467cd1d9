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

//! Contains the column chunk reader, a thin facade over the external page
//! reader that hands out decoded levels and values one batch at a time.

use crate::data_type::DataType;
use crate::errors::{DremelError, Result};
use crate::column::page::{DataPage, PageReader};
use crate::schema::ColumnDescPtr;

pub mod decoder;

/// Reads decoded levels and values for a given column chunk.
///
/// The reader tracks how far the current page has been consumed and loads
/// the next page on demand. It performs no record delimiting of its own;
/// that is the job of the record reader layered on top.
pub struct GenericColumnReader<T: DataType> {
    descr: ColumnDescPtr,

    page_reader: Option<Box<dyn PageReader<T::T>>>,

    cur_page: Option<DataPage<T::T>>,

    /// The total number of level slots stored in the current data page.
    num_buffered_values: usize,

    /// The number of slots from the current data page consumed so far.
    num_decoded_values: usize,
}

impl<T: DataType> GenericColumnReader<T> {
    /// Creates a new column reader with no page stream attached.
    pub fn new(descr: ColumnDescPtr) -> Self {
        Self {
            descr,
            page_reader: None,
            cur_page: None,
            num_buffered_values: 0,
            num_decoded_values: 0,
        }
    }

    /// Returns the descriptor of the column this reader decodes.
    pub fn descr(&self) -> &ColumnDescPtr {
        &self.descr
    }

    /// Points this reader at a new page stream, typically the next column
    /// chunk. Any partially consumed page is discarded.
    pub fn set_page_reader(&mut self, page_reader: Box<dyn PageReader<T::T>>) {
        self.page_reader = Some(page_reader);
        self.cur_page = None;
        self.num_buffered_values = 0;
        self.num_decoded_values = 0;
    }

    /// True when a page stream is attached.
    pub fn has_page_reader(&self) -> bool {
        self.page_reader.is_some()
    }

    pub(crate) fn drop_page_reader(&mut self) {
        self.page_reader = None;
        self.cur_page = None;
        self.num_buffered_values = 0;
        self.num_decoded_values = 0;
    }

    /// Returns true if there are still values to pull out of the chunk,
    /// loading the next page when the current one is fully consumed.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.num_buffered_values == 0 || self.num_buffered_values == self.num_decoded_values {
            if !self.read_new_page()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Number of slots remaining in the current page before a new page must
    /// be loaded.
    pub fn num_available_values(&self) -> usize {
        self.num_buffered_values - self.num_decoded_values
    }

    /// Fills `out` with definition levels from the current page, returning
    /// the number read. Short reads occur at page boundaries.
    pub fn read_def_levels(&mut self, out: &mut [i16]) -> Result<usize> {
        let max_level = self.descr.max_def_level();
        let page = self
            .cur_page
            .as_mut()
            .ok_or_else(|| corrupt_err!("no page loaded for definition levels"))?;
        let decoder = page
            .def_level_decoder_mut()
            .ok_or_else(|| corrupt_err!("data page is missing definition levels"))?;
        let levels_read = decoder.read(out)?;
        validate_levels(&out[..levels_read], max_level, "definition")?;
        Ok(levels_read)
    }

    /// Fills `out` with repetition levels from the current page, returning
    /// the number read.
    pub fn read_rep_levels(&mut self, out: &mut [i16]) -> Result<usize> {
        let max_level = self.descr.max_rep_level();
        let page = self
            .cur_page
            .as_mut()
            .ok_or_else(|| corrupt_err!("no page loaded for repetition levels"))?;
        let decoder = page
            .rep_level_decoder_mut()
            .ok_or_else(|| corrupt_err!("data page is missing repetition levels"))?;
        let levels_read = decoder.read(out)?;
        validate_levels(&out[..levels_read], max_level, "repetition")?;
        Ok(levels_read)
    }

    /// Dense decode of exactly `out.len()` values from the current page.
    pub fn decode(&mut self, out: &mut [T::T]) -> Result<usize> {
        let page = self
            .cur_page
            .as_mut()
            .ok_or_else(|| corrupt_err!("no page loaded for values"))?;
        page.value_decoder_mut().decode(out)
    }

    /// Spaced decode of `out.len() - null_count` values into the set-bit
    /// positions of `out`.
    pub fn decode_spaced(
        &mut self,
        out: &mut [T::T],
        null_count: usize,
        valid_bits: &[u8],
        valid_bits_offset: usize,
    ) -> Result<usize> {
        let page = self
            .cur_page
            .as_mut()
            .ok_or_else(|| corrupt_err!("no page loaded for values"))?;
        page.value_decoder_mut()
            .decode_spaced(out, null_count, valid_bits, valid_bits_offset)
    }

    /// Declares that `num` slots of the current page were consumed, keeping
    /// the page cursor aligned with the record reader.
    pub fn consume_buffered_values(&mut self, num: usize) {
        self.num_decoded_values += num;
    }

    /// Loads the next non-empty page. Returns false if there is no page left.
    fn read_new_page(&mut self) -> Result<bool> {
        let page_reader = match self.page_reader.as_mut() {
            Some(r) => r,
            None => return Ok(false),
        };
        loop {
            match page_reader.get_next_page()? {
                None => return Ok(false),
                Some(page) => {
                    if page.num_values() == 0 {
                        continue;
                    }
                    self.num_buffered_values = page.num_values();
                    self.num_decoded_values = 0;
                    self.cur_page = Some(page);
                    return Ok(true);
                }
            }
        }
    }
}

fn validate_levels(levels: &[i16], max_level: i16, kind: &str) -> Result<()> {
    for &level in levels {
        if level < 0 || level > max_level {
            return Err(DremelError::Corrupt(format!(
                "{kind} level {level} out of range [0, {max_level}]"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::Type;
    use crate::data_type::Int32Type;
    use crate::schema::ColumnDescriptor;
    use crate::util::test_common::page_util::{page, MemoryPageReader};
    use std::sync::Arc;

    fn optional_int32() -> ColumnDescPtr {
        Arc::new(ColumnDescriptor::new("leaf", Type::INT32, 1, 0))
    }

    #[test]
    fn test_read_levels_across_pages() {
        let mut reader = GenericColumnReader::<Int32Type>::new(optional_int32());
        reader.set_page_reader(Box::new(MemoryPageReader::new(vec![
            page(Some(vec![1, 0, 1]), None, vec![5, 6]),
            page(Some(vec![1]), None, vec![7]),
        ])));

        let mut out = vec![0i16; 8];
        assert!(reader.has_next().unwrap());
        assert_eq!(reader.num_available_values(), 3);
        assert_eq!(reader.read_def_levels(&mut out).unwrap(), 3);
        assert_eq!(&out[..3], &[1, 0, 1]);

        let mut values = vec![0i32; 2];
        assert_eq!(reader.decode(&mut values).unwrap(), 2);
        assert_eq!(values, vec![5, 6]);
        reader.consume_buffered_values(3);

        // first page exhausted, the second one is loaded on demand
        assert!(reader.has_next().unwrap());
        assert_eq!(reader.num_available_values(), 1);
        assert_eq!(reader.read_def_levels(&mut out).unwrap(), 1);
        reader.consume_buffered_values(1);
        assert!(!reader.has_next().unwrap());
    }

    #[test]
    fn test_out_of_range_level_is_corrupt() {
        let mut reader = GenericColumnReader::<Int32Type>::new(optional_int32());
        reader.set_page_reader(Box::new(MemoryPageReader::new(vec![page(
            Some(vec![1, 2]),
            None,
            vec![5],
        )])));

        let mut out = vec![0i16; 2];
        assert!(reader.has_next().unwrap());
        let err = reader.read_def_levels(&mut out).unwrap_err();
        assert!(matches!(err, DremelError::Corrupt(_)), "{err}");
    }

    #[test]
    fn test_missing_rep_levels_is_corrupt() {
        let descr = Arc::new(ColumnDescriptor::new("leaf", Type::INT32, 1, 1));
        let mut reader = GenericColumnReader::<Int32Type>::new(descr);
        reader.set_page_reader(Box::new(MemoryPageReader::new(vec![page(
            Some(vec![1]),
            None,
            vec![5],
        )])));

        let mut out = vec![0i16; 1];
        assert!(reader.has_next().unwrap());
        let err = reader.read_rep_levels(&mut out).unwrap_err();
        assert!(matches!(err, DremelError::Corrupt(_)), "{err}");
    }

    #[test]
    fn test_empty_pages_are_skipped() {
        let mut reader = GenericColumnReader::<Int32Type>::new(optional_int32());
        reader.set_page_reader(Box::new(MemoryPageReader::new(vec![
            page(Some(vec![]), None, vec![]),
            page(Some(vec![1]), None, vec![9]),
        ])));

        assert!(reader.has_next().unwrap());
        assert_eq!(reader.num_available_values(), 1);
    }

    #[test]
    fn test_no_page_reader() {
        let mut reader = GenericColumnReader::<Int32Type>::new(optional_int32());
        assert!(!reader.has_page_reader());
        assert!(!reader.has_next().unwrap());
    }
}
