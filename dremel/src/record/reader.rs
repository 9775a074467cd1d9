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

use std::cmp::{max, min};
use std::sync::atomic::{AtomicI64, Ordering};

use arrow_array::ArrayRef;
use arrow_buffer::Buffer;

use crate::column::page::PageReader;
use crate::column::reader::GenericColumnReader;
use crate::data_type::DataType;
use crate::errors::Result;
use crate::record::buffer::{update_capacity, TypedBuffer};
use crate::record::levels::{def_levels_to_bitmap, LevelInfo, ValidityBitmapInputOutput};
use crate::record::reader::values::{BinaryValuesBuffer, ValuesBuffer};
use crate::schema::ColumnDescPtr;

pub mod values;

/// Levels are pulled from the decoder in batches of at least this many slots
/// so small record requests don't cause tiny decoder round trips.
const MIN_BATCH_SIZE: usize = 1024;

/// A stateful column reader that delimits semantic records.
///
/// Levels and values are accumulated across calls to
/// [`read_records`](Self::read_records) until the caller detaches the
/// finished buffers and calls [`reset`](Self::reset). A single logical
/// record may span any number of leaf values and may straddle page and
/// chunk boundaries; the reader guarantees each record is counted exactly
/// once.
///
/// Readers are not safe for concurrent mutation; only the reference count
/// is thread-safe.
pub struct GenericRecordReader<V: ValuesBuffer> {
    descr: ColumnDescPtr,
    leaf_info: LevelInfo,

    column_reader: GenericColumnReader<V::Type>,
    values: V,

    def_levels: TypedBuffer<i16>,
    rep_levels: TypedBuffer<i16>,

    levels_written: usize,
    levels_pos: usize,
    levels_cap: usize,

    records_read: usize,
    at_record_start: bool,

    ref_count: AtomicI64,
}

impl<V: ValuesBuffer> GenericRecordReader<V> {
    /// Creates a record reader for the column described by `descr`.
    pub fn new(descr: ColumnDescPtr, leaf_info: LevelInfo) -> Self {
        let values = V::new(&descr);
        Self {
            column_reader: GenericColumnReader::new(descr.clone()),
            descr,
            leaf_info,
            values,
            def_levels: TypedBuffer::new(),
            rep_levels: TypedBuffer::new(),
            levels_written: 0,
            levels_pos: 0,
            levels_cap: 0,
            records_read: 0,
            at_record_start: true,
            ref_count: AtomicI64::new(1),
        }
    }

    /// Points this reader at the page stream of the next column chunk.
    ///
    /// Accumulated levels and values are preserved; they belong to the
    /// logical record reader, not the physical page stream. The delimiter is
    /// re-armed so the opening repetition level of the new chunk is not
    /// mistaken for the close of an already counted record.
    pub fn set_page_reader(&mut self, page_reader: Box<dyn PageReader<<V::Type as DataType>::T>>) {
        self.at_record_start = true;
        self.column_reader.set_page_reader(page_reader);
    }

    /// True if there is a column chunk attached that has not been drained by
    /// a fatal error.
    pub fn has_more(&self) -> bool {
        self.column_reader.has_page_reader()
    }

    /// Attempts to read `num_records` records, returning the number of
    /// complete records materialized.
    ///
    /// Fewer records are returned only when the column chunk is exhausted.
    /// A record left open by the end of the chunk is counted as complete
    /// exactly once. Errors are fatal: the reader drains and `has_more`
    /// reports false afterwards.
    pub fn read_records(&mut self, num_records: usize) -> Result<usize> {
        match self.read_records_inner(num_records) {
            Ok(records_read) => Ok(records_read),
            Err(e) => {
                self.column_reader.drop_page_reader();
                Err(e)
            }
        }
    }

    fn read_records_inner(&mut self, num_records: usize) -> Result<usize> {
        let mut records_read = 0;

        // levels decoded by a previous call may already delimit some of the
        // requested records
        if self.levels_pos < self.levels_written {
            records_read += self.read_record_data(num_records)?;
        }

        let level_batch = max(MIN_BATCH_SIZE, num_records);

        // if we are in the middle of a record, continue until reaching the
        // desired number of records or the end of the current record if we
        // have enough
        while !self.at_record_start || records_read < num_records {
            if !self.column_reader.has_next()? {
                if !self.at_record_start {
                    // the chunk ended while inside a record whose close we
                    // have not seen; count it here, exactly once
                    records_read += 1;
                    self.records_read += 1;
                    self.at_record_start = true;
                }
                break;
            }

            let batch_size = min(level_batch, self.column_reader.num_available_values());
            if batch_size == 0 {
                break;
            }

            if self.descr.max_def_level() > 0 {
                self.reserve_levels(batch_size)?;

                let levels_written = self.levels_written;
                let levels_read = self.column_reader.read_def_levels(
                    &mut self.def_levels.as_slice_mut()[levels_written..levels_written + batch_size],
                )?;

                if self.descr.max_rep_level() > 0 {
                    let rep_levels_read = self.column_reader.read_rep_levels(
                        &mut self.rep_levels.as_slice_mut()
                            [levels_written..levels_written + batch_size],
                    )?;
                    if rep_levels_read != levels_read {
                        return Err(corrupt_err!(
                            "number of decoded repetition and definition levels did not match ({} vs {})",
                            rep_levels_read,
                            levels_read
                        ));
                    }
                }

                if levels_read == 0 {
                    break;
                }

                self.levels_written += levels_read;
                records_read += self.read_record_data(num_records - records_read)?;
            } else {
                // no levels at all, values map one to one onto records
                let batch_size = min(num_records - records_read, batch_size);
                records_read += self.read_record_data(batch_size)?;
            }
        }

        Ok(records_read)
    }

    /// Delimits up to `num_records` records in the already decoded window
    /// `[levels_pos, levels_written)`, decodes the matching values and
    /// updates all counters. Returns the number of records completed.
    fn read_record_data(&mut self, num_records: usize) -> Result<usize> {
        let possible_num = max(num_records, self.levels_written - self.levels_pos);
        self.values
            .reserve(possible_num, self.leaf_info.has_nullable_values())?;

        let start_pos = self.levels_pos;

        let (records_read, mut values_to_read) = if self.descr.max_rep_level() > 0 {
            self.delimit_records(num_records)
        } else if self.descr.max_def_level() > 0 {
            // no repetition levels, each level is exactly one record
            let records = min(self.levels_written - self.levels_pos, num_records);
            self.levels_pos += records;
            (records, 0)
        } else {
            (num_records, num_records)
        };

        let mut null_count = 0;
        if self.leaf_info.has_nullable_values() {
            let valid_bits_offset = self.values.values_written();
            let mut validity_io = ValidityBitmapInputOutput {
                read_upper_bound: self.levels_pos - start_pos,
                read: 0,
                null_count: 0,
                valid_bits: self.values.valid_bits_mut(),
                valid_bits_offset,
            };
            def_levels_to_bitmap(
                &self.def_levels.as_slice()[start_pos..self.levels_pos],
                self.leaf_info,
                &mut validity_io,
            )?;
            let values_with_nulls = validity_io.read;
            null_count = validity_io.null_count;
            values_to_read = values_with_nulls - null_count;
            self.values
                .read_spaced(&mut self.column_reader, values_with_nulls, null_count)?;
        } else {
            self.values.read_dense(&mut self.column_reader, values_to_read)?;
        }

        if self.leaf_info.def_level > 0 {
            self.column_reader
                .consume_buffered_values(self.levels_pos - start_pos);
        } else {
            self.column_reader.consume_buffered_values(values_to_read);
        }

        // total slots, including null placeholders if any
        self.values.increment_written(values_to_read + null_count, null_count);
        self.records_read += records_read;
        Ok(records_read)
    }

    /// Scans buffered repetition levels for record boundaries, consuming no
    /// more levels than needed to delimit `num_records` records. Returns the
    /// records completed and the number of physical values to decode.
    fn delimit_records(&mut self, num_records: usize) -> (usize, usize) {
        let mut records_read = 0;
        let mut values_to_read = 0;
        let max_def_level = self.descr.max_def_level();

        let def_levels = self.def_levels.as_slice();
        let rep_levels = self.rep_levels.as_slice();

        while self.levels_pos < self.levels_written {
            if rep_levels[self.levels_pos] == 0 {
                // a repetition level of zero at the delimiter position while
                // not at a record start closes the previous record; at a
                // record start it is the boundary we already accounted for
                if !self.at_record_start {
                    records_read += 1;
                    if records_read == num_records {
                        // the boundary level belongs to the next record,
                        // leave it unconsumed
                        self.at_record_start = true;
                        break;
                    }
                }
            }

            self.at_record_start = false;
            if def_levels[self.levels_pos] == max_def_level {
                values_to_read += 1;
            }
            self.levels_pos += 1;
        }

        (records_read, values_to_read)
    }

    /// Pre-grows level and value buffers to hold `extra` more slots.
    pub fn reserve(&mut self, extra: usize) -> Result<()> {
        self.reserve_levels(extra)?;
        self.values
            .reserve(extra, self.leaf_info.has_nullable_values())
    }

    fn reserve_levels(&mut self, extra: usize) -> Result<()> {
        if self.descr.max_def_level() > 0 {
            let new_cap = update_capacity(self.levels_cap, self.levels_written, extra)?;
            if new_cap > self.levels_cap {
                self.def_levels.resize(new_cap)?;
                if self.descr.max_rep_level() > 0 {
                    self.rep_levels.resize(new_cap)?;
                }
                self.levels_cap = new_cap;
            }
        }
        Ok(())
    }

    /// Discards completed values and levels. Levels decoded but not yet
    /// consumed by the delimiter are shifted to the front of their buffers
    /// so records can be read in arbitrarily small batches without loss.
    pub fn reset(&mut self) {
        self.values.reset();

        if self.levels_written > 0 {
            let remaining = self.levels_written - self.levels_pos;

            self.def_levels
                .as_slice_mut()
                .copy_within(self.levels_pos..self.levels_written, 0);
            self.def_levels.truncate(remaining);

            if self.descr.max_rep_level() > 0 {
                self.rep_levels
                    .as_slice_mut()
                    .copy_within(self.levels_pos..self.levels_written, 0);
                self.rep_levels.truncate(remaining);
            }

            self.levels_written -= self.levels_pos;
            self.levels_pos = 0;
            self.levels_cap = remaining;
        }

        self.records_read = 0;
    }

    /// Returns the decoded definition levels, including slots beyond the
    /// delimiter position.
    pub fn def_levels(&self) -> &[i16] {
        self.def_levels.as_slice()
    }

    /// Returns the decoded repetition levels.
    pub fn rep_levels(&self) -> &[i16] {
        self.rep_levels.as_slice()
    }

    /// Number of decoded levels already consumed by the delimiter.
    pub fn levels_pos(&self) -> usize {
        self.levels_pos
    }

    /// Number of value slots written, null placeholders included.
    pub fn values_written(&self) -> usize {
        self.values.values_written()
    }

    /// Number of nulls among the written slots.
    pub fn null_count(&self) -> usize {
        self.values.null_count()
    }

    /// Records completed since the last [`reset`](Self::reset).
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Returns the packed value bytes without transferring ownership.
    pub fn values(&self) -> &[u8] {
        self.values.values()
    }

    /// Transfers the packed values buffer to the caller, trimmed to the
    /// populated length; a fresh buffer is allocated lazily for further
    /// reads.
    pub fn release_values(&mut self) -> Buffer {
        self.values.release_values()
    }

    /// Transfers the validity bitmap to the caller, or `None` when the
    /// column cannot contain nulls.
    pub fn release_valid_bits(&mut self) -> Option<Buffer> {
        self.leaf_info
            .has_nullable_values()
            .then(|| self.values.release_valid_bits())
    }

    /// Returns the descriptor of the column being read.
    pub fn descr(&self) -> &ColumnDescPtr {
        &self.descr
    }

    /// Increments the reference count by one.
    pub fn retain(&self) {
        self.ref_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements the reference count by one, releasing the internal
    /// buffers when it reaches zero.
    pub fn release(&mut self) {
        debug_assert!(self.ref_count.load(Ordering::Acquire) > 0, "too many releases");
        if self.ref_count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.values.clear();
            self.def_levels = TypedBuffer::new();
            self.rep_levels = TypedBuffer::new();
            self.levels_written = 0;
            self.levels_pos = 0;
            self.levels_cap = 0;
        }
    }
}

impl<V: BinaryValuesBuffer> GenericRecordReader<V> {
    /// Finalizes the accumulated variable-length values into immutable
    /// arrays.
    pub fn get_builder_chunks(&mut self) -> Vec<ArrayRef> {
        self.values.get_builder_chunks()
    }
}
