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

//! Storage strategies for decoded values: a flat packed buffer for
//! fixed-width types, array builders for the variable-length types.

use std::str;
use std::sync::Arc;

use arrow_array::builder::{BinaryBuilder, FixedSizeBinaryBuilder, StringBuilder};
use arrow_array::ArrayRef;
use arrow_buffer::{bit_util, Buffer, MutableBuffer};

use crate::basic::ConvertedType;
use crate::column::reader::GenericColumnReader;
use crate::data_type::{
    ByteArray, ByteArrayType, DataType, FixedLenByteArray, FixedLenByteArrayType, FixedLenType,
};
use crate::errors::Result;
use crate::record::buffer::{update_capacity, TypedBuffer};
use crate::schema::ColumnDescPtr;

/// Value storage driven by the record reader.
///
/// Implementations own the decoded values, the validity bitmap and the slot
/// accounting; the record reader decides how many values to pull and where
/// record boundaries fall.
pub trait ValuesBuffer: Sized {
    /// The physical type decoded into this buffer.
    type Type: DataType;

    /// Creates an empty buffer for the given column.
    fn new(descr: &ColumnDescPtr) -> Self;

    /// Grows the storage so `extra` more slots fit beyond those written,
    /// growing the validity bitmap alongside when `has_nullable` is set.
    fn reserve(&mut self, extra: usize, has_nullable: bool) -> Result<()>;

    /// Decodes `to_read` values densely onto the tail of the buffer.
    fn read_dense(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        to_read: usize,
    ) -> Result<()>;

    /// Decodes `values_with_nulls - null_count` values, spaced out so slots
    /// whose validity bit is cleared are skipped in the source stream but
    /// keep their position in the destination.
    fn read_spaced(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        values_with_nulls: usize,
        null_count: usize,
    ) -> Result<()>;

    /// Slots written so far, nulls included.
    fn values_written(&self) -> usize;

    /// Nulls among the written slots.
    fn null_count(&self) -> usize;

    /// Records that `written` more slots were populated, `nulls` of them null.
    fn increment_written(&mut self, written: usize, nulls: usize);

    /// The validity bitmap bytes.
    fn valid_bits(&self) -> &[u8];

    /// Mutable view of the validity bitmap, for level projection.
    fn valid_bits_mut(&mut self) -> &mut [u8];

    /// The raw bytes of the packed values buffer.
    fn values(&self) -> &[u8];

    /// Clears counters and logical lengths; allocations are retained.
    fn reset(&mut self);

    /// Transfers the packed values out, trimmed to the populated length.
    fn release_values(&mut self) -> Buffer;

    /// Transfers the validity bitmap out, trimmed to the populated length.
    fn release_valid_bits(&mut self) -> Buffer;

    /// Drops the underlying allocations. Called on final release.
    fn clear(&mut self);
}

/// Builder-backed storage with chunked array output.
pub trait BinaryValuesBuffer: ValuesBuffer {
    /// Finalizes the accumulated values into immutable arrays.
    fn get_builder_chunks(&mut self) -> Vec<ArrayRef>;
}

// ----------------------------------------------------------------------
// Fixed-width types

/// Flat, tightly packed storage for fixed-width physical types.
pub struct PrimitiveValuesBuffer<T: DataType>
where
    T::T: FixedLenType,
{
    values: TypedBuffer<T::T>,
    valid_bits: TypedBuffer<u8>,
    values_written: usize,
    values_cap: usize,
    null_count: usize,
}

impl<T: DataType> ValuesBuffer for PrimitiveValuesBuffer<T>
where
    T::T: FixedLenType,
{
    type Type = T;

    fn new(_descr: &ColumnDescPtr) -> Self {
        Self {
            values: TypedBuffer::new(),
            valid_bits: TypedBuffer::new(),
            values_written: 0,
            values_cap: 0,
            null_count: 0,
        }
    }

    fn reserve(&mut self, extra: usize, has_nullable: bool) -> Result<()> {
        let new_cap = update_capacity(self.values_cap, self.values_written, extra)?;
        if new_cap > self.values_cap {
            self.values.resize(new_cap)?;
            self.values_cap = new_cap;
        }
        if has_nullable {
            let valid_bytes_cap = bit_util::ceil(self.values_cap, 8);
            if self.valid_bits.len() < valid_bytes_cap {
                self.valid_bits.resize(valid_bytes_cap)?;
            }
        }
        Ok(())
    }

    fn read_dense(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        to_read: usize,
    ) -> Result<()> {
        let start = self.values_written;
        let out = &mut self.values.as_slice_mut()[start..start + to_read];
        let values_read = reader.decode(out)?;
        if values_read != to_read {
            return Err(decode_err!(
                "expected {} values from decoder, got {}",
                to_read,
                values_read
            ));
        }
        Ok(())
    }

    fn read_spaced(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        values_with_nulls: usize,
        null_count: usize,
    ) -> Result<()> {
        let start = self.values_written;
        let valid_bits = self.valid_bits.as_slice();
        let out = &mut self.values.as_slice_mut()[start..start + values_with_nulls];
        let values_read = reader.decode_spaced(out, null_count, valid_bits, start)?;
        let expected = values_with_nulls - null_count;
        if values_read != expected {
            return Err(decode_err!(
                "expected {} values from spaced decoder, got {}",
                expected,
                values_read
            ));
        }
        Ok(())
    }

    fn values_written(&self) -> usize {
        self.values_written
    }

    fn null_count(&self) -> usize {
        self.null_count
    }

    fn increment_written(&mut self, written: usize, nulls: usize) {
        self.values_written += written;
        self.null_count += nulls;
    }

    fn valid_bits(&self) -> &[u8] {
        self.valid_bits.as_bytes()
    }

    fn valid_bits_mut(&mut self) -> &mut [u8] {
        self.valid_bits.as_slice_mut()
    }

    fn values(&self) -> &[u8] {
        self.values.as_bytes()
    }

    fn reset(&mut self) {
        if self.values_written > 0 {
            self.values.truncate(0);
            self.valid_bits.truncate(0);
            self.values_written = 0;
            self.values_cap = 0;
            self.null_count = 0;
        }
    }

    fn release_values(&mut self) -> Buffer {
        let out = self.values.take(self.values_written);
        self.values_cap = 0;
        out
    }

    fn release_valid_bits(&mut self) -> Buffer {
        self.valid_bits
            .take(bit_util::ceil(self.values_written, 8))
    }

    fn clear(&mut self) {
        self.values = TypedBuffer::new();
        self.valid_bits = TypedBuffer::new();
        self.values_written = 0;
        self.values_cap = 0;
        self.null_count = 0;
    }
}

// ----------------------------------------------------------------------
// Byte arrays

enum ByteArrayBuilderKind {
    Binary(BinaryBuilder),
    Utf8(StringBuilder),
}

impl ByteArrayBuilderKind {
    fn append_value(&mut self, value: &ByteArray) -> Result<()> {
        match self {
            Self::Binary(builder) => builder.append_value(value.data()),
            Self::Utf8(builder) => builder.append_value(str::from_utf8(value.data())?),
        }
        Ok(())
    }

    fn append_null(&mut self) {
        match self {
            Self::Binary(builder) => builder.append_null(),
            Self::Utf8(builder) => builder.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Binary(builder) => Arc::new(builder.finish()),
            Self::Utf8(builder) => Arc::new(builder.finish()),
        }
    }
}

/// Builder-backed storage for `BYTE_ARRAY` columns. Decodes into a scratch
/// slice, then appends value-or-null per slot; the scratch and the slot
/// counters reset after every read.
pub struct ByteArrayValuesBuffer {
    builder: ByteArrayBuilderKind,
    scratch: Vec<ByteArray>,
    valid_bits: TypedBuffer<u8>,
    values_written: usize,
    values_cap: usize,
    null_count: usize,
}

impl ValuesBuffer for ByteArrayValuesBuffer {
    type Type = ByteArrayType;

    fn new(descr: &ColumnDescPtr) -> Self {
        let builder = match descr.converted_type() {
            ConvertedType::UTF8 => ByteArrayBuilderKind::Utf8(StringBuilder::new()),
            ConvertedType::NONE => ByteArrayBuilderKind::Binary(BinaryBuilder::new()),
        };
        Self {
            builder,
            scratch: Vec::new(),
            valid_bits: TypedBuffer::new(),
            values_written: 0,
            values_cap: 0,
            null_count: 0,
        }
    }

    fn reserve(&mut self, extra: usize, has_nullable: bool) -> Result<()> {
        let new_cap = update_capacity(self.values_cap, self.values_written, extra)?;
        if new_cap > self.values_cap {
            self.values_cap = new_cap;
        }
        if has_nullable {
            let valid_bytes_cap = bit_util::ceil(self.values_cap, 8);
            if self.valid_bits.len() < valid_bytes_cap {
                self.valid_bits.resize(valid_bytes_cap)?;
            }
        }
        Ok(())
    }

    fn read_dense(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        to_read: usize,
    ) -> Result<()> {
        self.scratch.clear();
        self.scratch.resize(to_read, ByteArray::default());
        let values_read = reader.decode(&mut self.scratch)?;
        if values_read != to_read {
            return Err(decode_err!(
                "expected {} values from decoder, got {}",
                to_read,
                values_read
            ));
        }
        for value in &self.scratch {
            self.builder.append_value(value)?;
        }
        self.reset();
        Ok(())
    }

    fn read_spaced(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        values_with_nulls: usize,
        null_count: usize,
    ) -> Result<()> {
        self.scratch.clear();
        self.scratch.resize(values_with_nulls, ByteArray::default());
        let offset = self.values_written;
        let values_read = reader.decode_spaced(
            &mut self.scratch,
            null_count,
            self.valid_bits.as_slice(),
            offset,
        )?;
        if values_read != values_with_nulls - null_count {
            return Err(decode_err!(
                "expected {} values from spaced decoder, got {}",
                values_with_nulls - null_count,
                values_read
            ));
        }
        for (idx, value) in self.scratch.iter().enumerate() {
            if bit_util::get_bit(self.valid_bits.as_bytes(), offset + idx) {
                self.builder.append_value(value)?;
            } else {
                self.builder.append_null();
            }
        }
        self.reset();
        Ok(())
    }

    fn values_written(&self) -> usize {
        self.values_written
    }

    fn null_count(&self) -> usize {
        self.null_count
    }

    fn increment_written(&mut self, written: usize, nulls: usize) {
        self.values_written += written;
        self.null_count += nulls;
    }

    fn valid_bits(&self) -> &[u8] {
        self.valid_bits.as_bytes()
    }

    fn valid_bits_mut(&mut self) -> &mut [u8] {
        self.valid_bits.as_slice_mut()
    }

    fn values(&self) -> &[u8] {
        &[]
    }

    fn reset(&mut self) {
        if self.values_written > 0 {
            self.valid_bits.truncate(0);
            self.values_written = 0;
            self.values_cap = 0;
            self.null_count = 0;
        }
    }

    fn release_values(&mut self) -> Buffer {
        MutableBuffer::new(0).into()
    }

    fn release_valid_bits(&mut self) -> Buffer {
        self.valid_bits
            .take(bit_util::ceil(self.values_written, 8))
    }

    fn clear(&mut self) {
        self.builder = match self.builder {
            ByteArrayBuilderKind::Binary(_) => ByteArrayBuilderKind::Binary(BinaryBuilder::new()),
            ByteArrayBuilderKind::Utf8(_) => ByteArrayBuilderKind::Utf8(StringBuilder::new()),
        };
        self.scratch = Vec::new();
        self.valid_bits = TypedBuffer::new();
        self.values_written = 0;
        self.values_cap = 0;
        self.null_count = 0;
    }
}

impl BinaryValuesBuffer for ByteArrayValuesBuffer {
    fn get_builder_chunks(&mut self) -> Vec<ArrayRef> {
        vec![self.builder.finish()]
    }
}

// ----------------------------------------------------------------------
// Fixed length byte arrays

/// Builder-backed storage for `FIXED_LEN_BYTE_ARRAY` columns.
pub struct FixedLenByteArrayValuesBuffer {
    builder: FixedSizeBinaryBuilder,
    byte_width: i32,
    scratch: Vec<FixedLenByteArray>,
    valid_bits: TypedBuffer<u8>,
    values_written: usize,
    values_cap: usize,
    null_count: usize,
}

impl ValuesBuffer for FixedLenByteArrayValuesBuffer {
    type Type = FixedLenByteArrayType;

    fn new(descr: &ColumnDescPtr) -> Self {
        let byte_width = descr.type_length();
        Self {
            builder: FixedSizeBinaryBuilder::new(byte_width),
            byte_width,
            scratch: Vec::new(),
            valid_bits: TypedBuffer::new(),
            values_written: 0,
            values_cap: 0,
            null_count: 0,
        }
    }

    fn reserve(&mut self, extra: usize, has_nullable: bool) -> Result<()> {
        let new_cap = update_capacity(self.values_cap, self.values_written, extra)?;
        if new_cap > self.values_cap {
            self.values_cap = new_cap;
        }
        if has_nullable {
            let valid_bytes_cap = bit_util::ceil(self.values_cap, 8);
            if self.valid_bits.len() < valid_bytes_cap {
                self.valid_bits.resize(valid_bytes_cap)?;
            }
        }
        Ok(())
    }

    fn read_dense(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        to_read: usize,
    ) -> Result<()> {
        self.scratch.clear();
        self.scratch.resize(to_read, FixedLenByteArray::default());
        let values_read = reader.decode(&mut self.scratch)?;
        if values_read != to_read {
            return Err(decode_err!(
                "expected {} values from decoder, got {}",
                to_read,
                values_read
            ));
        }
        for value in &self.scratch {
            self.builder.append_value(value.data())?;
        }
        self.reset();
        Ok(())
    }

    fn read_spaced(
        &mut self,
        reader: &mut GenericColumnReader<Self::Type>,
        values_with_nulls: usize,
        null_count: usize,
    ) -> Result<()> {
        self.scratch.clear();
        self.scratch
            .resize(values_with_nulls, FixedLenByteArray::default());
        let offset = self.values_written;
        let values_read = reader.decode_spaced(
            &mut self.scratch,
            null_count,
            self.valid_bits.as_slice(),
            offset,
        )?;
        if values_read != values_with_nulls - null_count {
            return Err(decode_err!(
                "expected {} values from spaced decoder, got {}",
                values_with_nulls - null_count,
                values_read
            ));
        }
        for (idx, value) in self.scratch.iter().enumerate() {
            if bit_util::get_bit(self.valid_bits.as_bytes(), offset + idx) {
                self.builder.append_value(value.data())?;
            } else {
                self.builder.append_null();
            }
        }
        self.reset();
        Ok(())
    }

    fn values_written(&self) -> usize {
        self.values_written
    }

    fn null_count(&self) -> usize {
        self.null_count
    }

    fn increment_written(&mut self, written: usize, nulls: usize) {
        self.values_written += written;
        self.null_count += nulls;
    }

    fn valid_bits(&self) -> &[u8] {
        self.valid_bits.as_bytes()
    }

    fn valid_bits_mut(&mut self) -> &mut [u8] {
        self.valid_bits.as_slice_mut()
    }

    fn values(&self) -> &[u8] {
        &[]
    }

    fn reset(&mut self) {
        if self.values_written > 0 {
            self.valid_bits.truncate(0);
            self.values_written = 0;
            self.values_cap = 0;
            self.null_count = 0;
        }
    }

    fn release_values(&mut self) -> Buffer {
        MutableBuffer::new(0).into()
    }

    fn release_valid_bits(&mut self) -> Buffer {
        self.valid_bits
            .take(bit_util::ceil(self.values_written, 8))
    }

    fn clear(&mut self) {
        self.builder = FixedSizeBinaryBuilder::new(self.byte_width);
        self.scratch = Vec::new();
        self.valid_bits = TypedBuffer::new();
        self.values_written = 0;
        self.values_cap = 0;
        self.null_count = 0;
    }
}

impl BinaryValuesBuffer for FixedLenByteArrayValuesBuffer {
    fn get_builder_chunks(&mut self) -> Vec<ArrayRef> {
        vec![Arc::new(self.builder.finish())]
    }
}
