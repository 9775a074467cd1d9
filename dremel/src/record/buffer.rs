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

//! Growable, typed views over [`MutableBuffer`] plus the capacity math used
//! when sizing them from untrusted inputs.

use std::marker::PhantomData;
use std::mem;

use arrow_buffer::{Buffer, MutableBuffer};

use crate::data_type::FixedLenType;
use crate::errors::Result;

/// Allocation targets at or above this limit are treated as corrupt input.
const MAX_ALLOCATION: usize = 1 << 62;

/// Returns the capacity needed to hold `size + extra` items: `cap` when it
/// already suffices, otherwise the next power of two of the target.
///
/// Overflowing the addition or reaching 2^62 fails with `Corrupt` and leaves
/// the caller's state untouched.
pub(crate) fn update_capacity(cap: usize, size: usize, extra: usize) -> Result<usize> {
    let target = size
        .checked_add(extra)
        .ok_or_else(|| corrupt_err!("allocation size too large (corrupt file?)"))?;
    if target >= MAX_ALLOCATION {
        return Err(corrupt_err!("allocation size too large (corrupt file?)"));
    }
    if cap >= target {
        return Ok(cap);
    }
    Ok(target.next_power_of_two())
}

/// A resizable buffer of fixed-width values.
///
/// Shrinking only trims the logical length; the allocation is retained so
/// readers can reuse it across batches. [`TypedBuffer::take`] transfers the
/// populated prefix out as an immutable [`Buffer`] and installs a fresh
/// empty allocation in its place.
pub(crate) struct TypedBuffer<T: FixedLenType> {
    buffer: MutableBuffer,

    /// Length in elements of size T
    len: usize,

    _phantom: PhantomData<T>,
}

impl<T: FixedLenType> Default for TypedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FixedLenType> TypedBuffer<T> {
    pub fn new() -> Self {
        Self {
            buffer: MutableBuffer::new(0),
            len: 0,
            _phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Grows or shrinks the logical length to `new_len` elements, zero
    /// filling any newly exposed region. Fails with `Corrupt` when the byte
    /// size would overflow.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        let num_bytes = new_len
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| corrupt_err!("allocation size too large (corrupt file?)"))?;
        self.buffer.resize(num_bytes, 0);
        self.len = new_len;
        Ok(())
    }

    /// Shrinks the logical length without releasing the allocation.
    pub fn truncate(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.len);
        self.buffer.truncate(new_len * mem::size_of::<T>());
        self.len = new_len;
    }

    pub fn as_slice(&self) -> &[T] {
        let (prefix, values, suffix) = unsafe { self.buffer.as_slice().align_to::<T>() };
        assert!(prefix.is_empty() && suffix.is_empty());
        values
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        let (prefix, values, suffix) = unsafe { self.buffer.as_slice_mut().align_to_mut::<T>() };
        assert!(prefix.is_empty() && suffix.is_empty());
        values
    }

    /// Raw view of the populated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Trims the buffer to `new_len` elements and transfers it to the
    /// caller; the replacement starts empty and is grown lazily.
    pub fn take(&mut self, new_len: usize) -> Buffer {
        self.truncate(new_len);
        self.len = 0;
        mem::replace(&mut self.buffer, MutableBuffer::new(0)).into()
    }
}
