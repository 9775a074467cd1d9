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

//! Data types that connect a physical [`Type`] to the in-memory
//! representation decoded values take.

use std::mem;
use std::ops::{Deref, DerefMut};

use bytes::Bytes;

use crate::basic::Type;

/// Value of a 96-bit signed integer column.
///
/// Stored as three little-endian 32-bit words, matching the on-disk layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Int96 {
    value: [u32; 3],
}

impl Int96 {
    /// Creates a zeroed `Int96` value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying little-endian words.
    pub fn data(&self) -> &[u32] {
        &self.value
    }

    /// Sets the data for this `Int96` from the three little-endian words.
    pub fn set_data(&mut self, elem0: u32, elem1: u32, elem2: u32) {
        self.value = [elem0, elem1, elem2];
    }
}

impl From<[u32; 3]> for Int96 {
    fn from(value: [u32; 3]) -> Self {
        Self { value }
    }
}

/// Value of a variable-length byte array column.
///
/// The payload is reference counted, cloning is cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteArray {
    data: Option<Bytes>,
}

impl ByteArray {
    /// Creates an empty byte array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the length of the underlying byte array.
    pub fn len(&self) -> usize {
        assert!(self.data.is_some());
        self.data.as_ref().unwrap().len()
    }

    /// Checks if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slice of bytes backing this value.
    pub fn data(&self) -> &[u8] {
        self.data
            .as_ref()
            .expect("set_data should have been called")
            .as_ref()
    }

    /// Set data from another byte buffer.
    pub fn set_data(&mut self, data: Bytes) {
        self.data = Some(data);
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(buf: Vec<u8>) -> ByteArray {
        Self {
            data: Some(buf.into()),
        }
    }
}

impl From<&str> for ByteArray {
    fn from(s: &str) -> ByteArray {
        Self {
            data: Some(Bytes::copy_from_slice(s.as_bytes())),
        }
    }
}

impl From<Bytes> for ByteArray {
    fn from(value: Bytes) -> Self {
        Self { data: Some(value) }
    }
}

/// Value of a fixed-length byte array column. Wraps [`ByteArray`], the
/// width is carried by the column descriptor rather than each value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedLenByteArray(ByteArray);

impl FixedLenByteArray {
    /// Creates an empty fixed-length byte array.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for FixedLenByteArray {
    type Target = ByteArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FixedLenByteArray {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<ByteArray> for FixedLenByteArray {
    fn from(other: ByteArray) -> Self {
        Self(other)
    }
}

impl From<Vec<u8>> for FixedLenByteArray {
    fn from(buf: Vec<u8>) -> Self {
        Self(ByteArray::from(buf))
    }
}

/// Marker for fixed-width value types that may live in a flat, zero
/// initialized byte buffer and be viewed through a typed slice.
///
/// The all-zeroes bit pattern must be a valid value of the type.
pub trait FixedLenType: Copy + Default + Send + 'static {}

impl FixedLenType for bool {}
impl FixedLenType for u8 {}
impl FixedLenType for i16 {}
impl FixedLenType for i32 {}
impl FixedLenType for i64 {}
impl FixedLenType for f32 {}
impl FixedLenType for f64 {}
impl FixedLenType for Int96 {}

/// Contains the in-memory representation for a physical column type.
pub trait DataType: 'static + Send {
    /// The decoded value type.
    type T: Clone + Default + std::fmt::Debug + PartialEq + Send + 'static;

    /// Returns the physical type tag.
    fn get_physical_type() -> Type;

    /// Returns the size in bytes of one decoded value.
    fn get_type_size() -> usize;
}

macro_rules! make_type {
    ($name:ident, $physical_ty:path, $native_ty:ty, $size:expr) => {
        /// Marker connecting a physical type to its in-memory value type.
        #[derive(Clone)]
        pub struct $name {}

        impl DataType for $name {
            type T = $native_ty;

            fn get_physical_type() -> Type {
                $physical_ty
            }

            fn get_type_size() -> usize {
                $size
            }
        }
    };
}

make_type!(BoolType, Type::BOOLEAN, bool, 1);
make_type!(Int32Type, Type::INT32, i32, 4);
make_type!(Int64Type, Type::INT64, i64, 8);
make_type!(Int96Type, Type::INT96, Int96, mem::size_of::<Int96>());
make_type!(FloatType, Type::FLOAT, f32, 4);
make_type!(DoubleType, Type::DOUBLE, f64, 8);
make_type!(
    ByteArrayType,
    Type::BYTE_ARRAY,
    ByteArray,
    mem::size_of::<ByteArray>()
);
make_type!(
    FixedLenByteArrayType,
    Type::FIXED_LEN_BYTE_ARRAY,
    FixedLenByteArray,
    mem::size_of::<FixedLenByteArray>()
);
