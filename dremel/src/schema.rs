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

//! Leaf column descriptors.
//!
//! The full schema tree lives in the file layer; record assembly only needs
//! the per-leaf facts captured by [`ColumnDescriptor`].

use std::sync::Arc;

use crate::basic::{ConvertedType, Type};

/// A descriptor for a leaf column: its physical type and the maximum
/// definition and repetition levels its nesting path can produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    name: String,
    physical_type: Type,
    converted_type: ConvertedType,
    type_length: i32,
    max_def_level: i16,
    max_rep_level: i16,
}

impl ColumnDescriptor {
    /// Creates a new descriptor for a leaf column.
    pub fn new(
        name: impl Into<String>,
        physical_type: Type,
        max_def_level: i16,
        max_rep_level: i16,
    ) -> Self {
        Self {
            name: name.into(),
            physical_type,
            converted_type: ConvertedType::NONE,
            type_length: -1,
            max_def_level,
            max_rep_level,
        }
    }

    /// Sets the value width for `FIXED_LEN_BYTE_ARRAY` columns.
    pub fn with_type_length(mut self, type_length: i32) -> Self {
        self.type_length = type_length;
        self
    }

    /// Sets the converted type annotation.
    pub fn with_converted_type(mut self, converted_type: ConvertedType) -> Self {
        self.converted_type = converted_type;
        self
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the physical type of this column.
    pub fn physical_type(&self) -> Type {
        self.physical_type
    }

    /// Returns the converted type annotation.
    pub fn converted_type(&self) -> ConvertedType {
        self.converted_type
    }

    /// Returns the value width for fixed-length byte array columns,
    /// `-1` otherwise.
    pub fn type_length(&self) -> i32 {
        self.type_length
    }

    /// Returns the maximum definition level of this column.
    pub fn max_def_level(&self) -> i16 {
        self.max_def_level
    }

    /// Returns the maximum repetition level of this column.
    pub fn max_rep_level(&self) -> i16 {
        self.max_rep_level
    }
}

/// Reference counted pointer for a [`ColumnDescriptor`].
pub type ColumnDescPtr = Arc<ColumnDescriptor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let descr = ColumnDescriptor::new("leaf", Type::INT32, 1, 0);
        assert_eq!(descr.name(), "leaf");
        assert_eq!(descr.physical_type(), Type::INT32);
        assert_eq!(descr.converted_type(), ConvertedType::NONE);
        assert_eq!(descr.type_length(), -1);
        assert_eq!(descr.max_def_level(), 1);
        assert_eq!(descr.max_rep_level(), 0);
    }

    #[test]
    fn test_descriptor_builders() {
        let descr = ColumnDescriptor::new("id", Type::FIXED_LEN_BYTE_ARRAY, 0, 0)
            .with_type_length(16)
            .with_converted_type(ConvertedType::NONE);
        assert_eq!(descr.type_length(), 16);
    }
}
