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

//! Record readers: stateful column readers that delimit semantic records
//! according to definition and repetition levels.

pub mod buffer;
pub mod levels;
pub mod reader;

pub use levels::{def_levels_to_bitmap, LevelInfo, ValidityBitmapInputOutput};
pub use reader::values::{
    ByteArrayValuesBuffer, FixedLenByteArrayValuesBuffer, PrimitiveValuesBuffer,
};
pub use reader::GenericRecordReader;

use crate::basic::Type;
use crate::data_type::{
    BoolType, DoubleType, FloatType, Int32Type, Int64Type, Int96Type,
};
use crate::schema::ColumnDescPtr;

/// Record reader for a fixed-width physical type.
pub type RecordReader<T> = GenericRecordReader<PrimitiveValuesBuffer<T>>;

/// Record reader for `BYTE_ARRAY` columns, materializing binary or string
/// arrays.
pub type ByteArrayRecordReader = GenericRecordReader<ByteArrayValuesBuffer>;

/// Record reader for `FIXED_LEN_BYTE_ARRAY` columns.
pub type FixedLenByteArrayRecordReader = GenericRecordReader<FixedLenByteArrayValuesBuffer>;

/// Record reader for any physical column type.
pub enum ColumnRecordReader {
    /// Record reader for boolean columns
    BoolRecordReader(RecordReader<BoolType>),
    /// Record reader for int32 columns
    Int32RecordReader(RecordReader<Int32Type>),
    /// Record reader for int64 columns
    Int64RecordReader(RecordReader<Int64Type>),
    /// Record reader for int96 columns
    Int96RecordReader(RecordReader<Int96Type>),
    /// Record reader for float columns
    FloatRecordReader(RecordReader<FloatType>),
    /// Record reader for double columns
    DoubleRecordReader(RecordReader<DoubleType>),
    /// Record reader for byte array columns
    ByteArrayRecordReader(ByteArrayRecordReader),
    /// Record reader for fixed length byte array columns
    FixedLenByteArrayRecordReader(FixedLenByteArrayRecordReader),
}

/// Creates a record reader for the column described by `descr`, dispatching
/// on the physical type once at construction.
pub fn make_record_reader(descr: ColumnDescPtr, leaf_info: LevelInfo) -> ColumnRecordReader {
    match descr.physical_type() {
        Type::BOOLEAN => {
            ColumnRecordReader::BoolRecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::INT32 => {
            ColumnRecordReader::Int32RecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::INT64 => {
            ColumnRecordReader::Int64RecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::INT96 => {
            ColumnRecordReader::Int96RecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::FLOAT => {
            ColumnRecordReader::FloatRecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::DOUBLE => {
            ColumnRecordReader::DoubleRecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::BYTE_ARRAY => {
            ColumnRecordReader::ByteArrayRecordReader(GenericRecordReader::new(descr, leaf_info))
        }
        Type::FIXED_LEN_BYTE_ARRAY => ColumnRecordReader::FixedLenByteArrayRecordReader(
            GenericRecordReader::new(descr, leaf_info),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;
    use std::sync::Arc;

    #[test]
    fn test_make_record_reader_dispatch() {
        let cases = [
            Type::BOOLEAN,
            Type::INT32,
            Type::INT64,
            Type::INT96,
            Type::FLOAT,
            Type::DOUBLE,
            Type::BYTE_ARRAY,
            Type::FIXED_LEN_BYTE_ARRAY,
        ];
        for physical_type in cases {
            let descr = Arc::new(
                ColumnDescriptor::new("leaf", physical_type, 0, 0).with_type_length(4),
            );
            let reader = make_record_reader(descr, LevelInfo::new(0, 0));
            let matches = match (&reader, physical_type) {
                (ColumnRecordReader::BoolRecordReader(_), Type::BOOLEAN) => true,
                (ColumnRecordReader::Int32RecordReader(_), Type::INT32) => true,
                (ColumnRecordReader::Int64RecordReader(_), Type::INT64) => true,
                (ColumnRecordReader::Int96RecordReader(_), Type::INT96) => true,
                (ColumnRecordReader::FloatRecordReader(_), Type::FLOAT) => true,
                (ColumnRecordReader::DoubleRecordReader(_), Type::DOUBLE) => true,
                (ColumnRecordReader::ByteArrayRecordReader(_), Type::BYTE_ARRAY) => true,
                (
                    ColumnRecordReader::FixedLenByteArrayRecordReader(_),
                    Type::FIXED_LEN_BYTE_ARRAY,
                ) => true,
                _ => false,
            };
            assert!(matches, "wrong reader variant for {physical_type}");
        }
    }
}
