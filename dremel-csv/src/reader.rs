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

//! Streaming CSV reader that converts rows into columnar record batches.
//!
//! A table of typed per-field converters is prepared once at construction,
//! hoisting type dispatch out of the row loop. Rows are appended into
//! per-column builders and cut into [`RecordBatch`]es according to the
//! configured chunk size.

use std::io::Read;
use std::sync::Arc;

use arrow_array::builder::{
    BooleanBuilder, Float32Builder, Float64Builder, Int16Builder, Int32Builder, Int64Builder,
    Int8Builder, StringBuilder, TimestampMicrosecondBuilder, TimestampMillisecondBuilder,
    TimestampNanosecondBuilder, TimestampSecondBuilder, UInt16Builder, UInt32Builder,
    UInt64Builder, UInt8Builder,
};
use arrow_array::types::{
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_cast::parse::Parser;
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef, TimeUnit};
use csv::StringRecord;

use crate::map_csv_error;

/// Hook invoked with the first row of the input to adjust the schema, e.g.
/// renaming fields from a header line, before any converter runs.
pub type ReadHeaderFn = Box<dyn FnMut(&StringRecord, &Schema) -> Result<Schema, ArrowError> + Send>;

fn mismatched_fields(expected: usize, found: usize) -> ArrowError {
    ArrowError::CsvError(format!(
        "incorrect number of fields: expected {expected}, found {found}"
    ))
}

macro_rules! parse_number {
    ($builder:expr, $value:expr, $ty:ty) => {{
        match $value.parse::<$ty>() {
            Ok(parsed) => {
                $builder.append_value(parsed);
                Ok(())
            }
            Err(e) => {
                $builder.append_null();
                Err(ArrowError::ParseError(format!(
                    "cannot parse {:?} as {}: {e}",
                    $value,
                    stringify!($ty)
                )))
            }
        }
    }};
}

macro_rules! parse_timestamp {
    ($builder:expr, $value:expr, $ty:ty) => {{
        match <$ty>::parse($value) {
            Some(parsed) => {
                $builder.append_value(parsed);
                Ok(())
            }
            None => {
                $builder.append_null();
                Err(ArrowError::ParseError(format!(
                    "cannot parse {:?} as timestamp",
                    $value
                )))
            }
        }
    }};
}

/// A typed converter-plus-builder for one column. The variant is chosen
/// once from the schema; the row loop only appends.
enum ColumnBuilder {
    Boolean(BooleanBuilder),
    Int8(Int8Builder),
    Int16(Int16Builder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    UInt8(UInt8Builder),
    UInt16(UInt16Builder),
    UInt32(UInt32Builder),
    UInt64(UInt64Builder),
    Float32(Float32Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
    TimestampSecond(TimestampSecondBuilder),
    TimestampMillisecond(TimestampMillisecondBuilder),
    TimestampMicrosecond(TimestampMicrosecondBuilder),
    TimestampNanosecond(TimestampNanosecondBuilder),
}

impl ColumnBuilder {
    fn try_new(data_type: &DataType) -> Result<Self, ArrowError> {
        match data_type {
            DataType::Boolean => Ok(Self::Boolean(BooleanBuilder::new())),
            DataType::Int8 => Ok(Self::Int8(Int8Builder::new())),
            DataType::Int16 => Ok(Self::Int16(Int16Builder::new())),
            DataType::Int32 => Ok(Self::Int32(Int32Builder::new())),
            DataType::Int64 => Ok(Self::Int64(Int64Builder::new())),
            DataType::UInt8 => Ok(Self::UInt8(UInt8Builder::new())),
            DataType::UInt16 => Ok(Self::UInt16(UInt16Builder::new())),
            DataType::UInt32 => Ok(Self::UInt32(UInt32Builder::new())),
            DataType::UInt64 => Ok(Self::UInt64(UInt64Builder::new())),
            DataType::Float32 => Ok(Self::Float32(Float32Builder::new())),
            DataType::Float64 => Ok(Self::Float64(Float64Builder::new())),
            DataType::Utf8 => Ok(Self::Utf8(StringBuilder::new())),
            DataType::Timestamp(TimeUnit::Second, None) => {
                Ok(Self::TimestampSecond(TimestampSecondBuilder::new()))
            }
            DataType::Timestamp(TimeUnit::Millisecond, None) => Ok(Self::TimestampMillisecond(
                TimestampMillisecondBuilder::new(),
            )),
            DataType::Timestamp(TimeUnit::Microsecond, None) => Ok(Self::TimestampMicrosecond(
                TimestampMicrosecondBuilder::new(),
            )),
            DataType::Timestamp(TimeUnit::Nanosecond, None) => {
                Ok(Self::TimestampNanosecond(TimestampNanosecondBuilder::new()))
            }
            other => Err(ArrowError::NotYetImplemented(format!(
                "unsupported data type for csv reader: {other}"
            ))),
        }
    }

    /// Appends one text value. Parse failures append a null in the slot and
    /// report the error so a bad row does not stop ingestion.
    fn append(
        &mut self,
        value: &str,
        is_null: bool,
        strings_can_be_null: bool,
    ) -> Result<(), ArrowError> {
        if is_null {
            // null recognition for strings is opt-in; disabled, the matched
            // string is a value like any other
            match self {
                Self::Utf8(builder) => {
                    if strings_can_be_null {
                        builder.append_null();
                    } else {
                        builder.append_value(value);
                    }
                }
                _ => self.append_null(),
            }
            return Ok(());
        }

        match self {
            Self::Boolean(builder) => match value {
                "true" | "True" | "1" => {
                    builder.append_value(true);
                    Ok(())
                }
                "false" | "False" | "0" => {
                    builder.append_value(false);
                    Ok(())
                }
                _ => {
                    builder.append_null();
                    Err(ArrowError::ParseError(format!(
                        "unrecognized boolean: {value}"
                    )))
                }
            },
            Self::Int8(builder) => parse_number!(builder, value, i8),
            Self::Int16(builder) => parse_number!(builder, value, i16),
            Self::Int32(builder) => parse_number!(builder, value, i32),
            Self::Int64(builder) => parse_number!(builder, value, i64),
            Self::UInt8(builder) => parse_number!(builder, value, u8),
            Self::UInt16(builder) => parse_number!(builder, value, u16),
            Self::UInt32(builder) => parse_number!(builder, value, u32),
            Self::UInt64(builder) => parse_number!(builder, value, u64),
            Self::Float32(builder) => parse_number!(builder, value, f32),
            Self::Float64(builder) => parse_number!(builder, value, f64),
            Self::Utf8(builder) => {
                builder.append_value(value);
                Ok(())
            }
            Self::TimestampSecond(builder) => {
                parse_timestamp!(builder, value, TimestampSecondType)
            }
            Self::TimestampMillisecond(builder) => {
                parse_timestamp!(builder, value, TimestampMillisecondType)
            }
            Self::TimestampMicrosecond(builder) => {
                parse_timestamp!(builder, value, TimestampMicrosecondType)
            }
            Self::TimestampNanosecond(builder) => {
                parse_timestamp!(builder, value, TimestampNanosecondType)
            }
        }
    }

    fn append_null(&mut self) {
        match self {
            Self::Boolean(builder) => builder.append_null(),
            Self::Int8(builder) => builder.append_null(),
            Self::Int16(builder) => builder.append_null(),
            Self::Int32(builder) => builder.append_null(),
            Self::Int64(builder) => builder.append_null(),
            Self::UInt8(builder) => builder.append_null(),
            Self::UInt16(builder) => builder.append_null(),
            Self::UInt32(builder) => builder.append_null(),
            Self::UInt64(builder) => builder.append_null(),
            Self::Float32(builder) => builder.append_null(),
            Self::Float64(builder) => builder.append_null(),
            Self::Utf8(builder) => builder.append_null(),
            Self::TimestampSecond(builder) => builder.append_null(),
            Self::TimestampMillisecond(builder) => builder.append_null(),
            Self::TimestampMicrosecond(builder) => builder.append_null(),
            Self::TimestampNanosecond(builder) => builder.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Boolean(builder) => Arc::new(builder.finish()),
            Self::Int8(builder) => Arc::new(builder.finish()),
            Self::Int16(builder) => Arc::new(builder.finish()),
            Self::Int32(builder) => Arc::new(builder.finish()),
            Self::Int64(builder) => Arc::new(builder.finish()),
            Self::UInt8(builder) => Arc::new(builder.finish()),
            Self::UInt16(builder) => Arc::new(builder.finish()),
            Self::UInt32(builder) => Arc::new(builder.finish()),
            Self::UInt64(builder) => Arc::new(builder.finish()),
            Self::Float32(builder) => Arc::new(builder.finish()),
            Self::Float64(builder) => Arc::new(builder.finish()),
            Self::Utf8(builder) => Arc::new(builder.finish()),
            Self::TimestampSecond(builder) => Arc::new(builder.finish()),
            Self::TimestampMillisecond(builder) => Arc::new(builder.finish()),
            Self::TimestampMicrosecond(builder) => Arc::new(builder.finish()),
            Self::TimestampNanosecond(builder) => Arc::new(builder.finish()),
        }
    }
}

fn make_builders(schema: &Schema) -> Result<Vec<ColumnBuilder>, ArrowError> {
    schema
        .fields()
        .iter()
        .map(|field| ColumnBuilder::try_new(field.data_type()))
        .collect()
}

/// Builds [`Reader`]s from a schema and ingestion options.
pub struct ReaderBuilder {
    schema: SchemaRef,
    delimiter: Option<u8>,
    chunk: i64,
    nulls: Vec<String>,
    strings_can_be_null: bool,
    header: bool,
    read_header: Option<ReadHeaderFn>,
}

impl ReaderBuilder {
    /// Creates a builder for the given schema. Fields must be primitive
    /// types, strings, or timestamps.
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            delimiter: None,
            chunk: 1,
            nulls: Vec::new(),
            strings_can_be_null: false,
            header: false,
            read_header: None,
        }
    }

    /// Sets the field delimiter, defaults to comma.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets the number of rows per record batch: negative ingests the whole
    /// input into a single batch, `1` (the default) produces one batch per
    /// row, larger values produce fixed-size batches.
    pub fn with_chunk(mut self, chunk: i64) -> Self {
        self.chunk = chunk;
        self
    }

    /// Sets the strings recognized as null values.
    pub fn with_null_values<I, S>(mut self, nulls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nulls = nulls.into_iter().map(Into::into).collect();
        self
    }

    /// Enables null recognition for string columns. Disabled by default, so
    /// the empty string (or any configured null string) is a value.
    pub fn with_strings_can_be_null(mut self, strings_can_be_null: bool) -> Self {
        self.strings_can_be_null = strings_can_be_null;
        self
    }

    /// Treats the first row as a header, renaming schema fields to the
    /// header names before any row is converted.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Installs a custom hook to adjust the schema from the first row.
    /// Implies [`with_header`](Self::with_header).
    pub fn with_read_header(mut self, read_header: ReadHeaderFn) -> Self {
        self.header = true;
        self.read_header = Some(read_header);
        self
    }

    /// Builds a [`Reader`] over the given input. Fails when the schema
    /// contains a field type the converter table does not support.
    pub fn build<R: Read>(self, reader: R) -> Result<Reader<R>, ArrowError> {
        let builders = make_builders(&self.schema)?;

        let mut csv_builder = csv::ReaderBuilder::new();
        csv_builder.has_headers(false).flexible(true);
        if let Some(delimiter) = self.delimiter {
            csv_builder.delimiter(delimiter);
        }

        Ok(Reader {
            schema: self.schema,
            csv: csv_builder.from_reader(reader),
            row: StringRecord::new(),
            builders,
            nulls: self.nulls,
            strings_can_be_null: self.strings_can_be_null,
            chunk: self.chunk,
            header: self.header,
            read_header: self.read_header,
            started: false,
            cur: None,
            err: None,
            done: false,
        })
    }
}

/// Reads delimited text rows and assembles them into [`RecordBatch`]es.
///
/// Iteration follows the streaming pattern: [`next`](Self::next) advances to
/// the next batch, [`record`](Self::record) borrows the current one, and
/// [`err`](Self::err) reports the first error observed. Parse failures leave
/// a null in the offending slot and do not stop ingestion; structural
/// failures (row arity, I/O) end it immediately, though rows already
/// accumulated for the in-flight batch are still delivered.
pub struct Reader<R: Read> {
    schema: SchemaRef,
    csv: csv::Reader<R>,
    row: StringRecord,
    builders: Vec<ColumnBuilder>,
    nulls: Vec<String>,
    strings_can_be_null: bool,
    chunk: i64,
    header: bool,
    read_header: Option<ReadHeaderFn>,
    started: bool,
    cur: Option<RecordBatch>,
    err: Option<ArrowError>,
    done: bool,
}

impl<R: Read> std::fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("schema", &self.schema)
            .field("nulls", &self.nulls)
            .field("strings_can_be_null", &self.strings_can_be_null)
            .field("chunk", &self.chunk)
            .field("header", &self.header)
            .field("started", &self.started)
            .field("cur", &self.cur)
            .field("err", &self.err)
            .field("done", &self.done)
            .finish()
    }
}

impl<R: Read> Reader<R> {
    /// Returns the schema batches are produced against. When a header row
    /// is configured the field names reflect it after the first
    /// [`next`](Self::next) call.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Returns the current record batch. It is replaced by the next call to
    /// [`next`](Self::next).
    pub fn record(&self) -> Option<&RecordBatch> {
        self.cur.as_ref()
    }

    /// Returns the first error encountered during iteration.
    pub fn err(&self) -> Option<&ArrowError> {
        self.err.as_ref()
    }

    /// Advances to the next record batch, returning false when the input is
    /// exhausted or a structural error ended ingestion. Check
    /// [`err`](Self::err) after iteration.
    pub fn next(&mut self) -> bool {
        if !self.started {
            self.started = true;
            if self.header {
                if let Err(e) = self.read_header_row() {
                    self.err = Some(e);
                    self.done = true;
                }
            }
        }

        self.cur = None;
        if self.done {
            return false;
        }

        match self.chunk {
            chunk if chunk < 0 => self.next_all(),
            chunk if chunk > 1 => self.next_n(chunk as usize),
            _ => self.next_one(),
        }
    }

    fn read_header_row(&mut self) -> Result<(), ArrowError> {
        let mut header = StringRecord::new();
        if !self.csv.read_record(&mut header).map_err(map_csv_error)? {
            return Err(ArrowError::CsvError(
                "could not read header row from input".to_string(),
            ));
        }
        let schema = match self.read_header.as_mut() {
            Some(hook) => hook(&header, &self.schema)?,
            None => default_read_header(&header, &self.schema)?,
        };
        self.builders = make_builders(&schema)?;
        self.schema = Arc::new(schema);
        Ok(())
    }

    /// One record batch from one row.
    fn next_one(&mut self) -> bool {
        match self.csv.read_record(&mut self.row) {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return false;
            }
            Err(e) => {
                self.set_err(map_csv_error(e));
                self.done = true;
                return false;
            }
        }
        if let Err(e) = self.read_row() {
            self.set_err(e);
            self.done = true;
            return false;
        }
        self.finish_batch()
    }

    /// One record batch of up to `chunk` rows. A structural failure ends
    /// iteration, but rows already appended for this batch are still
    /// delivered.
    fn next_n(&mut self, chunk: usize) -> bool {
        let mut rows_read = 0;
        for _ in 0..chunk {
            match self.csv.read_record(&mut self.row) {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.set_err(map_csv_error(e));
                    self.done = true;
                    break;
                }
            }
            if let Err(e) = self.read_row() {
                // the offending row appended nothing; flush the rows that
                // preceded it
                self.set_err(e);
                self.done = true;
                break;
            }
            rows_read += 1;
        }
        if rows_read == 0 {
            return false;
        }
        self.finish_batch()
    }

    /// The whole remaining input as one record batch. As in
    /// [`next_n`](Self::next_n), a structural failure flushes the rows read
    /// before it.
    fn next_all(&mut self) -> bool {
        let mut rows_read = 0;
        loop {
            match self.csv.read_record(&mut self.row) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.set_err(map_csv_error(e));
                    break;
                }
            }
            if let Err(e) = self.read_row() {
                self.set_err(e);
                break;
            }
            rows_read += 1;
        }
        self.done = true;
        if rows_read == 0 && self.err.is_some() {
            return false;
        }
        self.finish_batch()
    }

    /// Appends the current row into the column builders. Returns an error
    /// only for structural failures; parse failures are recorded and leave
    /// a null behind.
    fn read_row(&mut self) -> Result<(), ArrowError> {
        if self.row.len() != self.builders.len() {
            return Err(mismatched_fields(self.builders.len(), self.row.len()));
        }
        let strings_can_be_null = self.strings_can_be_null;
        for (idx, builder) in self.builders.iter_mut().enumerate() {
            let value = self.row.get(idx).unwrap_or_default();
            let is_null = self.nulls.iter().any(|null| null == value);
            if let Err(e) = builder.append(value, is_null, strings_can_be_null) {
                if self.err.is_none() {
                    self.err = Some(e);
                }
            }
        }
        Ok(())
    }

    fn finish_batch(&mut self) -> bool {
        let arrays: Vec<ArrayRef> = self.builders.iter_mut().map(|b| b.finish()).collect();
        match RecordBatch::try_new(self.schema.clone(), arrays) {
            Ok(batch) => {
                self.cur = Some(batch);
                true
            }
            Err(e) => {
                self.set_err(e);
                self.done = true;
                false
            }
        }
    }

    fn set_err(&mut self, e: ArrowError) {
        if self.err.is_none() {
            self.err = Some(e);
        }
    }
}

fn default_read_header(header: &StringRecord, schema: &Schema) -> Result<Schema, ArrowError> {
    if header.len() != schema.fields().len() {
        return Err(mismatched_fields(schema.fields().len(), header.len()));
    }
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .zip(header.iter())
        .map(|(field, name)| field.as_ref().clone().with_name(name))
        .collect();
    Ok(Schema::new_with_metadata(fields, schema.metadata().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;
    use arrow_array::types::{Float64Type, Int32Type, TimestampSecondType};
    use arrow_array::Array;
    use std::io::Cursor;

    fn schema_ab() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]))
    }

    #[test]
    fn test_nulls_and_chunking() {
        // nulls = {"NA"}, strings can be null, two rows per batch
        let input = "1,hi\nNA,NA\n3,bye";
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_chunk(2)
            .with_null_values(["NA"])
            .with_strings_can_be_null(true)
            .build(Cursor::new(input))
            .unwrap();

        assert!(reader.next());
        let batch = reader.record().unwrap();
        assert_eq!(batch.num_rows(), 2);
        let a = batch.column(0).as_primitive::<Int32Type>();
        assert_eq!(a.value(0), 1);
        assert!(a.is_null(1));
        let b = batch.column(1).as_string::<i32>();
        assert_eq!(b.value(0), "hi");
        assert!(b.is_null(1));

        assert!(reader.next());
        let batch = reader.record().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.column(0).as_primitive::<Int32Type>().value(0), 3);
        assert_eq!(batch.column(1).as_string::<i32>().value(0), "bye");

        assert!(!reader.next());
        assert!(reader.record().is_none());
        assert!(reader.err().is_none());
    }

    #[test]
    fn test_parse_error_appends_null_and_continues() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
        let mut reader = ReaderBuilder::new(schema)
            .build(Cursor::new("1\nfoo\n3"))
            .unwrap();

        let mut rows = 0;
        let mut nulls = 0;
        while reader.next() {
            let batch = reader.record().unwrap();
            rows += batch.num_rows();
            nulls += batch.column(0).null_count();
        }
        assert_eq!(rows, 3);
        assert_eq!(nulls, 1);
        let err = reader.err().unwrap();
        assert!(
            matches!(err, ArrowError::ParseError(_)),
            "unexpected error {err}"
        );
    }

    #[test]
    fn test_first_parse_error_is_retained() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
        let mut reader = ReaderBuilder::new(schema)
            .build(Cursor::new("foo\nbar"))
            .unwrap();
        while reader.next() {}
        assert!(reader.err().unwrap().to_string().contains("foo"));
    }

    #[test]
    fn test_chunk_all() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_chunk(-1)
            .build(Cursor::new("1,x\n2,y\n3,z"))
            .unwrap();
        assert!(reader.next());
        assert_eq!(reader.record().unwrap().num_rows(), 3);
        assert!(!reader.next());
        assert!(reader.err().is_none());
    }

    #[test]
    fn test_default_chunk_is_one_row() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .build(Cursor::new("1,x\n2,y"))
            .unwrap();
        let mut batches = 0;
        while reader.next() {
            assert_eq!(reader.record().unwrap().num_rows(), 1);
            batches += 1;
        }
        assert_eq!(batches, 2);
    }

    #[test]
    fn test_header_renames_fields() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_header(true)
            .with_chunk(-1)
            .build(Cursor::new("id,name\n7,frank"))
            .unwrap();
        assert!(reader.next());
        assert_eq!(reader.schema().field(0).name(), "id");
        assert_eq!(reader.schema().field(1).name(), "name");
        let batch = reader.record().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.schema().field(1).name(), "name");
    }

    #[test]
    fn test_custom_header_hook() {
        let hook: ReadHeaderFn = Box::new(|header, schema| {
            let fields: Vec<Field> = schema
                .fields()
                .iter()
                .zip(header.iter())
                .map(|(field, name)| {
                    field
                        .as_ref()
                        .clone()
                        .with_name(format!("{}_{name}", field.name()))
                })
                .collect();
            Ok(Schema::new(fields))
        });
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_read_header(hook)
            .build(Cursor::new("x,y\n1,one"))
            .unwrap();
        assert!(reader.next());
        assert_eq!(reader.schema().field(0).name(), "a_x");
        assert_eq!(reader.schema().field(1).name(), "b_y");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_delimiter(b';')
            .build(Cursor::new("4;four"))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        assert_eq!(batch.column(0).as_primitive::<Int32Type>().value(0), 4);
        assert_eq!(batch.column(1).as_string::<i32>().value(0), "four");
    }

    #[test]
    fn test_mismatched_fields_is_fatal() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .build(Cursor::new("1,x\n2,y,zap\n3,z"))
            .unwrap();
        assert!(reader.next());
        assert!(!reader.next());
        assert!(reader
            .err()
            .unwrap()
            .to_string()
            .contains("incorrect number of fields"));
        // iteration stays finished
        assert!(!reader.next());
    }

    #[test]
    fn test_mismatched_fields_flushes_partial_chunk() {
        // rows before the malformed one belong to the in-flight batch and
        // must not be lost; rows after it are never read
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_chunk(3)
            .build(Cursor::new("1,x\n2,y\n3,z,w\n4,q"))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.column(0).as_primitive::<Int32Type>().value(1), 2);
        assert!(reader
            .err()
            .unwrap()
            .to_string()
            .contains("incorrect number of fields"));
        assert!(!reader.next());
    }

    #[test]
    fn test_mismatched_fields_flushes_whole_input_batch() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_chunk(-1)
            .build(Cursor::new("1,x\n2,y\n3\n4,z"))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        assert_eq!(batch.num_rows(), 2);
        let b = batch.column(1).as_string::<i32>();
        assert_eq!(b.value(0), "x");
        assert_eq!(b.value(1), "y");
        assert!(reader.err().is_some());
        assert!(!reader.next());
    }

    #[test]
    fn test_mismatched_first_row_of_whole_input_yields_no_batch() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_chunk(-1)
            .build(Cursor::new("1\n2,y"))
            .unwrap();
        assert!(!reader.next());
        assert!(reader.record().is_none());
        assert!(reader.err().is_some());
    }

    #[test]
    fn test_boolean_and_float_literals() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("flag", DataType::Boolean, true),
            Field::new("x", DataType::Float64, true),
        ]));
        let input = "true,1.5\nFalse,2.25\n1,-0.5\n0,1e3";
        let mut reader = ReaderBuilder::new(schema)
            .with_chunk(-1)
            .build(Cursor::new(input))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        let flags = batch.column(0).as_boolean();
        assert_eq!(flags.value(0), true);
        assert_eq!(flags.value(1), false);
        assert_eq!(flags.value(2), true);
        assert_eq!(flags.value(3), false);
        let xs = batch.column(1).as_primitive::<Float64Type>();
        assert_eq!(xs.value(0), 1.5);
        assert_eq!(xs.value(3), 1000.0);
        assert!(reader.err().is_none());
    }

    #[test]
    fn test_integer_overflow_is_parse_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int8, true)]));
        let mut reader = ReaderBuilder::new(schema)
            .build(Cursor::new("300"))
            .unwrap();
        assert!(reader.next());
        assert!(reader.record().unwrap().column(0).is_null(0));
        assert!(reader.err().is_some());
    }

    #[test]
    fn test_timestamp_parsing() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "ts",
            DataType::Timestamp(TimeUnit::Second, None),
            true,
        )]));
        let mut reader = ReaderBuilder::new(schema)
            .build(Cursor::new("2020-01-01T00:00:00"))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        let ts = batch.column(0).as_primitive::<TimestampSecondType>();
        assert_eq!(ts.value(0), 1_577_836_800);
    }

    #[test]
    fn test_empty_string_is_a_value_by_default() {
        let mut reader = ReaderBuilder::new(schema_ab())
            .with_null_values([""])
            .build(Cursor::new("1,"))
            .unwrap();
        assert!(reader.next());
        let batch = reader.record().unwrap();
        let b = batch.column(1).as_string::<i32>();
        assert!(!b.is_null(0));
        assert_eq!(b.value(0), "");
    }

    #[test]
    fn test_unsupported_type_fails_at_build() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "a",
            DataType::Date32,
            true,
        )]));
        let err = ReaderBuilder::new(schema).build(Cursor::new("")).unwrap_err();
        assert!(err.to_string().contains("unsupported data type"));
    }
}
