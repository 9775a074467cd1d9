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

//! Ingest delimited text into columnar record batches.

pub mod reader;

pub use self::reader::Reader;
pub use self::reader::ReaderBuilder;

use arrow_schema::ArrowError;

fn map_csv_error(error: csv::Error) -> ArrowError {
    let line = match error.position() {
        Some(position) => format!(" at line {}", position.line()),
        None => String::new(),
    };
    let message = match error.kind() {
        csv::ErrorKind::Io(e) => e.to_string(),
        csv::ErrorKind::Utf8 { err, .. } => {
            format!("invalid UTF-8 in input{line}: {err}")
        }
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("row{line} has {len} fields where {expected_len} were expected")
        }
        _ => format!("malformed input{line}"),
    };
    ArrowError::CsvError(message)
}
