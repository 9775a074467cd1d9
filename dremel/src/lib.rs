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

//! Record assembly for columnar data encoded with [Dremel]-style definition
//! and repetition levels.
//!
//! Columnar formats shred nested rows into flat leaf value streams plus two
//! small level streams describing where values sit in the nesting structure.
//! This crate implements the inverse operation for one leaf column: it pulls
//! decoded levels and values from an external page stream, delimits logical
//! records along the repetition levels, materializes dense typed buffers
//! with a validity bitmap, and hands finished buffers to the caller with
//! zero copies.
//!
//! The page stream, decompression and value encodings stay behind the
//! [`column::page::PageReader`] and decoder traits; implementations of those
//! belong to the file-format layer.
//!
//! # Example
//!
//! ```ignore
//! use dremel::record::{LevelInfo, RecordReader};
//! use dremel::data_type::Int32Type;
//!
//! let mut reader = RecordReader::<Int32Type>::new(descr, LevelInfo::new(1, 0));
//! reader.set_page_reader(pages);
//! let records = reader.read_records(1024)?;
//! let values = reader.release_values();
//! let validity = reader.release_valid_bits();
//! ```
//!
//! [Dremel]: https://research.google/pubs/pub36632/

#[macro_use]
pub mod errors;

pub mod basic;
pub mod data_type;
pub mod schema;

pub mod column;
pub mod record;

mod util;
