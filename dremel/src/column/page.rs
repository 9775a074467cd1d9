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

//! Data pages as seen by the record-assembly layer.

use crate::column::reader::decoder::{LevelDecoder, ValueDecoder};
use crate::errors::Result;

/// One data page, already decompressed and armed with its decoders.
///
/// The page reader constructs these from the on-disk representation; this
/// crate only pulls levels and values out of them.
pub struct DataPage<T> {
    num_values: usize,
    def_level_decoder: Option<Box<dyn LevelDecoder>>,
    rep_level_decoder: Option<Box<dyn LevelDecoder>>,
    value_decoder: Box<dyn ValueDecoder<T>>,
}

impl<T> DataPage<T> {
    /// Creates a new data page holding `num_values` level slots.
    ///
    /// `def_level_decoder` must be present whenever the column has a
    /// non-zero maximum definition level, `rep_level_decoder` whenever it
    /// has a non-zero maximum repetition level.
    pub fn new(
        num_values: usize,
        def_level_decoder: Option<Box<dyn LevelDecoder>>,
        rep_level_decoder: Option<Box<dyn LevelDecoder>>,
        value_decoder: Box<dyn ValueDecoder<T>>,
    ) -> Self {
        Self {
            num_values,
            def_level_decoder,
            rep_level_decoder,
            value_decoder,
        }
    }

    /// Number of level slots (including nulls) stored in this page.
    pub fn num_values(&self) -> usize {
        self.num_values
    }

    pub(crate) fn def_level_decoder_mut(&mut self) -> Option<&mut (dyn LevelDecoder + 'static)> {
        self.def_level_decoder.as_deref_mut()
    }

    pub(crate) fn rep_level_decoder_mut(&mut self) -> Option<&mut (dyn LevelDecoder + 'static)> {
        self.rep_level_decoder.as_deref_mut()
    }

    pub(crate) fn value_decoder_mut(&mut self) -> &mut dyn ValueDecoder<T> {
        self.value_decoder.as_mut()
    }
}

/// API for reading the pages of one column chunk in order.
pub trait PageReader<T>: Send {
    /// Gets the next page in the chunk, or `None` if the chunk is exhausted.
    fn get_next_page(&mut self) -> Result<Option<DataPage<T>>>;
}
