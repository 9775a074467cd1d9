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

//! Projection of definition levels into validity bitmaps.

use arrow_buffer::bit_util;

use crate::errors::Result;

/// Level facts about one leaf, derived from its nesting path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelInfo {
    /// The definition level at which the leaf value itself is present.
    pub def_level: i16,
    /// The maximum repetition level of the leaf.
    pub rep_level: i16,
    /// The definition level of the closest repeated ancestor. Levels below
    /// this mark nulls in an ancestor list and produce no value slot at the
    /// leaf.
    pub repeated_ancestor_def_level: i16,
}

impl LevelInfo {
    /// Creates level info for a leaf with no repeated ancestor.
    pub fn new(def_level: i16, rep_level: i16) -> Self {
        Self {
            def_level,
            rep_level,
            repeated_ancestor_def_level: 0,
        }
    }

    /// True when the leaf's nesting path contains an optional segment, i.e.
    /// value slots may be null and a validity bitmap must be maintained.
    pub fn has_nullable_values(&self) -> bool {
        self.repeated_ancestor_def_level < self.def_level
    }
}

/// Input/output state for [`def_levels_to_bitmap`].
pub struct ValidityBitmapInputOutput<'a> {
    /// Maximum number of slots the projection may emit.
    pub read_upper_bound: usize,
    /// Slots emitted.
    pub read: usize,
    /// Bits cleared among the emitted slots.
    pub null_count: usize,
    /// The bitmap written to, one bit per emitted slot.
    pub valid_bits: &'a mut [u8],
    /// Bit offset of the first slot written.
    pub valid_bits_offset: usize,
}

/// Populates a validity bitmap from a window of definition levels.
///
/// A level below the repeated-ancestor level denotes a null in an enclosing
/// list and is skipped without emitting a slot. Every other level emits one
/// slot: set when the level reaches the leaf's definition level, cleared
/// otherwise.
pub fn def_levels_to_bitmap(
    def_levels: &[i16],
    level_info: LevelInfo,
    io: &mut ValidityBitmapInputOutput,
) -> Result<()> {
    for &level in def_levels {
        if level < level_info.repeated_ancestor_def_level {
            continue;
        }
        if io.read == io.read_upper_bound {
            return Err(corrupt_err!(
                "definition levels exceeded upper bound of {} slots",
                io.read_upper_bound
            ));
        }
        let position = io.valid_bits_offset + io.read;
        if level >= level_info.def_level {
            bit_util::set_bit(io.valid_bits, position);
        } else {
            bit_util::unset_bit(io.valid_bits, position);
            io.null_count += 1;
        }
        io.read += 1;
    }
    Ok(())
}
