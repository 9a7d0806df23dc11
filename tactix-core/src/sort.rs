//! Sorts and the interning sort store.

use rustc_hash::FxHashMap;

use crate::error::{Result, TactixError};

/// Widest bit-vector the engine handles; constants are carried as `u64`.
pub const MAX_BV_WIDTH: u32 = 64;

/// Index of an interned [`Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortId(u32);

impl SortId {
    /// Raw index, usable for side tables.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The shape of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// Booleans.
    Bool,
    /// Mathematical integers.
    Int,
    /// Fixed-width bit-vectors.
    BitVec(u32),
}

/// An interned sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Shape of this sort.
    pub kind: SortKind,
}

/// Interning table for sorts.
///
/// `Bool` and `Int` are pre-interned so the common case is a field read,
/// mirroring how the term manager exposes them.
#[derive(Debug)]
pub struct SortStore {
    sorts: Vec<Sort>,
    table: FxHashMap<SortKind, SortId>,
    /// The Boolean sort.
    pub bool_sort: SortId,
    /// The integer sort.
    pub int_sort: SortId,
}

impl SortStore {
    /// Creates a store with `Bool` and `Int` pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            sorts: Vec::new(),
            table: FxHashMap::default(),
            bool_sort: SortId(0),
            int_sort: SortId(0),
        };
        store.bool_sort = store.intern(SortKind::Bool);
        store.int_sort = store.intern(SortKind::Int);
        store
    }

    fn intern(&mut self, kind: SortKind) -> SortId {
        if let Some(&id) = self.table.get(&kind) {
            return id;
        }
        let id = SortId(self.sorts.len() as u32);
        self.sorts.push(Sort { kind });
        self.table.insert(kind, id);
        id
    }

    /// Interns the bit-vector sort of the given width.
    ///
    /// Widths outside `1..=64` are rejected.
    pub fn bitvec(&mut self, width: u32) -> Result<SortId> {
        if width == 0 || width > MAX_BV_WIDTH {
            return Err(TactixError::UnsupportedWidth { width });
        }
        Ok(self.intern(SortKind::BitVec(width)))
    }

    /// Looks up an interned sort.
    #[must_use]
    pub fn get(&self, id: SortId) -> &Sort {
        &self.sorts[id.index()]
    }

    /// Whether `id` is the Boolean sort.
    #[must_use]
    pub fn is_bool(&self, id: SortId) -> bool {
        id == self.bool_sort
    }

    /// Whether `id` is the integer sort.
    #[must_use]
    pub fn is_int(&self, id: SortId) -> bool {
        id == self.int_sort
    }

    /// The width of `id` if it is a bit-vector sort.
    #[must_use]
    pub fn bv_width(&self, id: SortId) -> Option<u32> {
        match self.get(id).kind {
            SortKind::BitVec(w) => Some(w),
            _ => None,
        }
    }
}

impl Default for SortStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The all-ones mask for a bit-vector width in `1..=64`.
#[must_use]
pub fn bv_mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

/// Two's-complement reading of the low `width` bits of `value`.
#[must_use]
pub fn bv_signed(value: u64, width: u32) -> i64 {
    let value = value & bv_mask(width);
    if width >= 64 {
        value as i64
    } else if value & (1u64 << (width - 1)) != 0 {
        (value | !bv_mask(width)) as i64
    } else {
        value as i64
    }
}
