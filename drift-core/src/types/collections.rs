//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for import specifier lists (usually short).
pub type SmallVec2<T> = SmallVec<[T; 2]>;

/// SmallVec sized for parameter lists.
pub type SmallVec4<T> = SmallVec<[T; 4]>;
