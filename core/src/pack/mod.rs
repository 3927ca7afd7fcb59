//! Reading version 2 pack files and their version 2 indexes.
//!
//! Only offset deltas are resolved. Ref deltas (used by thin packs on the
//! wire) and pack indexes with the large-offset table are recognized but
//! rejected.

mod cursor;

mod delta;
pub use delta::apply_delta;

mod index;
pub use index::{PackIndex, PackIndexEntry};

mod reader;
pub use reader::{DeltaEntry, NormalEntry, Pack, PackEntry};
