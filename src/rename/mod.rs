/// Match & rename engine
///
/// - index.rs: registry rows -> `RenameIndex`, with conflict detection
/// - engine.rs: per-file lookup and collision-safe rename

pub mod engine;
pub mod index;

pub use engine::{relabel_file, rename_in_place, rename_to, Outcome};
pub use index::{KeyConflict, RenameIndex};
