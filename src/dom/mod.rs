pub mod snapshot;
pub mod text;

pub use snapshot::{SnapshotElement, SnapshotNode};
pub use text::{extract_text, math_source, MathSource};
