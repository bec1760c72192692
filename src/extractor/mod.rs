pub mod conversation;
pub mod guard;

pub use conversation::{ExtractionResult, Extractor, extract_conversation};
pub use guard::{ExtractionSlot, SlotGuard};
