//! Custom widgets for the TUI

pub mod input_box;
pub mod selector;
pub mod spinner;
pub mod transcript;

pub use input_box::InputBox;
pub use selector::{Selector, SelectorItem, SelectorState};
pub use spinner::Spinner;
pub use transcript::{Transcript, TranscriptEntry, calculate_transcript_height};
