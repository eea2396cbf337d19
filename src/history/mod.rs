//! Conversation history
//!
//! Conversations are stored as flat Markdown files, one per export, in a
//! history directory.
//!
//! - `codec`: the exported document layout (encode / decode)
//! - `title`: short labels for stored files
//! - `summary`: prompts and cleanup for AI-generated titles
//! - `store`: the history directory itself

pub mod codec;
pub mod store;
pub mod summary;
pub mod title;

pub use codec::{decode, encode, ExportHeader};
pub use store::{HistoryEntry, HistoryStore};
pub use title::extract_title;
