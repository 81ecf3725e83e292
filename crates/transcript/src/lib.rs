//! In-process conversation transcript for the relay.
//!
//! The transcript is the running record of one conversation: every user query
//! and every assistant reply, in the order they happened. It is replayed into
//! each new model request as context, and served back to the UI.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! The [`Transcript`] is the store. One instance lives for the whole process
//! and is shared by every request; it is never persisted. Turns can only be
//! appended, read back as a whole, or cleared in bulk.
//!
//! ## Turn
//!
//! A [`Turn`] is one exchange: a [`Role`], the text content, and for
//! assistant turns the [`ToolCall`]s the model made while producing it.
//!
//! ## Message
//!
//! A [`Message`] is the caller-facing view of a turn, the shape returned by
//! `GET /messages` and embedded into the system prompt.
//!
//! # Example
//!
//! ```
//! use transcript::{ToolCall, Transcript, Turn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let transcript = Transcript::new();
//! transcript.append(Turn::user("Who is Alice?")).await;
//! transcript
//!     .append(Turn::assistant(
//!         "Alice is in Finance.",
//!         vec![ToolCall::new("search_contacts", serde_json::Map::new())],
//!     ))
//!     .await;
//!
//! let messages = transcript.all().await;
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[1].function_calls[0].function_name, "search_contacts");
//! # }
//! ```
//!
//! # Concurrency
//!
//! Each operation holds the store's lock only for its own duration. Turns
//! appended by overlapping requests interleave in whatever order the runtime
//! schedules them; the transcript describes a single conversation and does
//! not isolate concurrent callers.

mod store;
mod turn;

pub use store::Transcript;
pub use turn::{Message, Role, ToolCall, Turn};
