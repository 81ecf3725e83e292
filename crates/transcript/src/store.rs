//! Shared transcript store.

use tokio::sync::RwLock;

use crate::{Message, Turn};

/// Ordered, process-wide record of conversation turns.
///
/// Share it behind an `Arc`; every clone of the handle sees the same turns.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: RwLock<Vec<Turn>>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the transcript.
    ///
    /// Role alternation is not checked.
    pub async fn append(&self, turn: Turn) {
        self.turns.write().await.push(turn);
    }

    /// Snapshot of every turn, oldest first.
    pub async fn all(&self) -> Vec<Message> {
        self.turns.read().await.iter().map(Message::from).collect()
    }

    /// Remove every turn.
    pub async fn clear(&self) {
        self.turns.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }
}
