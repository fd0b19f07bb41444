//! # In-process message repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record::{AgentThoughtRecord, FinalMessage};
use super::repository::MessageRepository;
use crate::error::GenerateError;

/// Thread-safe in-memory [`MessageRepository`], for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    thoughts: RwLock<HashMap<String, AgentThoughtRecord>>,
    messages: RwLock<Vec<FinalMessage>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an agent thought, replacing any record with the same id.
    pub async fn insert_thought(&self, record: AgentThoughtRecord) {
        self.thoughts
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    /// Snapshot of every saved final message, in save order.
    pub async fn saved_messages(&self) -> Vec<FinalMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryRepository {
    async fn load_agent_thought(
        &self,
        id: &str,
    ) -> Result<Option<AgentThoughtRecord>, GenerateError> {
        Ok(self.thoughts.read().await.get(id).cloned())
    }

    async fn save_final_message(&self, message: FinalMessage) -> Result<(), GenerateError> {
        self.messages.write().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn thoughts_and_messages_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_agent_thought("th-1").await.unwrap(), None);

        repo.insert_thought(AgentThoughtRecord {
            id: "th-1".into(),
            position: 1,
            thought: "look it up".into(),
            ..Default::default()
        })
        .await;
        let found = repo.load_agent_thought("th-1").await.unwrap().unwrap();
        assert_eq!(found.thought, "look it up");

        repo.save_final_message(FinalMessage {
            message_id: "m1".into(),
            answer: "hi".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        let saved = repo.saved_messages().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].answer, "hi");
    }
}
