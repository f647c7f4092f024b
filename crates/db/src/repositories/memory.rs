use std::collections::HashMap;

use tokio::sync::RwLock;

use pollbot_core::domain::poll::{Poll, PollId};

use super::{PollMutation, PollRepository, RepositoryError};

/// Process-lifetime poll store. Nothing is evicted.
#[derive(Default)]
pub struct InMemoryPollRepository {
    polls: RwLock<HashMap<String, Poll>>,
}

#[async_trait::async_trait]
impl PollRepository for InMemoryPollRepository {
    async fn find_by_id(&self, id: &PollId) -> Result<Option<Poll>, RepositoryError> {
        let polls = self.polls.read().await;
        Ok(polls.get(&id.0).cloned())
    }

    async fn save(&self, poll: Poll) -> Result<(), RepositoryError> {
        let mut polls = self.polls.write().await;
        polls.insert(poll.id.0.clone(), poll);
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.polls.read().await.len())
    }

    async fn update<'a>(
        &self,
        id: &PollId,
        mutate: PollMutation<'a>,
    ) -> Result<Option<Poll>, RepositoryError> {
        let mut polls = self.polls.write().await;
        let Some(poll) = polls.get_mut(&id.0) else {
            return Ok(None);
        };
        mutate(poll);
        Ok(Some(poll.clone()))
    }
}
