use async_trait::async_trait;
use thiserror::Error;

use pollbot_core::domain::poll::{Poll, PollId};

pub mod memory;

pub use memory::InMemoryPollRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("poll store unavailable: {0}")]
    Unavailable(String),
}

/// In-place edit applied to a stored poll.
pub type PollMutation<'a> = Box<dyn FnOnce(&mut Poll) + Send + 'a>;

#[async_trait]
pub trait PollRepository: Send + Sync {
    async fn find_by_id(&self, id: &PollId) -> Result<Option<Poll>, RepositoryError>;

    /// Inserts or overwrites the poll stored under `poll.id`.
    async fn save(&self, poll: Poll) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;

    /// Applies `mutate` to the stored poll and returns the updated copy, or
    /// `None` when no poll has that id.
    ///
    /// The default loads, edits and saves in separate steps, which can lose
    /// concurrent updates; backends that can hold a lock across the edit
    /// should override it.
    async fn update<'a>(
        &self,
        id: &PollId,
        mutate: PollMutation<'a>,
    ) -> Result<Option<Poll>, RepositoryError> {
        let Some(mut poll) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        mutate(&mut poll);
        self.save(poll.clone()).await?;
        Ok(Some(poll))
    }
}
