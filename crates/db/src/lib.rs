pub mod repositories;

pub use repositories::{InMemoryPollRepository, PollRepository, RepositoryError};
