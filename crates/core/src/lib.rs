pub mod config;
pub mod domain;
pub mod errors;
pub mod vote;

pub use domain::poll::{Poll, PollId, PollOption, OPTION_NAME};
pub use errors::{ApplicationError, DomainError, InterfaceError, POLL_NOT_FOUND_MESSAGE};
pub use vote::{apply_vote, apply_votes, ActionValue, VoteAction, VoteOutcome};
