use std::collections::HashSet;
use std::fmt;

use rand::Rng;

/// Name tag shared by every poll option; part of an option's matching identity.
pub const OPTION_NAME: &str = "option";

/// Largest eight-digit base-36 number (`zzzzzzzz`).
pub const POLL_ID_SPACE: u64 = 2_821_109_907_455;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PollId(pub String);

impl PollId {
    /// Draws a random base-36 identifier of at most eight characters.
    ///
    /// Uniqueness is probabilistic only; nothing checks for collisions.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(to_base36(rng.gen_range(0..POLL_ID_SPACE)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(8);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|digit| *digit as char).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollOption {
    pub name: String,
    pub label: String,
    pub value: usize,
    pub voters: HashSet<String>,
}

impl PollOption {
    pub fn vote_count(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voter(&self, user_id: &str) -> bool {
        self.voters.contains(user_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Builds a poll whose options keep the given order; each option's `value`
    /// is its position.
    pub fn new<I, S>(id: PollId, question: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = labels
            .into_iter()
            .enumerate()
            .map(|(value, label)| PollOption {
                name: OPTION_NAME.to_string(),
                label: label.into(),
                value,
                voters: HashSet::new(),
            })
            .collect();

        Self { id, question: question.into(), options }
    }

    pub fn total_votes(&self) -> usize {
        self.options.iter().map(PollOption::vote_count).sum()
    }

    /// Positions of every option the user currently appears in.
    pub fn choices_of(&self, user_id: &str) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.has_voter(user_id))
            .map(|(index, _)| index)
            .collect()
    }
}
