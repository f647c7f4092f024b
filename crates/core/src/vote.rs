//! Single-choice vote engine.
//!
//! A vote action names an option by its `(name, value)` pair. Applying it
//! clears the user from every other option, then toggles the user on the
//! matched option, so a user is never counted for two options of one poll.
//!
//! Values are compared by coercing both sides to an option index: Slack echoes
//! button values back as strings, so `"1"`, `1` and `" 1 "` all address
//! option 1. Blank or non-numeric values address nothing.

use serde::Deserialize;

use crate::domain::poll::Poll;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Number(serde_json::Number),
    Text(String),
    /// Objects, arrays and booleans; they never address an option.
    Other(serde_json::Value),
}

impl ActionValue {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Number(number) => number
                .as_u64()
                .and_then(|value| usize::try_from(value).ok())
                .or_else(|| number.as_f64().and_then(index_from_float)),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<usize>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(index_from_float))
            }
            Self::Other(_) => None,
        }
    }
}

fn index_from_float(value: f64) -> Option<usize> {
    let integral = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
    // usize::MAX as f64 rounds up, so the bound is exclusive.
    (integral && value < usize::MAX as f64).then_some(value as usize)
}

impl From<usize> for ActionValue {
    fn from(value: usize) -> Self {
        Self::Number(serde_json::Number::from(value as u64))
    }
}

impl From<&str> for ActionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VoteAction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<ActionValue>,
}

impl VoteAction {
    pub fn new(name: impl Into<String>, value: impl Into<ActionValue>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }

    fn target_index(&self) -> Option<usize> {
        self.value.as_ref().and_then(ActionValue::as_index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Voted { option: usize },
    Retracted { option: usize },
    Ignored,
}

/// Applies one action for `user_id`. Actions that match no option leave the
/// poll untouched.
pub fn apply_vote(poll: &mut Poll, user_id: &str, action: &VoteAction) -> VoteOutcome {
    let Some(target) = action.target_index() else {
        return VoteOutcome::Ignored;
    };
    let Some(matched) = poll
        .options
        .iter()
        .position(|option| option.name == action.name && option.value == target)
    else {
        return VoteOutcome::Ignored;
    };

    for (index, option) in poll.options.iter_mut().enumerate() {
        if index != matched {
            option.voters.remove(user_id);
        }
    }

    let option = &mut poll.options[matched];
    if option.voters.remove(user_id) {
        VoteOutcome::Retracted { option: matched }
    } else {
        option.voters.insert(user_id.to_string());
        VoteOutcome::Voted { option: matched }
    }
}

/// Applies every action in order, each independently.
pub fn apply_votes<'a, I>(poll: &mut Poll, user_id: &str, actions: I) -> Vec<VoteOutcome>
where
    I: IntoIterator<Item = &'a VoteAction>,
{
    actions.into_iter().map(|action| apply_vote(poll, user_id, action)).collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{apply_vote, apply_votes, ActionValue, VoteAction, VoteOutcome};
    use crate::domain::poll::{Poll, PollId, OPTION_NAME};

    fn lunch_poll() -> Poll {
        Poll::new(PollId("lunch".to_string()), "Lunch?", ["Pizza", "Tacos", "Salad"])
    }

    fn vote_for(index: usize) -> VoteAction {
        VoteAction::new(OPTION_NAME, index)
    }

    #[test]
    fn voting_for_another_option_moves_the_vote() {
        let mut poll = lunch_poll();

        assert_eq!(apply_vote(&mut poll, "U1", &vote_for(0)), VoteOutcome::Voted { option: 0 });
        assert_eq!(apply_vote(&mut poll, "U1", &vote_for(1)), VoteOutcome::Voted { option: 1 });

        assert!(!poll.options[0].has_voter("U1"));
        assert!(poll.options[1].has_voter("U1"));
        assert_eq!(poll.choices_of("U1"), vec![1]);
    }

    #[test]
    fn repeating_a_vote_retracts_it() {
        let mut poll = lunch_poll();
        apply_vote(&mut poll, "U2", &vote_for(2));
        let before = poll.clone();

        assert_eq!(apply_vote(&mut poll, "U1", &vote_for(2)), VoteOutcome::Voted { option: 2 });
        assert_eq!(
            apply_vote(&mut poll, "U1", &vote_for(2)),
            VoteOutcome::Retracted { option: 2 }
        );

        assert_eq!(poll, before);
    }

    #[test]
    fn votes_from_different_users_accumulate() {
        let mut poll = lunch_poll();
        for user in ["U1", "U2", "U3"] {
            apply_vote(&mut poll, user, &vote_for(0));
        }

        assert_eq!(poll.options[0].vote_count(), 3);
        assert_eq!(poll.total_votes(), 3);
    }

    #[test]
    fn unmatched_actions_leave_the_poll_untouched() {
        let mut poll = lunch_poll();
        apply_vote(&mut poll, "U1", &vote_for(1));
        let before = poll.clone();

        let actions = [
            vote_for(9),
            VoteAction::new("not-an-option", 0_usize),
            VoteAction::new(OPTION_NAME, "pizza"),
            VoteAction::new(OPTION_NAME, ""),
            VoteAction { name: OPTION_NAME.to_string(), value: None },
        ];
        for action in &actions {
            assert_eq!(apply_vote(&mut poll, "U1", action), VoteOutcome::Ignored);
        }

        assert_eq!(poll, before);
    }

    #[test]
    fn string_values_coerce_to_option_indexes() {
        let mut poll = lunch_poll();

        apply_vote(&mut poll, "U1", &VoteAction::new(OPTION_NAME, "1"));
        assert_eq!(poll.choices_of("U1"), vec![1]);

        apply_vote(&mut poll, "U1", &VoteAction::new(OPTION_NAME, " 2 "));
        assert_eq!(poll.choices_of("U1"), vec![2]);
    }

    #[test]
    fn action_values_deserialize_from_numbers_and_strings() {
        let actions: Vec<VoteAction> = serde_json::from_str(
            r#"[{"name":"option","value":"0"},{"name":"option","value":1},{"name":"option","value":2.0}]"#,
        )
        .expect("actions should parse");

        let indexes: Vec<_> =
            actions.iter().map(|action| action.value.as_ref().and_then(ActionValue::as_index)).collect();
        assert_eq!(indexes, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn structured_values_parse_but_are_ignored() {
        let mut poll = lunch_poll();
        let actions: Vec<VoteAction> = serde_json::from_str(
            r#"[{"name":"option","value":{"index":0}},{"name":"option","value":[1]},{"name":"option","value":true}]"#,
        )
        .expect("actions should parse");

        let outcomes = apply_votes(&mut poll, "U1", &actions);

        assert!(outcomes.iter().all(|outcome| *outcome == VoteOutcome::Ignored));
        assert_eq!(poll.total_votes(), 0);
    }

    #[test]
    fn fractional_and_negative_values_match_nothing() {
        assert_eq!(ActionValue::from("1.5").as_index(), None);
        assert_eq!(ActionValue::from("-1").as_index(), None);
        assert_eq!(ActionValue::from("NaN").as_index(), None);
    }

    #[test]
    fn multiple_actions_apply_in_sequence() {
        let mut poll = lunch_poll();

        let outcomes = apply_votes(&mut poll, "U1", &[vote_for(0), vote_for(5), vote_for(2)]);

        assert_eq!(
            outcomes,
            vec![
                VoteOutcome::Voted { option: 0 },
                VoteOutcome::Ignored,
                VoteOutcome::Voted { option: 2 }
            ]
        );
        assert_eq!(poll.choices_of("U1"), vec![2]);
    }

    #[test]
    fn each_user_holds_at_most_one_choice_under_random_sequences() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut poll = lunch_poll();
        let users = ["U1", "U2", "U3", "U4"];

        for _ in 0..1_000 {
            let user = users[rng.gen_range(0..users.len())];
            let action = if rng.gen_bool(0.1) {
                VoteAction::new(OPTION_NAME, "garbage")
            } else {
                vote_for(rng.gen_range(0..4))
            };
            apply_vote(&mut poll, user, &action);

            for user in users {
                assert!(poll.choices_of(user).len() <= 1, "{user} holds more than one choice");
            }
        }
    }
}
