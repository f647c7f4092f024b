use std::sync::Arc;

use axum::{extract::State, Form, Json};
use pollbot_core::{
    domain::poll::{Poll, PollId},
    errors::{ApplicationError, DomainError},
    vote::{apply_votes, VoteOutcome},
};
use pollbot_db::PollRepository;
use pollbot_slack::{
    blocks::{render_poll, MessageTemplate},
    commands::{parse_poll_command, SlashCommandPayload},
    events::{parse_interaction, InteractionForm},
};
use tracing::{debug, info, warn};

use crate::error::{new_correlation_id, ApiError};

#[derive(Clone)]
pub struct PollsState {
    pub polls: Arc<dyn PollRepository>,
}

impl PollsState {
    pub fn new(polls: Arc<dyn PollRepository>) -> Self {
        Self { polls }
    }
}

/// `POST /create`: builds a poll from the slash-command text and posts it.
pub async fn create_poll(
    State(state): State<PollsState>,
    Form(command): Form<SlashCommandPayload>,
) -> Result<Json<MessageTemplate>, ApiError> {
    let correlation_id = new_correlation_id();
    let poll = parse_poll_command(&command.text).into_poll(PollId::generate());

    state.polls.save(poll.clone()).await.map_err(|error| {
        ApiError::new(ApplicationError::Persistence(error.to_string()), &correlation_id)
    })?;

    info!(
        event_name = "poll.created",
        correlation_id = %correlation_id,
        poll_id = %poll.id,
        command = %command.command,
        user_id = %command.user_id,
        team_id = %command.team_id,
        channel_id = %command.channel_id,
        option_count = poll.options.len(),
        "poll created"
    );

    Ok(Json(render_poll(&poll)))
}

/// `POST /respond`: applies button clicks to the poll and re-renders it.
pub async fn respond_to_poll(
    State(state): State<PollsState>,
    Form(form): Form<InteractionForm>,
) -> Result<Json<MessageTemplate>, ApiError> {
    let correlation_id = new_correlation_id();
    let payload = parse_interaction(&form.payload).map_err(|error| {
        warn!(
            event_name = "poll.payload.rejected",
            correlation_id = %correlation_id,
            error = %error,
            "interaction payload could not be parsed"
        );
        ApiError::new(ApplicationError::InvalidPayload(error.to_string()), &correlation_id)
    })?;

    let poll_id = payload.poll_id();
    let user_id = payload.user.id.clone();
    let mut outcomes = Vec::new();
    let updated = state
        .polls
        .update(
            &poll_id,
            Box::new(|poll: &mut Poll| {
                outcomes = apply_votes(poll, &user_id, &payload.actions);
            }),
        )
        .await
        .map_err(|error| {
            ApiError::new(ApplicationError::Persistence(error.to_string()), &correlation_id)
        })?;

    let Some(poll) = updated else {
        info!(
            event_name = "poll.not_found",
            correlation_id = %correlation_id,
            poll_id = %poll_id,
            "vote for unknown poll"
        );
        return Err(ApiError::new(DomainError::PollNotFound(poll_id).into(), &correlation_id));
    };

    for outcome in &outcomes {
        match outcome {
            VoteOutcome::Voted { option } | VoteOutcome::Retracted { option } => info!(
                event_name = "poll.vote.applied",
                correlation_id = %correlation_id,
                poll_id = %poll.id,
                option,
                retracted = matches!(outcome, VoteOutcome::Retracted { .. }),
                "vote applied"
            ),
            VoteOutcome::Ignored => debug!(
                event_name = "poll.vote.ignored",
                correlation_id = %correlation_id,
                poll_id = %poll.id,
                "action matched no option"
            ),
        }
    }

    Ok(Json(render_poll(&poll)))
}
