use std::borrow::Cow;

use pollbot_core::domain::poll::{Poll, PollOption};
use serde::Serialize;

/// Vote-count glyphs indexed by count. Zero votes shows no glyph.
pub const COUNT_BADGES: [&str; 11] = ["", "❶", "❷", "❸", "❹", "❺", "❻", "❼", "❽", "❾", "❿"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Button,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub name: String,
    pub text: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub value: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub text: String,
    pub callback_id: String,
    pub attachment_type: String,
    pub actions: Vec<ActionButton>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub response_type: ResponseType,
    pub attachments: Vec<Attachment>,
}

pub struct MessageBuilder {
    response_type: ResponseType,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    pub fn new(response_type: ResponseType) -> Self {
        Self { response_type, attachments: Vec::new() }
    }

    pub fn in_channel() -> Self {
        Self::new(ResponseType::InChannel)
    }

    pub fn attachment<F>(
        mut self,
        callback_id: impl Into<String>,
        text: impl Into<String>,
        build: F,
    ) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.attachments.push(Attachment {
            text: text.into(),
            callback_id: callback_id.into(),
            attachment_type: "default".to_string(),
            actions: builder.build(),
        });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { response_type: self.response_type, attachments: self.attachments }
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    actions: Vec<ActionButton>,
}

impl ActionsBuilder {
    pub fn button(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        value: usize,
    ) -> &mut Self {
        self.actions.push(ActionButton {
            name: name.into(),
            text: text.into(),
            action_type: ActionType::Button,
            value,
        });
        self
    }

    fn build(self) -> Vec<ActionButton> {
        self.actions
    }
}

/// Compact vote-count glyph: `❶`..`❿` for 1 to 10, `❨n❩` above that.
pub fn count_badge(count: usize) -> Cow<'static, str> {
    match COUNT_BADGES.get(count) {
        Some(badge) => Cow::Borrowed(*badge),
        None => Cow::Owned(format!("❨{count}❩")),
    }
}

pub fn option_text(option: &PollOption) -> String {
    format!("{} {}", option.label, count_badge(option.vote_count()))
}

/// Renders the poll as an in-channel message with one button per option.
/// Voter identities never leave the poll.
pub fn render_poll(poll: &Poll) -> MessageTemplate {
    MessageBuilder::in_channel()
        .attachment(poll.id.as_str(), poll.question.as_str(), |actions| {
            for option in &poll.options {
                actions.button(option.name.as_str(), option_text(option), option.value);
            }
        })
        .build()
}
