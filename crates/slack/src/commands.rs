use pollbot_core::domain::poll::{Poll, PollId};
use serde::Deserialize;

/// Form fields Slack posts for a slash command. Only `text` drives poll
/// creation; the rest is carried for logging.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SlashCommandPayload {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollCommand {
    pub question: String,
    pub options: Vec<String>,
}

impl PollCommand {
    pub fn into_poll(self, id: PollId) -> Poll {
        Poll::new(id, self.question, self.options)
    }
}

/// Splits `"<question>,<option>,<option>,..."` on every comma.
///
/// Segments are kept verbatim: no trimming, and a trailing comma yields an
/// empty final option.
pub fn parse_poll_command(text: &str) -> PollCommand {
    let mut segments = text.split(',');
    let question = segments.next().unwrap_or_default().to_string();
    let options = segments.map(str::to_string).collect();

    PollCommand { question, options }
}
