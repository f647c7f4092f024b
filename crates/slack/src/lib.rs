//! Slack wire formats for the poll bot.
//!
//! - **Slash commands** (`commands`) - `/poll Question?,Option A,Option B`
//! - **Interactive messages** (`events`) - button clicks posted back as `payload`
//! - **Message attachments** (`blocks`) - the rendered poll with vote badges
//! - **Request signing** (`signature`) - `X-Slack-Signature` verification
//!
//! # Flow
//!
//! ```text
//! /poll → parse_poll_command → Poll → render_poll → in_channel message
//! button click → parse_interaction → apply_votes → render_poll
//! ```

pub mod blocks;
pub mod commands;
pub mod events;
pub mod signature;
