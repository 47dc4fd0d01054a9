use super::{Command, CommandContext, CommandResult};
use async_trait::async_trait;
use chrono::{Local, NaiveTime, Timelike};
use shared::{ChatMessage, UserId};

/// `time`: reply with the bot's local time as `H : M`
pub struct TimeCommand {
    clock: fn() -> NaiveTime,
}

impl TimeCommand {
    pub fn with_clock(clock: fn() -> NaiveTime) -> Self {
        Self { clock }
    }

    fn reply(author: UserId, now: NaiveTime) -> String {
        format!("{author}, {} : {}", now.hour(), now.minute())
    }
}

impl Default for TimeCommand {
    fn default() -> Self {
        Self::with_clock(|| Local::now().time())
    }
}

#[async_trait]
impl Command for TimeCommand {
    fn names(&self) -> &[&'static str] {
        &["time"]
    }

    fn help(&self, prefix: &str) -> String {
        format!("Use {prefix}time to show current time.")
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        message: &ChatMessage,
        _args: &[String],
    ) -> CommandResult<()> {
        let text = Self::reply(message.author, (self.clock)());
        ctx.transport()
            .send_message(message.channel, text.into())
            .await?;
        Ok(())
    }
}
