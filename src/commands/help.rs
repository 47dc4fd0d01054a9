use super::{Command, CommandContext, CommandResult};
use async_trait::async_trait;
use shared::ChatMessage;

/// `help`: list every command's usage line
pub struct HelpCommand {
    lines: Vec<String>,
}

impl HelpCommand {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn usage(prefix: &str) -> String {
        format!("Use {prefix}help to list the commands.")
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn names(&self) -> &[&'static str] {
        &["help"]
    }

    fn help(&self, prefix: &str) -> String {
        Self::usage(prefix)
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        message: &ChatMessage,
        _args: &[String],
    ) -> CommandResult<()> {
        ctx.transport()
            .send_message(message.channel, self.lines.join("\n").into())
            .await?;
        Ok(())
    }
}
