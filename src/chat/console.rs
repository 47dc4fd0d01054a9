//! Terminal front-end
//!
//! Plays every chat user from one terminal against a [`MemoryTransport`]:
//!
//! ```text
//! alice: !chess @bob      alice says "!chess <@2>" in the channel
//! alice +white            alice reacts 🌝 to the latest prompt
//! bob: e5                 bob plays e5
//! quit
//! ```
//!
//! Reaction shortcuts: `white` 🌝, `black` 🌚, `player` ♟️, `ai` 🎲; any
//! other token is used as the emoji itself.

use crate::chat::memory::{MemoryTransport, TranscriptEntry};
use crate::game::setup::{AI_EMOJI, BLACK_EMOJI, PLAYER_EMOJI, WHITE_EMOJI};
use shared::{ChannelId, OutgoingMessage, UserId};
use std::collections::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Unrecognized line {line:?}; use `name: text`, `name +emoji` or `quit`")]
    Unrecognized { line: String },

    #[error("Nothing to react to in this channel")]
    NothingToReact,
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Say { user: String, text: String },
    React { user: String, emoji: String },
    Quit,
}

impl ConsoleLine {
    /// Parse a line; `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, ConsoleError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(Some(ConsoleLine::Quit));
        }

        let unrecognized = || ConsoleError::Unrecognized {
            line: line.to_string(),
        };

        if let Some((user, text)) = line.split_once(':') {
            let user = user.trim();
            if is_name(user) {
                return Ok(Some(ConsoleLine::Say {
                    user: user.to_string(),
                    text: text.trim().to_string(),
                }));
            }
        }

        let (user, token) = line.split_once('+').ok_or_else(unrecognized)?;
        let (user, token) = (user.trim(), token.trim());
        if !is_name(user) || token.is_empty() {
            return Err(unrecognized());
        }

        Ok(Some(ConsoleLine::React {
            user: user.to_string(),
            emoji: reaction_shortcut(token).to_string(),
        }))
    }
}

fn is_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn reaction_shortcut(token: &str) -> &str {
    match token.to_lowercase().as_str() {
        "white" | "w" => WHITE_EMOJI,
        "black" | "b" => BLACK_EMOJI,
        "player" | "p" => PLAYER_EMOJI,
        "ai" | "ia" => AI_EMOJI,
        _ => token,
    }
}

/// Names typed at the console and the ids standing in for them
#[derive(Debug, Default)]
pub struct Directory {
    ids: HashMap<String, UserId>,
    names: HashMap<UserId, String>,
}

impl Directory {
    /// Id for `name`, allocating one on first use
    pub fn id_of(&mut self, name: &str) -> UserId {
        let key = name.to_lowercase();
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }

        let id = UserId(self.ids.len() as u64 + 1);
        self.ids.insert(key, id);
        self.names.insert(id, name.to_string());
        id
    }

    pub fn name_of(&self, id: UserId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Rewrite `@name` words as `<@id>` mentions.
    pub fn encode_mentions(&mut self, text: &str) -> String {
        text.split(' ')
            .map(|word| match word.strip_prefix('@') {
                Some(name) if is_name(name) => self.id_of(name).to_string(),
                _ => word.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rewrite known `<@id>` mentions as `@name`.
    pub fn decode_mentions(&self, text: &str) -> String {
        self.names
            .iter()
            .fold(text.to_string(), |acc, (id, name)| {
                acc.replace(&id.to_string(), &format!("@{name}"))
            })
    }
}

/// Console session bound to one channel of a hub
#[derive(Clone)]
pub struct Console {
    hub: MemoryTransport,
    channel: ChannelId,
    directory: Arc<Mutex<Directory>>,
}

impl Console {
    pub fn new(hub: MemoryTransport, channel: ChannelId) -> Self {
        Self {
            hub,
            channel,
            directory: Arc::new(Mutex::new(Directory::default())),
        }
    }

    fn with_directory<T>(&self, f: impl FnOnce(&mut Directory) -> T) -> T {
        f(&mut self.directory.lock())
    }

    /// Act on one line. Returns `false` once the user asked to quit.
    pub fn apply(&self, line: ConsoleLine) -> Result<bool, ConsoleError> {
        match line {
            ConsoleLine::Quit => Ok(false),
            ConsoleLine::Say { user, text } => {
                let (author, content) = self.with_directory(|directory| {
                    (directory.id_of(&user), directory.encode_mentions(&text))
                });
                self.hub.say(self.channel, author, content);
                Ok(true)
            }
            ConsoleLine::React { user, emoji } => {
                let target = self
                    .hub
                    .latest_reactable(self.channel)
                    .ok_or(ConsoleError::NothingToReact)?;
                let user = self.with_directory(|directory| directory.id_of(&user));
                self.hub.react_as(target.id, user, &emoji);
                Ok(true)
            }
        }
    }

    /// Feed `input` line by line until it ends or a quit line is read.
    pub async fn run<R>(&self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let parsed = ConsoleLine::parse(&line).and_then(|parsed| match parsed {
                Some(parsed) => self.apply(parsed),
                None => Ok(true),
            });

            match parsed {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => warn!("[CONSOLE] {}", err),
            }
        }
        info!("[CONSOLE] Input closed");
        Ok(())
    }

    /// Human-readable form of a transcript entry, or `None` for entries the
    /// console user typed themselves.
    pub fn describe(&self, entry: &TranscriptEntry) -> Option<String> {
        self.with_directory(|directory| {
            let text = match entry {
                TranscriptEntry::Posted { content, .. } => match content {
                    OutgoingMessage::Text(text) => format!("[bot] {text}"),
                    OutgoingMessage::Embed(embed) => {
                        let players = embed
                            .fields
                            .iter()
                            .map(|field| format!("{} {}", field.name, field.value))
                            .collect::<Vec<_>>()
                            .join("  ");
                        let mut card = format!("[board] {players}");
                        if let Some(image) = &embed.image_url {
                            card.push_str(&format!("\n        {image}"));
                        }
                        if let Some(footer) = &embed.footer {
                            card.push_str(&format!("\n        {footer}"));
                        }
                        card
                    }
                },
                TranscriptEntry::Direct { to, content, .. } => {
                    format!("[bot -> {to}] {content}")
                }
                TranscriptEntry::Reacted { emoji, .. } => format!("[bot] option {emoji}"),
                TranscriptEntry::Deleted { .. } | TranscriptEntry::Received(_) => return None,
            };
            Some(directory.decode_mentions(&text))
        })
    }

    /// Print everything the bot does to stdout.
    pub fn spawn_printer(&self) -> JoinHandle<()> {
        let console = self.clone();
        let mut entries = self.hub.watch();

        tokio::spawn(async move {
            loop {
                match entries.recv().await {
                    Ok(entry) => {
                        if let Some(text) = console.describe(&entry) {
                            println!("{text}");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("[CONSOLE] {} transcript entries skipped", skipped)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatTransport;
    use shared::{ChatEvent, Embed};

    const CHANNEL: ChannelId = ChannelId(1);

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            ConsoleLine::parse("alice: !chess @bob"),
            Ok(Some(ConsoleLine::Say {
                user: "alice".to_string(),
                text: "!chess @bob".to_string(),
            }))
        );
        assert_eq!(
            ConsoleLine::parse("bob +white"),
            Ok(Some(ConsoleLine::React {
                user: "bob".to_string(),
                emoji: WHITE_EMOJI.to_string(),
            }))
        );
        assert_eq!(
            ConsoleLine::parse("bob + 👍"),
            Ok(Some(ConsoleLine::React {
                user: "bob".to_string(),
                emoji: "👍".to_string(),
            }))
        );
        assert_eq!(ConsoleLine::parse("  QUIT "), Ok(Some(ConsoleLine::Quit)));
        assert_eq!(ConsoleLine::parse("   "), Ok(None));
        assert!(ConsoleLine::parse("just words").is_err());
        assert!(ConsoleLine::parse("two words: hi").is_err());
    }

    #[test]
    fn test_directory_round_trips_mentions() {
        let mut directory = Directory::default();
        let encoded = directory.encode_mentions("!chess @Bob");
        assert_eq!(encoded, "!chess <@1>");
        assert_eq!(directory.id_of("bob"), UserId(1));
        assert_eq!(
            directory.decode_mentions("Congratulations <@1>, you win 🎉"),
            "Congratulations @Bob, you win 🎉"
        );
    }

    #[tokio::test]
    async fn test_console_lines_become_hub_events() {
        let hub = MemoryTransport::new();
        let console = Console::new(hub.clone(), CHANNEL);

        let prompt = hub.send_message(CHANNEL, "pick".into()).await.unwrap();
        hub.react(&prompt, WHITE_EMOJI).await.unwrap();

        let input = "alice: !chess @bob\nalice +white\nquit\nbob: ignored\n";
        console.run(input.as_bytes()).await.unwrap();

        let received: Vec<ChatEvent> = hub
            .transcript()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Received(event) => Some(event),
                _ => None,
            })
            .collect();
        assert_eq!(received.len(), 2, "lines after quit are not read");

        match &received[0] {
            ChatEvent::Message(message) => {
                assert_eq!(message.author, UserId(1));
                assert_eq!(message.mentions, vec![UserId(2)]);
            }
            other => panic!("expected a message, got {other:?}"),
        }
        match &received[1] {
            ChatEvent::Reaction(reaction) => {
                assert_eq!(reaction.message, prompt.id);
                assert_eq!(reaction.emoji, WHITE_EMOJI);
            }
            other => panic!("expected a reaction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_describe_uses_names() {
        let hub = MemoryTransport::new();
        let console = Console::new(hub.clone(), CHANNEL);
        console
            .apply(ConsoleLine::Say {
                user: "alice".to_string(),
                text: "hi".to_string(),
            })
            .unwrap();

        let card = Embed::new(0x0099ff)
            .field("White:", "<@1>", true)
            .image("https://chessboardimage.com/x.png");
        hub.send_message(CHANNEL, card.into()).await.unwrap();
        let entry = hub.transcript().pop().unwrap();

        let text = console.describe(&entry).unwrap();
        assert!(text.starts_with("[board] White: @alice"));
        assert!(text.contains("https://chessboardimage.com/x.png"));
    }
}
