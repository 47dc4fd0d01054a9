use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user handle. Displays as a chat mention (`<@id>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.0)
    }
}

/// A text channel shared by several users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#{}>", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Where a message was delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Text(ChannelId),
    Direct(UserId),
}

/// Handle to a delivered message, enough to react to or delete it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: Channel,
    pub id: MessageId,
}

/// A message authored by a user in a text channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub author: UserId,
    pub content: String,
    /// Users mentioned in `content`, in order of appearance
    pub mentions: Vec<UserId>,
}

impl ChatMessage {
    /// Build a message, extracting `<@id>` / `<@!id>` mentions from the content.
    pub fn new(id: MessageId, channel: ChannelId, author: UserId, content: impl Into<String>) -> Self {
        let content = content.into();
        let mentions = parse_mentions(&content);
        Self {
            id,
            channel,
            author,
            content,
            mentions,
        }
    }

    pub fn reference(&self) -> MessageRef {
        MessageRef {
            channel: Channel::Text(self.channel),
            id: self.id,
        }
    }

    pub fn first_mention(&self) -> Option<UserId> {
        self.mentions.first().copied()
    }
}

/// A user reacting to a message with an emoji
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub message: MessageId,
    pub user: UserId,
    pub emoji: String,
}

/// Inbound traffic from users
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    Message(ChatMessage),
    Reaction(Reaction),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich message payload (colored card with fields, an image and a footer)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub image_url: Option<String>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(color: u32) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }
}

/// Bot → channel payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutgoingMessage {
    Text(String),
    Embed(Embed),
}

impl OutgoingMessage {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutgoingMessage::Text(text) => Some(text),
            OutgoingMessage::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Embed> {
        match self {
            OutgoingMessage::Embed(embed) => Some(embed),
            OutgoingMessage::Text(_) => None,
        }
    }
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        OutgoingMessage::Text(text)
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        OutgoingMessage::Text(text.to_string())
    }
}

impl From<Embed> for OutgoingMessage {
    fn from(embed: Embed) -> Self {
        OutgoingMessage::Embed(embed)
    }
}

/// Extract user mentions (`<@123>` or `<@!123>`) in order of appearance.
pub fn parse_mentions(content: &str) -> Vec<UserId> {
    let mut mentions = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("<@") {
        let after = &rest[start + 2..];
        let digits_start = after.strip_prefix('!').unwrap_or(after);
        let Some(end) = digits_start.find('>') else {
            break;
        };
        if let Ok(id) = digits_start[..end].parse::<u64>() {
            mentions.push(UserId(id));
        }
        rest = after;
    }

    mentions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_displays_as_mention() {
        assert_eq!(UserId(42).to_string(), "<@42>");
    }

    #[test]
    fn test_parse_mentions_in_order() {
        let mentions = parse_mentions("!chess <@7> and <@!9>");
        assert_eq!(mentions, vec![UserId(7), UserId(9)]);
    }

    #[test]
    fn test_parse_mentions_ignores_malformed() {
        assert!(parse_mentions("<@abc> <@12").is_empty());
        assert_eq!(parse_mentions("<@x> <@3>"), vec![UserId(3)]);
    }

    #[test]
    fn test_chat_message_extracts_first_mention() {
        let msg = ChatMessage::new(MessageId(1), ChannelId(2), UserId(3), "!chess <@4>");
        assert_eq!(msg.first_mention(), Some(UserId(4)));
        assert_eq!(
            msg.reference(),
            MessageRef {
                channel: Channel::Text(ChannelId(2)),
                id: MessageId(1)
            }
        );
    }

    #[test]
    fn test_embed_builder() {
        let embed = Embed::new(0x0099ff)
            .field("White:", "<@1>", true)
            .image("https://example.org/board.png")
            .footer("History: e4");

        assert_eq!(embed.color, 0x0099ff);
        assert_eq!(embed.fields.len(), 1);
        assert!(embed.fields[0].inline);
        assert_eq!(embed.footer.as_deref(), Some("History: e4"));
    }

    #[test]
    fn test_chat_event_reaction_serialization() {
        let event = ChatEvent::Reaction(Reaction {
            message: MessageId(10),
            user: UserId(1),
            emoji: "🌝".to_string(),
        });
        let bytes = bincode::serialize(&event).expect("Should serialize");
        let decoded: ChatEvent = bincode::deserialize(&bytes).expect("Should deserialize");
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_outgoing_embed_json_shape() {
        let msg = OutgoingMessage::from(Embed::new(1).footer("History: e4"));
        let json = serde_json::to_string(&msg).expect("Should serialize");
        assert!(json.contains("Embed"));
        assert!(json.contains("History: e4"));
        assert!(msg.as_text().is_none());
    }
}
