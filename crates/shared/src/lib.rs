//! Chat-side data types shared by the bot runtime, the transports and the
//! health backend.

pub mod protocol;

pub use protocol::{
    Channel, ChannelId, ChatEvent, ChatMessage, Embed, EmbedField, MessageId, MessageRef,
    OutgoingMessage, Reaction, UserId,
};
