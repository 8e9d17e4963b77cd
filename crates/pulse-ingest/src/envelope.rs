//! Inbound message envelope and its normalization to `(text, user, name)`.
//!
//! The gateway delivers a message object with one field per content kind,
//! next to bookkeeping keys such as `messageContextInfo`. A message may be
//! wrapped once in an ephemeral or view-once container. Normalization
//! unwraps at most one wrapper level, then takes the first non-empty text
//! field. Anything without usable text or identity is rejected, as are
//! messages sent by the connected account itself.

use serde::{Deserialize, Serialize};

/// Raw envelope as delivered by the messaging gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    #[serde(default)]
    pub key: MessageKey,
    /// Sender's self-chosen display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
}

/// Addressing part of an envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    /// Chat the message arrived in (the group for group messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_jid: Option<String>,
    /// Sender inside a group chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    /// Sent by the connected account.
    #[serde(default)]
    pub from_me: bool,
}

/// Message object. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedTextMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_message: Option<MediaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons_response_message: Option<ButtonReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_button_reply_message: Option<ButtonReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_response_message: Option<ListReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_message: Option<WrappedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_once_message: Option<WrappedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_once_message_v2: Option<WrappedMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedTextMessage {
    #[serde(default)]
    pub text: Option<String>,
}

/// Image, video or document; only the caption carries text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMessage {
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonReply {
    #[serde(default)]
    pub selected_display_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListReply {
    #[serde(default)]
    pub title: Option<String>,
}

/// Ephemeral or view-once container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WrappedMessage {
    #[serde(default)]
    pub message: Option<Box<MessageBody>>,
}

impl MessageBody {
    /// Plain text message body.
    pub fn conversation(text: &str) -> Self {
        Self {
            conversation: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// The first wrapper present, in gateway precedence.
    fn wrapper(&self) -> Option<&WrappedMessage> {
        [
            &self.ephemeral_message,
            &self.view_once_message,
            &self.view_once_message_v2,
        ]
        .into_iter()
        .find_map(Option::as_ref)
    }

    /// First non-empty text field. Wrappers are not looked into.
    fn first_text(&self) -> Option<&str> {
        [
            self.conversation.as_deref(),
            self.extended_text_message
                .as_ref()
                .and_then(|m| m.text.as_deref()),
            self.image_message.as_ref().and_then(|m| m.caption.as_deref()),
            self.video_message.as_ref().and_then(|m| m.caption.as_deref()),
            self.document_message
                .as_ref()
                .and_then(|m| m.caption.as_deref()),
            self.buttons_response_message
                .as_ref()
                .and_then(|m| m.selected_display_text.as_deref()),
            self.template_button_reply_message
                .as_ref()
                .and_then(|m| m.selected_display_text.as_deref()),
            self.list_response_message
                .as_ref()
                .and_then(|m| m.title.as_deref()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
    }
}

/// Result of normalizing an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub text: String,
    pub user_id: String,
    pub display_name: String,
}

impl MessageEnvelope {
    /// Convenience constructor for a plain text group message.
    pub fn text(participant: &str, push_name: &str, text: &str) -> Self {
        Self {
            key: MessageKey {
                remote_jid: None,
                participant: Some(participant.to_string()),
                from_me: false,
            },
            push_name: Some(push_name.to_string()),
            message: Some(MessageBody::conversation(text)),
        }
    }

    /// Plain text carried by the envelope, after unwrapping one wrapper level.
    pub fn text_content(&self) -> Option<&str> {
        let body = self.message.as_ref()?;
        let terminal = match body.wrapper() {
            Some(wrapped) => wrapped.message.as_deref()?,
            None => body,
        };
        terminal.first_text()
    }

    /// Sender id: the group participant, falling back to the chat id.
    pub fn sender_id(&self) -> Option<&str> {
        self.key
            .participant
            .as_deref()
            .or(self.key.remote_jid.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Extract `(text, user, display name)`, or `None` when the envelope has
    /// no usable text or sender, or was sent by the connected account.
    pub fn normalize(&self) -> Option<NormalizedMessage> {
        if self.key.from_me {
            return None;
        }
        let text = self.text_content()?;
        let user_id = self.sender_id()?;
        let display_name = self
            .push_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(user_id);

        Some(NormalizedMessage {
            text: text.to_string(),
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
        })
    }
}
