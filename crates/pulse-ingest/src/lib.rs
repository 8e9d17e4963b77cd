//! Pulse Ingest — envelope normalization, token extraction, lead signals.

pub mod aliases;
pub mod envelope;
pub mod extract;
pub mod vocabulary;

pub use aliases::{AliasRegistry, StaticAliases, TokenAlias};
pub use envelope::{
    ButtonReply, ExtendedTextMessage, ListReply, MediaMessage, MessageBody, MessageEnvelope,
    MessageKey, NormalizedMessage, WrappedMessage,
};
pub use extract::signals::{LeadSignals, SignalDetector};
pub use extract::text::{fold_diacritics, normalize_text};
pub use extract::tokens::extract_candidates;
