// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for renewbot.
//!
//! This crate provides the adapter traits, the error type, the clock, and the
//! shared record model used throughout the workspace.

pub mod clock;
pub mod error;
pub mod record;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::RenewError;
pub use record::Record;
pub use types::{
    AdapterType, AlertInstance, DestinationId, HealthStatus, MessageId, TrackedMessage,
};

pub use traits::{ChannelAdapter, PluginAdapter, RecordStore};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatKind, ChatRef, OutboundMessage, TextFormat};

    #[test]
    fn renew_error_variants_render() {
        let config = RenewError::Config("missing token".into());
        assert_eq!(config.to_string(), "configuration error: missing token");

        let store = RenewError::store("timeout");
        assert_eq!(store.to_string(), "record store error: timeout");

        let channel = RenewError::channel("chat not found");
        assert_eq!(channel.to_string(), "channel error: chat not found");

        let _whitelist = RenewError::Whitelist {
            message: "read-only".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _schedule = RenewError::Schedule("bad pattern".into());
        let _internal = RenewError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::RecordStore] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn outbound_builders_set_format_and_thread() {
        let dest = DestinationId(-100);
        let msg = OutboundMessage::markdown(dest, "`x`").in_reply_to(MessageId(7));
        assert_eq!(msg.format, TextFormat::Markdown);
        assert_eq!(msg.reply_to, Some(MessageId(7)));

        let plain = OutboundMessage::plain(dest, "hi");
        assert_eq!(plain.format, TextFormat::Plain);
        assert!(plain.reply_to.is_none());
    }

    #[test]
    fn only_group_chats_count_as_groups() {
        let chat = |kind| ChatRef {
            id: DestinationId(1),
            kind,
        };
        assert!(chat(ChatKind::Group).is_group());
        assert!(chat(ChatKind::Supergroup).is_group());
        assert!(!chat(ChatKind::Private).is_group());
        assert!(!chat(ChatKind::Channel).is_group());
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&DestinationId(-1001)).unwrap();
        assert_eq!(json, "-1001");
        let id: MessageId = serde_json::from_str("42").unwrap();
        assert_eq!(id, MessageId(42));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_record_store<T: RecordStore>() {}
    }
}
