//! Outbound friendship events.
//!
//! Every mutation on the social graph publishes a typed event describing
//! what happened and to whom. The default sink only logs; a deployment that
//! wants to fan these out into rooms or push notifications swaps in its own
//! [`Notifier`].

use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FriendshipEvent {
    RequestSent {
        from_user_id: String,
        to_user_id: String,
        request_id: i64,
        message: String,
    },
    RequestAccepted {
        user_id: String,
        friend_id: String,
    },
    RequestRejected {
        user_id: String,
        friend_id: String,
    },
    FriendRemoved {
        user_id: String,
        friend_id: String,
    },
}

pub trait Notifier: Send + Sync {
    fn publish(&self, event: FriendshipEvent);
}

/// Sink that logs events instead of delivering them anywhere.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish(&self, event: FriendshipEvent) {
        debug!("outbound event: {event:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = FriendshipEvent::RequestSent {
            from_user_id: "@alice:example.com".to_string(),
            to_user_id: "@bob:example.com".to_string(),
            request_id: 7,
            message: "hi".to_string(),
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["kind"], "request_sent");
        assert_eq!(value["request_id"], 7);

        let event = FriendshipEvent::FriendRemoved {
            user_id: "@alice:example.com".to_string(),
            friend_id: "@bob:example.com".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap()["kind"],
            "friend_removed"
        );
    }
}
