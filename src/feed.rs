use std::sync::{Mutex, PoisonError};

use actix::{Message, Recipient};

/// Sent to a subscriber whenever one of its owner's notes is created,
/// changed or removed.
#[derive(Clone, Debug, Message)]
#[rtype(result = "()")]
pub struct NotesChanged;

#[derive(Default)]
pub struct NoteFeed {
    subscribers: Mutex<Vec<(String, Recipient<NotesChanged>)>>,
}

impl NoteFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `recipient` for `owner_id`; drops closed subscribers.
    pub fn subscribe(&self, owner_id: &str, recipient: Recipient<NotesChanged>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|(_, recipient)| recipient.connected());
        subscribers.push((owner_id.to_string(), recipient));
    }

    /// Wakes every live subscriber of `owner_id`; drops closed ones.
    pub fn notify(&self, owner_id: &str) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|(_, recipient)| recipient.connected());
        for (owner, recipient) in subscribers.iter() {
            if owner == owner_id {
                recipient.do_send(NotesChanged);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
