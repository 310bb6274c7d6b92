//! Owner presence and messaging
//!
//! The core never looks players up itself. Hosts plug their player
//! registry and chat system in through [`Presence`].

use crate::owner::OwnerId;

/// Handle to an online owner that can receive rewards and messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub owner: OwnerId,
    pub name: String,
}

impl Recipient {
    pub fn new(owner: OwnerId, name: impl Into<String>) -> Self {
        Self { owner, name: name.into() }
    }
}

/// Presence lookup and in-game messaging port
pub trait Presence: Send + Sync {
    /// Whether the owner can currently receive rewards
    fn is_available(&self, owner: &OwnerId) -> bool;

    /// Resolve the owner to a recipient handle
    fn resolve(&self, owner: &OwnerId) -> Option<Recipient>;

    /// Deliver an already formatted message
    fn notify(&self, recipient: &Recipient, message: &str);
}

/// Presence for hosts with nobody online, e.g. offline tooling
#[derive(Debug, Clone, Copy, Default)]
pub struct NobodyOnline;

impl Presence for NobodyOnline {
    fn is_available(&self, _owner: &OwnerId) -> bool {
        false
    }

    fn resolve(&self, _owner: &OwnerId) -> Option<Recipient> {
        None
    }

    fn notify(&self, _recipient: &Recipient, _message: &str) {}
}

/// Recipient for `owner` if they are available right now
pub fn find_recipient<P: Presence + ?Sized>(presence: &P, owner: &OwnerId) -> Option<Recipient> {
    if !presence.is_available(owner) {
        log::debug!("Owner {} is not available", owner);
        return None;
    }
    let recipient = presence.resolve(owner);
    if recipient.is_none() {
        log::debug!("Owner {} is available but could not be resolved", owner);
    }
    recipient
}
