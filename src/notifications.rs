//! Self-expiring feed of outcome notifications.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::model::{Notification, Severity};

pub struct NotificationQueue {
    items: VecDeque<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Append a notification; it expires `ttl` after `now`. No de-duplication.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notification {
            id,
            message: message.into(),
            severity,
            expires: now + self.ttl,
        });
        id
    }

    /// Remove one notification early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        before != self.items.len()
    }

    /// Drop every notification whose lifetime has ended. Returns true if any went.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| now < n.expires);
        before != self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_order_is_insertion() {
        let mut q = NotificationQueue::new(Duration::from_secs(3));
        let now = Instant::now();
        let a = q.push("one", Severity::Info, now);
        let b = q.push("one", Severity::Info, now);
        let c = q.push("two", Severity::Error, now);
        assert!(a < b && b < c);
        let msgs: Vec<&str> = q.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(msgs, vec!["one", "one", "two"]);
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut q = NotificationQueue::new(Duration::from_secs(3));
        let t0 = Instant::now();
        q.push("first", Severity::Success, t0);
        q.push("second", Severity::Success, t0 + Duration::from_secs(2));

        assert!(!q.expire(t0 + Duration::from_millis(2999)));
        assert_eq!(q.len(), 2);

        assert!(q.expire(t0 + Duration::from_secs(3)));
        assert_eq!(q.iter().map(|n| n.message.as_str()).collect::<Vec<_>>(), vec!["second"]);

        q.expire(t0 + Duration::from_secs(5));
        assert!(q.is_empty());
    }

    #[test]
    fn dismiss_removes_before_expiry() {
        let mut q = NotificationQueue::new(Duration::from_secs(3));
        let now = Instant::now();
        let a = q.push("a", Severity::Info, now);
        let b = q.push("b", Severity::Info, now);
        assert!(q.dismiss(a));
        assert!(!q.dismiss(a));
        assert_eq!(q.latest().map(|n| n.id), Some(b));
    }
}
