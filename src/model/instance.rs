use std::fmt;

/// A managed gateway session as returned by the list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub name: String,                 // unique, immutable once created
    pub profile_name: Option<String>, // WhatsApp profile name, if paired
    pub owner: Option<String>,        // owner JID / phone, if paired
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_name: None,
            owner: None,
        }
    }
}

/// Normalized connection state of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
    Error,
    Unknown,
}

impl ConnectionState {
    /// Map a raw state string from the API onto the normalized enum.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "open" | "connected" | "online" => ConnectionState::Connected,
            "connecting" | "loading" => ConnectionState::Connecting,
            "close" | "closed" | "disconnected" | "offline" => ConnectionState::Disconnected,
            "error" => ConnectionState::Error,
            _ => ConnectionState::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Error => "Error",
            ConnectionState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
            ConnectionState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Named predicates used by the select-by-state shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateFilter {
    Connected,
    Connecting,
    UnknownOrDisconnected,
}

impl StateFilter {
    /// `None` means no state has been fetched yet for the instance.
    pub fn matches(&self, state: Option<ConnectionState>) -> bool {
        match self {
            StateFilter::Connected => state == Some(ConnectionState::Connected),
            StateFilter::Connecting => state == Some(ConnectionState::Connecting),
            StateFilter::UnknownOrDisconnected => matches!(
                state,
                None | Some(ConnectionState::Unknown) | Some(ConnectionState::Disconnected)
            ),
        }
    }
}

/// Transient per-instance reset indicator. `Idle` is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetState {
    Idle,
    Loading,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_states_normalize() {
        assert_eq!(ConnectionState::from_raw("open"), ConnectionState::Connected);
        assert_eq!(ConnectionState::from_raw("ONLINE"), ConnectionState::Connected);
        assert_eq!(ConnectionState::from_raw("loading"), ConnectionState::Connecting);
        assert_eq!(ConnectionState::from_raw("close"), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::from_raw("offline"), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::from_raw("error"), ConnectionState::Error);
        assert_eq!(ConnectionState::from_raw("refused"), ConnectionState::Unknown);
        assert_eq!(ConnectionState::from_raw(""), ConnectionState::Unknown);
    }

    #[test]
    fn unknown_filter_includes_missing_state() {
        let f = StateFilter::UnknownOrDisconnected;
        assert!(f.matches(None));
        assert!(f.matches(Some(ConnectionState::Disconnected)));
        assert!(f.matches(Some(ConnectionState::Unknown)));
        assert!(!f.matches(Some(ConnectionState::Error)));
        assert!(!f.matches(Some(ConnectionState::Connected)));
    }
}
