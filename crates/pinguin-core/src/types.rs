use serde::{Deserialize, Serialize};

/// Delivery transport family for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            other => Err(crate::error::DomainError::invalid_input(format!(
                "unknown channel: {other}"
            ))),
        }
    }
}

/// Notification lifecycle status.
///
/// Transitions: `Queued -> InFlight -> {Sent, Failed, Queued}`;
/// `Queued -> Canceled`. `Sent` and `Canceled` are terminal and immutable.
/// `Failed` is terminal only once `attempts >= max_retries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Queued,
    InFlight,
    Sent,
    Failed,
    Canceled,
}

impl NotificationStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Canceled | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "in_flight" => Ok(Self::InFlight),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            other => Err(crate::error::DomainError::invalid_input(format!(
                "unknown notification status: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!NotificationStatus::Queued.is_terminal());
        assert!(!NotificationStatus::InFlight.is_terminal());
        assert!(NotificationStatus::Sent.is_terminal());
        assert!(NotificationStatus::Canceled.is_terminal());
        assert!(NotificationStatus::Failed.is_terminal());
    }

    #[test]
    fn channel_round_trips_through_str() {
        use std::str::FromStr;
        assert_eq!(Channel::from_str("email").unwrap(), Channel::Email);
        assert_eq!(Channel::from_str("sms").unwrap(), Channel::Sms);
        assert!(Channel::from_str("fax").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        use std::str::FromStr;
        for s in [
            NotificationStatus::Queued,
            NotificationStatus::InFlight,
            NotificationStatus::Sent,
            NotificationStatus::Failed,
            NotificationStatus::Canceled,
        ] {
            assert_eq!(NotificationStatus::from_str(s.as_str()).unwrap(), s);
        }
    }
}
