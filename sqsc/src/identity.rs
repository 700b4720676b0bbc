use std::fmt;

/// How requests to the queue service are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Identity {
    /// Requests are sent unsigned.
    Anonymous,
    /// Requests are signed with a fixed access key and secret.
    Static { key: String, secret: String },
}

impl Identity {
    /// Static credentials when both `key` and `secret` are non-empty, anonymous otherwise.
    ///
    /// A key without a secret (or the reverse) is not an error, it falls back to anonymous.
    pub fn resolve(key: Option<&str>, secret: Option<&str>) -> Self {
        match (non_empty(key), non_empty(secret)) {
            (Some(key), Some(secret)) => Self::Static {
                key: key.to_owned(),
                secret: secret.to_owned(),
            },
            _ => Self::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// Keeps the secret out of logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Static { key, .. } => f
                .debug_struct("Static")
                .field("key", key)
                .finish_non_exhaustive(),
        }
    }
}
