use serde::{Deserialize, Serialize};

/// Address and credentials of the worker host a task was assigned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTarget {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Flags passed to the remote shell ahead of the destination, e.g. `["-i", "key.pem"]`.
    #[serde(default)]
    pub options: Vec<String>,
}

impl HostTarget {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            options: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// `user@host`, or the bare host when no login principal is set.
    pub fn destination(&self) -> String {
        match self.user.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}
