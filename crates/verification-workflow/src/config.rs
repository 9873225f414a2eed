//! Verification settings.

use std::time::Duration;

/// Knobs for the verification workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Guild whose verified role is granted.
    pub guild_id: String,
    pub verified_role: String,
    /// Period between profile checks. The first check happens one period after start.
    pub poll_interval: Duration,
    /// Session lifetime.
    pub session_timeout: Duration,
    /// Forum profile field group holding the fields below.
    pub field_group: String,
    pub code_field: String,
    pub username_field: String,
    pub chat_id_field: String,
    /// Shorter values in the code field are treated as not pasted yet.
    pub min_code_len: usize,
    /// Shown when the argument is not a profile URL.
    pub profile_example: String,
}

impl VerificationConfig {
    pub fn new(guild_id: impl Into<String>, verified_role: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            verified_role: verified_role.into(),
            poll_interval: Duration::from_secs(5),
            session_timeout: Duration::from_secs(300),
            field_group: "Discord".to_string(),
            code_field: "Verification Code".to_string(),
            username_field: "Discord Username".to_string(),
            chat_id_field: "Discord ID".to_string(),
            min_code_len: 8,
            profile_example: "https://forum.example.com/profile/123-name/".to_string(),
        }
    }

    pub fn with_timing(mut self, poll_interval: Duration, session_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.session_timeout = session_timeout;
        self
    }

    pub fn with_profile_example(mut self, example: impl Into<String>) -> Self {
        self.profile_example = example.into();
        self
    }
}

/// Human phrasing of a session length ("5 minutes", "90 seconds").
pub fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}
