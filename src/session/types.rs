//! Persisted session schema and the pure lookup taxonomy.
//!
//! DESIGN
//! ======
//! The `user` entry is whatever the login endpoint returned, JSON-encoded.
//! Only the fields the portals read are typed; everything else is carried in
//! `extra` so writing a session back never drops server-provided data.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `userType` value the admin portal requires.
pub const ADMIN_USER_TYPE: &str = "admin";

/// Fallback greeting name when the record carries no usable name.
const FALLBACK_GREETING_NAME: &str = "User";

/// Fallback sidebar name for admin records without a name.
const FALLBACK_ADMIN_NAME: &str = "Admin";

/// User record stored alongside the bearer token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role discriminator; only `"admin"` passes the admin gate.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    /// Server fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    /// Name used in the navbar greeting.
    ///
    /// `firstName`, else the first word of `fullName`, else `"User"`.
    pub fn greeting_name(&self) -> &str {
        if let Some(first) = non_blank(self.first_name.as_deref()) {
            return first;
        }
        non_blank(self.full_name.as_deref())
            .and_then(|full| full.split_whitespace().next())
            .unwrap_or(FALLBACK_GREETING_NAME)
    }

    /// Name shown in the admin sidebar.
    pub fn display_name(&self) -> String {
        if let Some(full) = non_blank(self.full_name.as_deref()) {
            return full.to_owned();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() { FALLBACK_ADMIN_NAME.to_owned() } else { joined }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type.as_deref() == Some(ADMIN_USER_TYPE)
    }
}

/// An authenticated identity: bearer token plus its user record.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self { token: token.into(), user }
    }
}

/// Result of reading the two persisted fields.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionLookup {
    Present(Session),
    /// Either field is missing. A normal state, not an error.
    Absent,
    /// Both fields exist but the user record is not a JSON object.
    /// Mistyped known fields inside an object do not count.
    Malformed,
}

impl SessionLookup {
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Present(session) => Some(session),
            Self::Absent | Self::Malformed => None,
        }
    }
}

/// Classify raw persisted values.
///
/// A token without a user (or the reverse) is `Absent`; the pair is only
/// valid together.
pub fn classify(token: Option<&str>, user: Option<&str>) -> SessionLookup {
    let (Some(token), Some(user)) = (token, user) else {
        return SessionLookup::Absent;
    };
    if token.is_empty() || user.is_empty() {
        return SessionLookup::Absent;
    }
    let Ok(record @ Value::Object(_)) = serde_json::from_str::<Value>(user) else {
        return SessionLookup::Malformed;
    };
    match serde_json::from_value::<SessionUser>(record) {
        Ok(user) => SessionLookup::Present(Session::new(token, user)),
        Err(_) => SessionLookup::Malformed,
    }
}

/// Known fields of the wrong JSON type read as missing rather than failing
/// the whole record.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
