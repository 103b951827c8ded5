//! One-shot notifications carried to the next rendered page
//!
//! Messages are queued as a JSON list in a signed cookie and consumed by
//! the next page that renders them. A tampered or unreadable cookie is
//! treated as empty.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

fn read(jar: &SignedCookieJar, name: &str) -> Vec<FlashMessage> {
    jar.get(name)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Queue a message for the next rendered page
pub fn push(jar: SignedCookieJar, name: &str, message: FlashMessage) -> SignedCookieJar {
    let mut queued = read(&jar, name);
    queued.push(message);

    let value = match serde_json::to_string(&queued) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode flash messages");
            return jar;
        }
    };

    let cookie = Cookie::build((name.to_owned(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Take every queued message, clearing the cookie
pub fn take(jar: SignedCookieJar, name: &str) -> (SignedCookieJar, Vec<FlashMessage>) {
    let queued = read(&jar, name);
    if queued.is_empty() && jar.get(name).is_none() {
        return (jar, queued);
    }

    let jar = jar.remove(Cookie::build(name.to_owned()).path("/"));
    (jar, queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    const NAME: &str = "biobank_flash";

    fn key() -> Key {
        Key::derive_from(&[7u8; 64])
    }

    #[test]
    fn test_push_then_take() {
        let jar = SignedCookieJar::new(key());
        let jar = push(jar, NAME, FlashMessage::success("Donor added successfully!"));
        let jar = push(jar, NAME, FlashMessage::error("second"));

        let (jar, messages) = take(jar, NAME);
        assert_eq!(
            messages,
            vec![
                FlashMessage::success("Donor added successfully!"),
                FlashMessage::error("second"),
            ]
        );

        let (_, again) = take(jar, NAME);
        assert!(again.is_empty());
    }

    #[test]
    fn test_take_without_cookie() {
        let (_, messages) = take(SignedCookieJar::new(key()), NAME);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&FlashMessage::error("x")).unwrap();
        assert_eq!(json, r#"{"level":"error","message":"x"}"#);
    }
}
