//! Cookie-backed [`RememberStore`]: reads the request's `Cookie` header and
//! collects `Set-Cookie` changes for the response.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use tracing::warn;

use holdbook_auth::RememberStore;

pub struct CookieRememberStore {
    incoming: HashMap<String, String>,
    outgoing: Vec<Cookie<'static>>,
    now: DateTime<Utc>,
}

impl CookieRememberStore {
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        let incoming = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(Result::ok)
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        Self {
            incoming,
            outgoing: Vec::new(),
            now,
        }
    }

    /// Attach the collected `Set-Cookie` headers to `response`.
    pub fn apply(self, mut response: Response) -> Response {
        for cookie in self.outgoing {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(err) => warn!(cookie = cookie.name(), error = %err, "dropping unencodable cookie"),
            }
        }
        response
    }

    fn push(&mut self, cookie: Cookie<'static>) {
        self.outgoing.retain(|c| c.name() != cookie.name());
        self.outgoing.push(cookie);
    }
}

impl RememberStore for CookieRememberStore {
    fn get(&self, key: &str) -> Option<String> {
        self.incoming.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String, expires_at: DateTime<Utc>) {
        let max_age = (expires_at - self.now).num_seconds().max(0);
        let cookie = Cookie::build((key.to_string(), value.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build();
        self.incoming.insert(key.to_string(), value);
        self.push(cookie);
    }

    fn delete(&mut self, key: &str) {
        if self.incoming.remove(key).is_none() && !self.outgoing.iter().any(|c| c.name() == key) {
            return;
        }
        let mut cookie = Cookie::build((key.to_string(), String::new()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        self.push(cookie);
    }
}
