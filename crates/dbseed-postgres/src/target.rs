use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

use crate::error::PgStoreError;

const DEFAULT_PORT: u16 = 5432;

/// Where to connect: either a full URL or individual fields.
///
/// Fields override the matching parts of the URL when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgTarget {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl PgTarget {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.host.is_none() && self.database.is_none()
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, PgStoreError> {
        let mut options = match self.url.as_deref() {
            Some(url) => url
                .parse::<PgConnectOptions>()
                .map_err(|err| PgStoreError::Target(format!("invalid url: {err}")))?,
            None => {
                if self.host.is_none() {
                    return Err(PgStoreError::Target(
                        "either url or host must be set".to_string(),
                    ));
                }
                PgConnectOptions::new_without_pgpass().port(DEFAULT_PORT)
            }
        };

        if let Some(host) = self.host.as_deref() {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(database) = self.database.as_deref() {
            options = options.database(database);
        }
        if let Some(username) = self.username.as_deref() {
            options = options.username(username);
        }
        if let Some(password) = self.password.as_deref() {
            options = options.password(password);
        }
        Ok(options)
    }

    /// Printable description with the password masked.
    pub fn redacted(&self) -> String {
        if let Some(url) = self.url.as_deref()
            && self.host.is_none()
        {
            return redact_url(url);
        }

        let user = self.username.as_deref().unwrap_or("postgres");
        let auth = if self.password.is_some() {
            format!("{user}:***")
        } else {
            user.to_string()
        };
        format!(
            "postgres://{auth}@{}:{}/{}",
            self.host.as_deref().unwrap_or("localhost"),
            self.port.unwrap_or(DEFAULT_PORT),
            self.database.as_deref().unwrap_or("postgres")
        )
    }
}

/// Mask the password in a connection URL, both the `user:pass@` part and
/// credential query parameters such as `?password=`.
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let authority_start = scheme_end + 3;
    let rest = &url[authority_start..];
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());

    let mut redacted = url.to_string();
    if let Some(at_idx) = rest[..authority_end].rfind('@')
        && let Some(colon_idx) = rest[..at_idx].find(':')
    {
        redacted.replace_range(
            authority_start + colon_idx + 1..authority_start + at_idx,
            "***",
        );
    }
    redact_query_params(&redacted)
}

fn redact_query_params(url: &str) -> String {
    let Some(query_start) = url.find('?') else {
        return url.to_string();
    };
    let (base, query) = url.split_at(query_start + 1);

    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_credential_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect();
    format!("{base}{}", params.join("&"))
}

fn is_credential_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "sslpassword" | "pass"
    )
}
