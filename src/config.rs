//! Per-page portal configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages embed the session glue at different directory depths, so every
//! navigation target is relative and prefixed with one `../` per level.
//! Headless hosts can load the same settings from `STOREFRONT_*` variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::session::store::{REMEMBER_ADMIN_EMAIL_KEY, REMEMBER_EMAIL_KEY};

pub const DEFAULT_HOME_PAGE: &str = "index.html";
pub const DEFAULT_LOGIN_PAGE: &str = "login.html";
pub const DEFAULT_REGISTER_PAGE: &str = "register.html";
pub const DEFAULT_ADMIN_LOGIN_PAGE: &str = "admin/login.html";
pub const DEFAULT_LOGIN_ENDPOINT: &str = "/auth/login";
pub const DEFAULT_ADMIN_LOGIN_ENDPOINT: &str = "/auth/admin/login";

/// Which portal a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalKind {
    Customer,
    Admin,
}

impl PortalKind {
    /// Storage key for this portal's "remember me" email.
    pub fn remember_email_key(self) -> &'static str {
        match self {
            Self::Customer => REMEMBER_EMAIL_KEY,
            Self::Admin => REMEMBER_ADMIN_EMAIL_KEY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Prefix for relative API paths; empty means same origin.
    pub api_base_url: String,
    /// Directory depth of the embedding page below the site root.
    pub page_depth: u32,
    pub home_page: String,
    pub login_page: String,
    pub register_page: String,
    pub admin_login_page: String,
    pub login_endpoint: String,
    pub admin_login_endpoint: String,
    /// `None` waits for the server indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            page_depth: 0,
            home_page: DEFAULT_HOME_PAGE.to_owned(),
            login_page: DEFAULT_LOGIN_PAGE.to_owned(),
            register_page: DEFAULT_REGISTER_PAGE.to_owned(),
            admin_login_page: DEFAULT_ADMIN_LOGIN_PAGE.to_owned(),
            login_endpoint: DEFAULT_LOGIN_ENDPOINT.to_owned(),
            admin_login_endpoint: DEFAULT_ADMIN_LOGIN_ENDPOINT.to_owned(),
            request_timeout: None,
        }
    }
}

impl PortalConfig {
    /// Defaults for a page `depth` directories below the site root.
    #[must_use]
    pub fn for_depth(depth: u32) -> Self {
        Self { page_depth: depth, ..Self::default() }
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STOREFRONT_API_BASE_URL`: default same origin
    /// - `STOREFRONT_PAGE_DEPTH`: default 0
    /// - `STOREFRONT_HOME_PAGE`, `STOREFRONT_LOGIN_PAGE`,
    ///   `STOREFRONT_REGISTER_PAGE`, `STOREFRONT_ADMIN_LOGIN_PAGE`
    /// - `STOREFRONT_LOGIN_ENDPOINT`, `STOREFRONT_ADMIN_LOGIN_ENDPOINT`
    /// - `STOREFRONT_REQUEST_TIMEOUT_SECS`: default none
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let request_timeout =
            env_parse::<u64>("STOREFRONT_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            api_base_url: env_string("STOREFRONT_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.api_base_url),
            page_depth: env_parse("STOREFRONT_PAGE_DEPTH")?.unwrap_or(defaults.page_depth),
            home_page: env_string("STOREFRONT_HOME_PAGE").unwrap_or(defaults.home_page),
            login_page: env_string("STOREFRONT_LOGIN_PAGE").unwrap_or(defaults.login_page),
            register_page: env_string("STOREFRONT_REGISTER_PAGE").unwrap_or(defaults.register_page),
            admin_login_page: env_string("STOREFRONT_ADMIN_LOGIN_PAGE").unwrap_or(defaults.admin_login_page),
            login_endpoint: env_string("STOREFRONT_LOGIN_ENDPOINT").unwrap_or(defaults.login_endpoint),
            admin_login_endpoint: env_string("STOREFRONT_ADMIN_LOGIN_ENDPOINT")
                .unwrap_or(defaults.admin_login_endpoint),
            request_timeout,
        })
    }

    /// `../` repeated once per directory level.
    pub fn page_prefix(&self) -> String {
        "../".repeat(self.page_depth as usize)
    }

    pub fn home_url(&self) -> String {
        self.page_url(&self.home_page)
    }

    pub fn login_url(&self) -> String {
        self.page_url(&self.login_page)
    }

    pub fn register_url(&self) -> String {
        self.page_url(&self.register_page)
    }

    pub fn admin_login_url(&self) -> String {
        self.page_url(&self.admin_login_page)
    }

    pub fn login_url_for(&self, kind: PortalKind) -> String {
        match kind {
            PortalKind::Customer => self.login_url(),
            PortalKind::Admin => self.admin_login_url(),
        }
    }

    pub fn login_endpoint_for(&self, kind: PortalKind) -> &str {
        match kind {
            PortalKind::Customer => &self.login_endpoint,
            PortalKind::Admin => &self.admin_login_endpoint,
        }
    }

    /// Login and registration pages must never be gated, or a missing
    /// session would redirect in a loop.
    pub fn is_public_page(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        [&self.login_page, &self.register_page, &self.admin_login_page]
            .into_iter()
            .any(|page| {
                let page = page.trim_start_matches('/');
                path == page
                    || path
                        .strip_suffix(page)
                        .is_some_and(|prefix| prefix.ends_with('/'))
            })
    }

    /// Resolve an API path against `api_base_url`. Absolute URLs pass through.
    pub fn api_url(&self, path: &str) -> String {
        let path = path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = self.api_base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            path.to_owned()
        } else {
            format!("{base}/{}", path.trim_start_matches('/'))
        }
    }

    fn page_url(&self, page: &str) -> String {
        format!("{}{}", self.page_prefix(), page.trim_start_matches('/'))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid { var: key, value: raw })
}
