use std::env;

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_BASE_URL: &str = "http://localhost:5984";
const DEFAULT_DATABASE: &str = "shuttle_court";

/// Where the CouchDB tournament database lives and how to authenticate.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding every tournament document.
    pub database: String,
    /// Basic-auth user, set together with `password`.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

impl CouchConfig {
    /// Read `COUCH_BASE_URL` and `COUCH_DB` (both defaulted) plus the optional
    /// `COUCH_USERNAME` / `COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|key| env::var(key).ok().filter(|value| !value.is_empty()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let (username, password) = match (lookup("COUCH_USERNAME"), lookup("COUCH_PASSWORD")) {
            (Some(username), Some(password)) => (Some(username), Some(password)),
            (None, None) => (None, None),
            _ => return Err(CouchDaoError::IncompleteCredentials),
        };
        Ok(Self {
            base_url: lookup("COUCH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            database: lookup("COUCH_DB").unwrap_or_else(|| DEFAULT_DATABASE.into()),
            username,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> CouchResult<CouchConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CouchConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_instance() {
        let config = config(&[]).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.database, "shuttle_court");
        assert!(config.username.is_none());
    }

    #[test]
    fn half_a_credential_pair_is_rejected() {
        assert!(matches!(
            config(&[("COUCH_USERNAME", "admin")]),
            Err(CouchDaoError::IncompleteCredentials)
        ));
        let config = config(&[("COUCH_USERNAME", "admin"), ("COUCH_PASSWORD", "pw")]).unwrap();
        assert_eq!(config.password.as_deref(), Some("pw"));
    }
}
