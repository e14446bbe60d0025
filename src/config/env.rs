//! Environment snapshot and resolver.
//!
//! # Security
//! - Values are never logged; `Debug` prints variable names only
//! - The private key is handed to the wallet and not retained elsewhere

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::config::network::Chain;
use crate::error::{FunctionsError, FunctionsResult};

/// Environment variable name for the signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// Environment variable name for the GitHub token used to publish gists.
pub const GITHUB_API_TOKEN_ENV_VAR: &str = "GITHUB_API_TOKEN";

/// Immutable key/value snapshot of the process configuration.
#[derive(Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Load the dotenv file (if any) and overlay the process environment.
    ///
    /// A missing dotenv file is not an error; a malformed one is.
    pub fn load(env_file: Option<&Path>) -> FunctionsResult<Self> {
        Self::load_with(env_file, std::env::vars_os())
    }

    /// Load the dotenv file (if any) and overlay `process` on top of it.
    ///
    /// Entries of `process` whose name or value is not UTF-8 are skipped.
    pub fn load_with<I>(env_file: Option<&Path>, process: I) -> FunctionsResult<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut vars = BTreeMap::new();

        if let Some(path) = env_file.filter(|p| p.exists()) {
            let invalid = |e: dotenvy::Error| FunctionsError::InvalidConfiguration {
                variable: path.display().to_string(),
                reason: e.to_string(),
            };
            for entry in dotenvy::from_path_iter(path).map_err(invalid)? {
                let (key, value) = entry.map_err(invalid)?;
                vars.insert(key, value);
            }
            tracing::debug!(path = %path.display(), entries = vars.len(), "Loaded env file");
        }

        // Process environment wins over the file.
        for (key, value) in process {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (Ok(key), Err(_)) => {
                    tracing::warn!(variable = %key, "Skipping environment variable with non-UTF-8 value");
                }
                (Err(key), _) => {
                    tracing::warn!(variable = ?key, "Skipping environment variable with non-UTF-8 name");
                }
            }
        }

        Ok(Self { vars })
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable; empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Look up a variable or fail with `MissingConfiguration`.
    pub fn require(&self, name: &str) -> FunctionsResult<&str> {
        self.get(name)
            .ok_or_else(|| FunctionsError::MissingConfiguration {
                variable: name.to_string(),
            })
    }

    /// RPC URL of the given chain.
    pub fn provider_rpc_url(&self, chain: Chain) -> FunctionsResult<&str> {
        self.require(chain.config().rpc_url_var)
    }

    /// Hex-encoded signing key.
    pub fn private_key(&self) -> FunctionsResult<&str> {
        self.require(PRIVATE_KEY_ENV_VAR)
    }

    /// GitHub API token for gist publishing.
    pub fn github_api_token(&self) -> FunctionsResult<&str> {
        self.require(GITHUB_API_TOKEN_ENV_VAR)
    }

    /// Value of a secret key named on the command line.
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("variables", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_provider_rpc_url() {
        let env = Environment::from_vars([("POLYGON_MUMBAI_RPC_URL", "https://rpc.example")]);
        assert_eq!(
            env.provider_rpc_url(Chain::PolygonMumbai).unwrap(),
            "https://rpc.example"
        );

        let err = env.provider_rpc_url(Chain::EthereumSepolia).unwrap_err();
        assert!(matches!(
            err,
            FunctionsError::MissingConfiguration { ref variable } if variable == "ETHEREUM_SEPOLIA_RPC_URL"
        ));
    }

    #[test]
    fn test_empty_value_is_missing() {
        let env = Environment::from_vars([(PRIVATE_KEY_ENV_VAR, "")]);
        let err = env.private_key().unwrap_err();
        assert!(err.to_string().contains("PRIVATE_KEY not provided"));
    }

    #[test]
    fn test_github_token() {
        let env = Environment::from_vars([(GITHUB_API_TOKEN_ENV_VAR, "ghp_token")]);
        assert_eq!(env.github_api_token().unwrap(), "ghp_token");
        assert!(Environment::default().github_api_token().is_err());
    }

    #[test]
    fn test_debug_hides_values() {
        let env = Environment::from_vars([(PRIVATE_KEY_ENV_VAR, "deadbeef")]);
        let printed = format!("{:?}", env);
        assert!(printed.contains("PRIVATE_KEY"));
        assert!(!printed.contains("deadbeef"));
    }

    #[test]
    fn test_load_without_file() {
        let env = Environment::load(Some(Path::new("/nonexistent/functions.env"))).unwrap();
        assert!(env.get("FUNCTIONS_CLI_SURELY_UNSET_VARIABLE").is_none());
    }

    fn os_vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn test_process_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SECRET1=from-file").unwrap();
        writeln!(file, "PRIVATE_KEY=file-key").unwrap();

        let env = Environment::load_with(
            Some(file.path()),
            os_vars(&[("PRIVATE_KEY", "process-key")]),
        )
        .unwrap();

        assert_eq!(env.secret("SECRET1"), Some("from-file"));
        assert_eq!(env.private_key().unwrap(), "process-key");
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SECRET1=ok").unwrap();
        writeln!(file, "this line has no assignment").unwrap();

        let err = Environment::load_with(Some(file.path()), Vec::new()).unwrap_err();
        assert!(matches!(err, FunctionsError::InvalidConfiguration { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_process_entries_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let process = vec![
            (OsString::from("BAD_VALUE"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![0xff]), OsString::from("x")),
            (OsString::from("GOOD"), OsString::from("yes")),
        ];

        let env = Environment::load_with(None, process).unwrap();
        assert_eq!(env.get("GOOD"), Some("yes"));
        assert!(env.get("BAD_VALUE").is_none());
    }
}
