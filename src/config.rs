//! Server configuration: defaults, then environment, then command-line flags.

use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

pub const ENV_HTTP_PORT: &str = "SILMEDY_HTTP_PORT";
pub const ENV_BIND_ADDR: &str = "SILMEDY_BIND_ADDR";
pub const ENV_DATA_FILE: &str = "SILMEDY_DATA_FILE";
pub const ENV_FCM_PROJECT_ID: &str = "SILMEDY_FCM_PROJECT_ID";
pub const ENV_FCM_ACCESS_TOKEN: &str = "SILMEDY_FCM_ACCESS_TOKEN";
pub const ENV_FCM_ENDPOINT: &str = "SILMEDY_FCM_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcmSettings {
    pub project_id: String,
    pub access_token: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind_addr: IpAddr,
    /// JSON seed file for the table and document stores.
    pub data_file: Option<PathBuf>,
    /// Push notifications are only logged when unset.
    pub fcm: Option<FcmSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            data_file: None,
            fcm: None,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Value following `flag` in `args`, if present.
pub fn parse_flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].as_str());
        }
        i += 1;
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

impl ServerConfig {
    /// Build from an environment lookup. Unparseable values fall back to defaults.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = ServerConfig::default();
        if let Some(port) = lookup(ENV_HTTP_PORT).and_then(|v| v.trim().parse::<u16>().ok()) {
            cfg.http_port = port;
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR).and_then(|v| v.trim().parse::<IpAddr>().ok()) {
            cfg.bind_addr = addr;
        }
        cfg.data_file = non_empty(lookup(ENV_DATA_FILE)).map(PathBuf::from);
        if let (Some(project_id), Some(access_token)) =
            (non_empty(lookup(ENV_FCM_PROJECT_ID)), non_empty(lookup(ENV_FCM_ACCESS_TOKEN)))
        {
            let endpoint = non_empty(lookup(ENV_FCM_ENDPOINT)).unwrap_or_else(|| DEFAULT_FCM_ENDPOINT.to_string());
            cfg.fcm = Some(FcmSettings { project_id, access_token, endpoint });
        }
        cfg
    }

    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Command-line flags override whatever the environment set.
    pub fn apply_args(mut self, args: &[String]) -> Self {
        if let Some(port) = parse_flag_value(args, "--http-port").and_then(|v| v.parse::<u16>().ok()) {
            self.http_port = port;
        }
        if let Some(addr) = parse_flag_value(args, "--bind").and_then(|v| v.parse::<IpAddr>().ok()) {
            self.bind_addr = addr;
        }
        if let Some(path) = parse_flag_value(args, "--data-file") {
            self.data_file = Some(PathBuf::from(path));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    fn args(s: &[&str]) -> Vec<String> { s.iter().map(|a| a.to_string()).collect() }

    #[test]
    fn defaults_without_environment() {
        let cfg = ServerConfig::from_env_with(env(&[]));
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.http_port, 8000);
    }

    #[test]
    fn environment_sets_values_and_ignores_garbage() {
        let cfg = ServerConfig::from_env_with(env(&[
            (ENV_HTTP_PORT, "9100"),
            (ENV_BIND_ADDR, "not-an-ip"),
            (ENV_DATA_FILE, "seed.json"),
        ]));
        assert_eq!(cfg.http_port, 9100);
        assert_eq!(cfg.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(cfg.data_file, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn fcm_requires_project_and_token() {
        let only_project = ServerConfig::from_env_with(env(&[(ENV_FCM_PROJECT_ID, "silmedy")]));
        assert!(only_project.fcm.is_none());

        let both = ServerConfig::from_env_with(env(&[(ENV_FCM_PROJECT_ID, "silmedy"), (ENV_FCM_ACCESS_TOKEN, "tok")]));
        let fcm = both.fcm.expect("fcm settings");
        assert_eq!(fcm.endpoint, DEFAULT_FCM_ENDPOINT);
    }

    #[test]
    fn args_override_environment() {
        let cfg = ServerConfig::from_env_with(env(&[(ENV_HTTP_PORT, "9100")]))
            .apply_args(&args(&["silmedy_server", "--http-port", "9200", "--bind", "127.0.0.1", "--data-file", "/tmp/s.json"]));
        assert_eq!(cfg.http_port, 9200);
        assert_eq!(cfg.bind_addr, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(cfg.data_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn flag_without_value_is_ignored() {
        let a = args(&["silmedy_server", "--http-port"]);
        assert_eq!(parse_flag_value(&a, "--http-port"), None);
        assert!(has_flag(&a, "--http-port"));
    }
}
