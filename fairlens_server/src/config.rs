use anyhow::Context;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_MAX_GAMES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound on `num_games` for one crash request.
    pub max_games: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_games: DEFAULT_MAX_GAMES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let max_games = match lookup("MAX_GAMES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_GAMES must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_MAX_GAMES,
        };
        if max_games == 0 {
            anyhow::bail!("MAX_GAMES must be at least 1");
        }
        Ok(Self { bind, max_games })
    }
}
