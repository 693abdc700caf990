use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub openai: OpenAiConfig,
    pub pdf_dir: String,
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Read configuration from the environment. Only `OPENAI_API_KEY`
    /// is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        let embedding_dimensions = env_or("EMBEDDING_DIMENSIONS", "1536")
            .parse()
            .context("EMBEDDING_DIMENSIONS must be a number")?;

        Ok(Self {
            neo4j: Neo4jConfig {
                url: env_or("NEO4J_URL", "bolt://localhost:7687"),
                user: env_or("NEO4J_USER", "neo4j"),
                password: env_or("NEO4J_PASSWORD", "password"),
                database: env_or("NEO4J_DATABASE", "neo4j"),
            },
            openai: OpenAiConfig {
                api_key,
                base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                chat_model: env_or("CHAT_MODEL", "gpt-4o-mini"),
                embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                embedding_dimensions,
            },
            pdf_dir: env_or("PDF_DIR", "truncated-pdfs"),
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8005"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-global, so the missing-key case
    // and the defaults case run inside one test.
    #[test]
    fn api_key_is_required_and_defaults_apply() {
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
        assert!(Config::from_env().is_err());

        unsafe {
            std::env::set_var("OPENAI_API_KEY", "test-key");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.neo4j.url, "bolt://localhost:7687");
        assert_eq!(config.neo4j.database, "neo4j");
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(config.openai.embedding_dimensions, 1536);
        assert_eq!(config.pdf_dir, "truncated-pdfs");
        assert_eq!(config.bind_addr, "0.0.0.0:8005");

        unsafe {
            std::env::set_var("NEO4J_DATABASE", "supplychain");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.neo4j.database, "supplychain");

        unsafe {
            std::env::remove_var("NEO4J_DATABASE");
            std::env::remove_var("OPENAI_API_KEY");
        }
    }
}
