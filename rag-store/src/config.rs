//! Store configuration resolved from the environment.

use ai_llm_service::error_handler::{env_non_empty, env_opt_bool};

use crate::errors::RagError;

pub const DEFAULT_TABLE: &str = "course_embeddings";
pub const DEFAULT_MATCH_FN: &str = "match_embeddings";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Which backend serves `match_embeddings` / `insert_chunk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgREST: `rpc/{match_fn}` + table inserts.
    Rpc,
    Qdrant,
}

impl StoreBackend {
    pub fn from_kind(kind: &str) -> Result<Self, RagError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "rpc" | "postgrest" | "supabase" => Ok(Self::Rpc),
            "qdrant" => Ok(Self::Qdrant),
            other => Err(RagError::Config(format!(
                "unsupported VECTOR_STORE_BACKEND: {other}"
            ))),
        }
    }
}

/// PostgREST connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// Base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Sent as both `apikey` and bearer token.
    pub key: String,
    pub table: String,
    pub match_fn: String,
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("table", &self.table)
            .field("match_fn", &self.match_fn)
            .finish()
    }
}

impl RpcConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            table: DEFAULT_TABLE.into(),
            match_fn: DEFAULT_MATCH_FN.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(RagError::Config(
                "VECTOR_STORE_URL must start with http:// or https://".into(),
            ));
        }
        if self.key.trim().is_empty() {
            return Err(RagError::Config("VECTOR_STORE_KEY is empty".into()));
        }
        if self.table.trim().is_empty() || self.match_fn.trim().is_empty() {
            return Err(RagError::Config("table and match function must be set".into()));
        }
        Ok(())
    }
}

/// Qdrant connection and collection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QdrantConfig {
    /// gRPC endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl QdrantConfig {
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            exact_search: false,
        }
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.url.trim().is_empty() {
            return Err(RagError::Config("QDRANT_URL is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("QDRANT_COLLECTION is empty".into()));
        }
        Ok(())
    }
}

/// Selected backend with its settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    Rpc(RpcConfig),
    Qdrant(QdrantConfig),
}

impl StoreConfig {
    /// Reads `VECTOR_STORE_*` / `QDRANT_*`.
    ///
    /// The RPC backend requires `VECTOR_STORE_URL` and `VECTOR_STORE_KEY`.
    pub fn from_env() -> Result<Self, RagError> {
        let backend = StoreBackend::from_kind(
            &env_non_empty("VECTOR_STORE_BACKEND").unwrap_or_else(|| "rpc".into()),
        )?;

        let cfg = match backend {
            StoreBackend::Rpc => {
                let url = required("VECTOR_STORE_URL")?;
                let key = required("VECTOR_STORE_KEY")?;
                let mut rpc = RpcConfig::new(url, key);
                if let Some(t) = env_non_empty("VECTOR_STORE_TABLE") {
                    rpc.table = t;
                }
                if let Some(f) = env_non_empty("VECTOR_STORE_MATCH_FN") {
                    rpc.match_fn = f;
                }
                Self::Rpc(rpc)
            }
            StoreBackend::Qdrant => {
                let mut q = QdrantConfig::new_default(
                    env_non_empty("QDRANT_URL").unwrap_or_else(|| DEFAULT_QDRANT_URL.into()),
                    env_non_empty("QDRANT_COLLECTION").unwrap_or_else(|| DEFAULT_TABLE.into()),
                );
                q.api_key = env_non_empty("QDRANT_API_KEY");
                q.exact_search = env_opt_bool("QDRANT_EXACT_SEARCH")
                    .map_err(|e| RagError::Config(e.to_string()))?
                    .unwrap_or(false);
                Self::Qdrant(q)
            }
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Rpc(_) => StoreBackend::Rpc,
            Self::Qdrant(_) => StoreBackend::Qdrant,
        }
    }

    pub fn validate(&self) -> Result<(), RagError> {
        match self {
            Self::Rpc(c) => c.validate(),
            Self::Qdrant(c) => c.validate(),
        }
    }
}

fn required(name: &'static str) -> Result<String, RagError> {
    env_non_empty(name)
        .ok_or_else(|| RagError::Config(format!("missing required environment variable: {name}")))
}
