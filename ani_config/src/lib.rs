mod schema;

pub use schema::{
    API_KEY_ENV, Config, ContextConfig, DatabaseConfig, ModelConfig, api_key_from_env,
};
