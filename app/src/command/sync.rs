//! Interactive conversation with durable memory.

use ani_config::{Config, api_key_from_env};
use ani_conversation::{ContextBuilder, ConversationLoop};
use ani_core::ModelGateway;
use ani_memory::SqliteMessageStore;
use ani_providers::XaiProvider;
use std::path::PathBuf;
use tracing::info;

use super::{build_context_policy, build_request_policy};

/// Input parameters for the Sync command strategy.
#[derive(Debug, Clone)]
pub struct SyncInput {
    /// Config file override
    pub config: Option<PathBuf>,
}

/// Strategy for running the turn loop on stdin/stdout.
///
/// Startup failures (bad config, missing credential, unusable log) and
/// storage failures during the session are returned as errors, which ends
/// the process with a diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct SyncStrategy;

impl super::CommandStrategy for SyncStrategy {
    type Input = SyncInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load(input.config.as_deref())?;
        let api_key = api_key_from_env()?;

        info!("Database path: {}", config.database.path.display());
        let store = SqliteMessageStore::open(&config.database.path).await?;

        let provider = XaiProvider::new(api_key, build_request_policy(&config.model))?;
        info!("Using model {}", provider.model());

        let builder = ContextBuilder::new().with_policy(build_context_policy(&config.context));
        let mut conversation = ConversationLoop::new(provider, store).with_context_builder(builder);

        let stdin = std::io::stdin();
        conversation.run(stdin.lock(), std::io::stdout()).await?;

        Ok(())
    }
}
