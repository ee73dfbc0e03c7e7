use ani_config::Config;
use std::path::PathBuf;

/// Strategy for initializing the configuration.
///
/// Writes the template to the given path, or to `~/ani/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let path = match input {
            Some(path) => path,
            None => Config::default_path()?,
        };
        Config::create_config(&path)
    }
}
