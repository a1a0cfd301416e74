//! Arguments shared by several commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use vision_core::{LinkConfig, SceneState, UserId, Viewer};
use vision_runtime::{ConfigLoader, SceneLoader};

#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Scene fixture (RON)
    #[arg(short, long, value_name = "FILE")]
    pub scene: PathBuf,

    /// Link configuration (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// User the sync runs on behalf of
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub user: u32,

    /// Run as game master (owner of every character)
    #[arg(long)]
    pub gm: bool,
}

impl SceneArgs {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            id: UserId(self.user),
            is_gm: self.gm,
        }
    }

    pub fn load(&self) -> Result<(SceneState, LinkConfig)> {
        let scene = SceneLoader::load(&self.scene)?;
        let config = ConfigLoader::load_with_env(self.config.as_deref())?;
        Ok((scene, config))
    }
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per token
    #[default]
    Summary,
    /// Pretty-printed JSON
    Json,
}
