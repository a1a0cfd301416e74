//! Dry run: compute each token's patch without writing anything.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use vision_core::{
    CapabilitySet, PerceptionPatch, TargetPerception, TokenId, TokenStore, VisionModeRegistry,
    check_gate, reconcile_token,
};

use crate::args::{OutputFormat, SceneArgs};

/// Show the patches each token would receive
#[derive(Parser, Debug)]
pub struct Plan {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct PlannedToken {
    token: TokenId,
    label: String,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome {
    Patch { patch: PerceptionPatch },
    UpToDate,
    Gated { reason: &'static str },
    Failed { error: String },
}

impl Plan {
    pub fn execute(self) -> Result<()> {
        let (scene, config) = self.scene.load()?;
        let viewer = self.scene.viewer();
        let vision_modes = VisionModeRegistry::standard();

        let mut planned = Vec::new();
        for id in scene.placed_characters() {
            let Some(character) = scene.character(id) else {
                continue;
            };
            let tokens = scene.tokens_for(id);
            let label = character.describe();

            if let Err(gate) = check_gate(&config, scene.token_vision(), &character, &viewer) {
                planned.extend(tokens.iter().map(|token| PlannedToken {
                    token: token.id,
                    label: token.describe(),
                    outcome: Outcome::Gated {
                        reason: gate.as_str(),
                    },
                }));
                continue;
            }

            let capabilities = CapabilitySet::resolve(&character, &config);
            for token in tokens.into_iter().filter(|token| token.sight.enabled) {
                let outcome =
                    match TargetPerception::build(&capabilities, &vision_modes, &token.describe(), &label) {
                        Ok(target) => match reconcile_token(&target, &token) {
                            Some(patch) => Outcome::Patch { patch },
                            None => Outcome::UpToDate,
                        },
                        Err(err) => Outcome::Failed {
                            error: err.to_string(),
                        },
                    };
                planned.push(PlannedToken {
                    token: token.id,
                    label: token.describe(),
                    outcome,
                });
            }
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&planned)?),
            OutputFormat::Summary => {
                for entry in &planned {
                    match &entry.outcome {
                        Outcome::Patch { patch } => {
                            println!("{}: patch {:?}", entry.label, patch.fields())
                        }
                        Outcome::UpToDate => println!("{}: up to date", entry.label),
                        Outcome::Gated { reason } => println!("{}: skipped ({reason})", entry.label),
                        Outcome::Failed { error } => println!("{}: failed: {error}", entry.label),
                    }
                }
            }
        }
        Ok(())
    }
}
