//! List registered vision and detection modes.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use vision_core::{
    DetectionFilter, DetectionModeId, DetectionRegistry, DetectionType, VisionModeDefinition,
    VisionModeRegistry,
};

use crate::args::OutputFormat;

/// List the registered vision and detection modes
#[derive(Parser, Debug)]
pub struct Modes {
    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct DetectionModeInfo {
    id: DetectionModeId,
    label: &'static str,
    detection_type: DetectionType,
    filter: Option<DetectionFilter>,
}

#[derive(Debug, Serialize)]
struct ModeListing<'a> {
    vision: Vec<&'a VisionModeDefinition>,
    detection: Vec<DetectionModeInfo>,
}

impl Modes {
    pub fn execute(self) -> Result<()> {
        let vision_modes = VisionModeRegistry::standard();
        let detection_modes = DetectionRegistry::standard();

        let mut detection: Vec<DetectionModeInfo> = detection_modes
            .iter()
            .map(|mode| DetectionModeInfo {
                id: mode.id(),
                label: mode.label(),
                detection_type: mode.detection_type(),
                filter: mode.display_filter().copied(),
            })
            .collect();
        detection.sort_by(|a, b| a.id.cmp(&b.id));

        let listing = ModeListing {
            vision: vision_modes.iter().collect(),
            detection,
        };

        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(());
        }

        println!("Vision modes:");
        for mode in &listing.vision {
            println!("  {:<20} {}", mode.id, mode.label);
        }
        println!("Detection modes:");
        for mode in &listing.detection {
            println!("  {:<20} {:<18} {}", mode.id, mode.label, mode.detection_type);
        }
        Ok(())
    }
}
