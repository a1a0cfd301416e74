pub mod character;
pub mod common;
pub mod status;
pub mod token;

pub use character::{Character, CharacterCategory, OwnershipLevel, SenseValue, Viewer};
pub use common::{CharacterId, EffectId, Point, TokenId, UserId};
pub use status::{SenseEffect, StatusEffect, StatusId};
pub use token::{DetectionModeEntry, DetectionModeId, SightConfig, Token};
