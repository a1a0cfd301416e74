use crate::config::LinkConfig;
use crate::state::{Character, CharacterCategory, OwnershipLevel, Viewer};

/// Why the reconciler declined to touch a character's tokens.
///
/// Not an error: a closed gate is a normal, silent outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateClosed {
    LinkingDisabled,
    TokenVisionDisabled,
    InsufficientPermission(OwnershipLevel),
    UnmanagedCategory(CharacterCategory),
}

impl GateClosed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkingDisabled => "linking_disabled",
            Self::TokenVisionDisabled => "token_vision_disabled",
            Self::InsufficientPermission(_) => "insufficient_permission",
            Self::UnmanagedCategory(_) => "unmanaged_category",
        }
    }
}

/// Checks every precondition for automatic sense linking.
pub fn check_gate(
    config: &LinkConfig,
    token_vision: bool,
    character: &Character,
    viewer: &Viewer,
) -> Result<(), GateClosed> {
    if !config.link_actor_senses {
        return Err(GateClosed::LinkingDisabled);
    }
    if !token_vision {
        return Err(GateClosed::TokenVisionDisabled);
    }
    let level = character.user_level(viewer);
    if level < OwnershipLevel::Observer {
        return Err(GateClosed::InsufficientPermission(level));
    }
    if !config.manages(character.category) {
        return Err(GateClosed::UnmanagedCategory(character.category));
    }
    Ok(())
}
