use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::StoreError;
use crate::reconcile::PerceptionPatch;

use super::types::{Character, CharacterId, StatusId, Token, TokenId};

/// Scene persistence as seen by the reconciler.
///
/// Reads return owned snapshots so an implementation backed by a database or
/// a host document model is free to assemble them on demand. Writes apply a
/// whole patch to one token at once.
pub trait TokenStore {
    /// Whether the scene uses token vision at all.
    fn token_vision(&self) -> bool;

    fn character(&self, id: CharacterId) -> Option<Character>;

    fn token(&self, id: TokenId) -> Option<Token>;

    /// Every token of the character currently placed in the scene.
    fn tokens_for(&self, character: CharacterId) -> Vec<Token>;

    /// Distinct characters that have at least one placed token.
    fn placed_characters(&self) -> Vec<CharacterId>;

    /// Applies `patch` to the token's persisted perception in a single write.
    fn write_token(&mut self, id: TokenId, patch: &PerceptionPatch) -> Result<(), StoreError>;
}

/// Serializable form of a scene, used for fixtures and saved scenes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SceneSnapshot {
    pub token_vision: bool,
    pub characters: Vec<Character>,
    pub tokens: Vec<Token>,
}

/// In-memory scene shared between synchronization and detection.
///
/// Tokens and characters sit behind `RefCell`s: detection probes mutate them
/// through a shared reference while the host's visibility test (which may
/// re-enter the detection registry) reads them. Borrows are never held across
/// a host call.
#[derive(Debug, Default)]
pub struct SceneState {
    token_vision: bool,
    characters: BTreeMap<CharacterId, RefCell<Character>>,
    tokens: BTreeMap<TokenId, RefCell<Token>>,
}

impl SceneState {
    pub fn new(token_vision: bool) -> Self {
        Self {
            token_vision,
            ..Self::default()
        }
    }

    pub fn set_token_vision(&mut self, enabled: bool) {
        self.token_vision = enabled;
    }

    pub fn insert_character(&mut self, character: Character) {
        self.characters
            .insert(character.id, RefCell::new(character));
    }

    pub fn insert_token(&mut self, token: Token) {
        self.tokens.insert(token.id, RefCell::new(token));
    }

    pub fn remove_token(&mut self, id: TokenId) -> Option<Token> {
        self.tokens.remove(&id).map(RefCell::into_inner)
    }

    /// Direct mutable access for host-side edits (sheet changes, effect toggles).
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id).map(RefCell::get_mut)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(&id).map(RefCell::get_mut)
    }

    pub fn borrow_token(&self, id: TokenId) -> Option<Ref<'_, Token>> {
        self.tokens.get(&id).map(RefCell::borrow)
    }

    pub fn borrow_character(&self, id: CharacterId) -> Option<Ref<'_, Character>> {
        self.characters.get(&id).map(RefCell::borrow)
    }

    /// Runs `f` against a token through a shared reference.
    pub(crate) fn update_token<R>(&self, id: TokenId, f: impl FnOnce(&mut Token) -> R) -> Option<R> {
        self.tokens.get(&id).map(|cell| f(&mut cell.borrow_mut()))
    }

    pub(crate) fn update_character<R>(
        &self,
        id: CharacterId,
        f: impl FnOnce(&mut Character) -> R,
    ) -> Option<R> {
        self.characters.get(&id).map(|cell| f(&mut cell.borrow_mut()))
    }

    /// Whether the token currently carries `status`.
    ///
    /// Tokens backed by a character report the character's active effects;
    /// unlinked tokens report their own transient markers.
    pub fn has_status(&self, token: TokenId, status: StatusId) -> bool {
        let Some(token) = self.borrow_token(token) else {
            return false;
        };
        match token
            .character
            .and_then(|character| self.borrow_character(character))
        {
            Some(character) => character.has_status(status),
            None => token.statuses.contains(&status),
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            token_vision: self.token_vision,
            characters: self
                .characters
                .values()
                .map(|cell| cell.borrow().clone())
                .collect(),
            tokens: self.tokens.values().map(|cell| cell.borrow().clone()).collect(),
        }
    }
}

impl From<SceneSnapshot> for SceneState {
    fn from(snapshot: SceneSnapshot) -> Self {
        let mut scene = SceneState::new(snapshot.token_vision);
        for character in snapshot.characters {
            scene.insert_character(character);
        }
        for token in snapshot.tokens {
            scene.insert_token(token);
        }
        scene
    }
}

impl TokenStore for SceneState {
    fn token_vision(&self) -> bool {
        self.token_vision
    }

    fn character(&self, id: CharacterId) -> Option<Character> {
        self.borrow_character(id).map(|character| character.clone())
    }

    fn token(&self, id: TokenId) -> Option<Token> {
        self.borrow_token(id).map(|token| token.clone())
    }

    fn tokens_for(&self, character: CharacterId) -> Vec<Token> {
        self.tokens
            .values()
            .map(RefCell::borrow)
            .filter(|token| token.character == Some(character))
            .map(|token| token.clone())
            .collect()
    }

    fn placed_characters(&self) -> Vec<CharacterId> {
        self.tokens
            .values()
            .filter_map(|cell| cell.borrow().character)
            .filter(|id| self.characters.contains_key(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn write_token(&mut self, id: TokenId, patch: &PerceptionPatch) -> Result<(), StoreError> {
        let token = self.token_mut(id).ok_or(StoreError::TokenMissing(id))?;
        patch.apply(token);
        Ok(())
    }
}
