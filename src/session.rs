use std::{collections::HashMap, fmt};

use uuid::Uuid;

use crate::{
    error::GameError,
    game::{PlayerSession, SessionSnapshot},
};

pub const DEFAULT_STARTING_BALANCE: u64 = 1000;

/// Opaque identity of one player, carried by the session cookie.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn generate() -> Self {
        PlayerId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId(value.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Player sessions for the lifetime of the process. Records are never
/// removed.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<PlayerId, PlayerSession>,
    starting_balance: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

impl SessionStore {
    pub fn new(starting_balance: u64) -> Self {
        SessionStore {
            sessions: HashMap::new(),
            starting_balance,
        }
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Get-or-create. `name` is only used when the record is new.
    pub fn resolve(&mut self, id: &PlayerId, name: &str) -> &mut PlayerSession {
        let starting_balance = self.starting_balance;
        self.sessions.entry(id.clone()).or_insert_with(|| {
            tracing::info!(player = %id, display_name = name, balance = starting_balance, "new player");
            PlayerSession::new(name, starting_balance)
        })
    }

    pub fn get(&self, id: &PlayerId) -> Result<&PlayerSession, GameError> {
        self.sessions.get(id).ok_or(GameError::NoActiveSession)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Result<&mut PlayerSession, GameError> {
        self.sessions.get_mut(id).ok_or(GameError::NoActiveSession)
    }

    pub fn snapshot(&self, id: &PlayerId) -> Result<SessionSnapshot, GameError> {
        self.get(id).map(PlayerSession::snapshot)
    }
}
