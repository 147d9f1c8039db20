use thiserror::Error;

use crate::game::Phase;

/// Rejected game operations. A failed operation never mutates the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no active session, start the game first")]
    NoActiveSession,
    #[error("invalid bet {bet} (balance {balance})")]
    InvalidBet { bet: i64, balance: u64 },
    #[error("cannot {action} while {phase}")]
    InvalidState { action: &'static str, phase: Phase },
}
