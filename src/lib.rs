pub mod api;
pub mod config;
pub mod dealer;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
pub mod payout;
pub mod redeem;
pub mod session;

pub use api::{router, ApiError, AppState};
pub use config::Config;
pub use deck::{Card, Deck, Rank, Suit};
pub use error::GameError;
pub use game::{HitResult, Phase, PlayerSession, RoundSnapshot, SessionSnapshot, SettleResult};
pub use hand::{hand_value, Hand};
pub use payout::{Outcome, Settlement};
pub use redeem::{RedeemCodes, RedeemError, Redemption};
pub use session::{PlayerId, SessionStore};
