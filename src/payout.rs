use serde::Serialize;

use crate::hand::BLACKJACK;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PlayerBust,
    DealerBust,
    PlayerWins,
    Push,
    DealerWins,
}

impl Outcome {
    pub fn description(&self) -> &'static str {
        match self {
            Outcome::PlayerBust => "Player busts, you lose",
            Outcome::DealerBust => "Dealer busts, you win!",
            Outcome::PlayerWins => "You win!",
            Outcome::Push => "Push",
            Outcome::DealerWins => "Dealer wins",
        }
    }

    /// Gross return on `bet`, including the stake when it comes back.
    pub fn gross(&self, bet: u64) -> u64 {
        match self {
            Outcome::DealerBust | Outcome::PlayerWins => bet.saturating_mul(2),
            Outcome::Push => bet,
            Outcome::PlayerBust | Outcome::DealerWins => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: Outcome,
    /// Credited back to the balance.
    pub gross: u64,
    /// `gross - bet`: +bet on a win, 0 on a push, -bet on a loss.
    pub net: i64,
}

pub fn resolve(player_value: u32, dealer_value: u32, bet: u64) -> Settlement {
    let outcome = if player_value > BLACKJACK {
        Outcome::PlayerBust
    } else if dealer_value > BLACKJACK {
        Outcome::DealerBust
    } else if player_value > dealer_value {
        Outcome::PlayerWins
    } else if player_value == dealer_value {
        Outcome::Push
    } else {
        Outcome::DealerWins
    };
    let gross = outcome.gross(bet);
    Settlement {
        outcome,
        gross,
        net: signed(gross) - signed(bet),
    }
}

fn signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}
