use std::fmt;

use serde::Serialize;

use crate::{
    dealer::play_dealer,
    deck::{Card, Deck},
    error::GameError,
    hand::Hand,
    payout::{self, Outcome},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No round started yet.
    Waiting,
    /// Cards are out and the player is acting.
    Playing,
    /// Player went over 21; only settlement is left.
    Bust,
    /// Player stopped drawing; the dealer plays next.
    Stand,
    /// Dealer resolved and the payout applied.
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Playing => "playing",
            Phase::Bust => "bust",
            Phase::Stand => "stand",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hand of blackjack. Owns its deck so rounds of different players never
/// share cards.
#[derive(Debug)]
pub struct Round {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    bet: u64,
}

impl Round {
    fn deal(mut deck: Deck, bet: u64) -> Self {
        let mut player = Hand::new();
        let mut dealer = Hand::new();
        for _ in 0..2 {
            player.push(deck.draw());
            dealer.push(deck.draw());
        }
        Round {
            deck,
            player,
            dealer,
            bet,
        }
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Only the dealer's first card is shown while the round is open.
    pub fn dealer_visible(&self) -> Vec<Card> {
        self.dealer.first().into_iter().collect()
    }
}

#[derive(Debug, Serialize)]
pub struct RoundSnapshot {
    pub player_hand: Hand,
    pub dealer_visible: Vec<Card>,
    pub player_value: u32,
    pub balance: u64,
    pub bet: u64,
}

#[derive(Debug, Serialize)]
pub struct HitResult {
    pub player_hand: Hand,
    pub player_value: u32,
    pub done: bool,
    pub bust: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SettleResult {
    pub player_hand: Hand,
    pub dealer_hand: Hand,
    pub player_value: u32,
    pub dealer_value: u32,
    pub outcome: Outcome,
    pub result: &'static str,
    pub balance: u64,
    /// Net of the original bet.
    pub winnings: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub name: String,
    pub balance: u64,
    pub bet: u64,
    pub phase: Phase,
    pub player_hand: Hand,
    pub player_value: u32,
    pub dealer_visible: Vec<Card>,
}

/// Everything the server keeps about one player.
#[derive(Debug)]
pub struct PlayerSession {
    name: String,
    balance: u64,
    phase: Phase,
    round: Option<Round>,
}

impl PlayerSession {
    pub fn new(name: impl Into<String>, balance: u64) -> Self {
        PlayerSession {
            name: name.into(),
            balance,
            phase: Phase::Waiting,
            round: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Current stake, 0 when no round is open.
    pub fn bet(&self) -> u64 {
        self.round.as_ref().map_or(0, Round::bet)
    }

    pub fn credit(&mut self, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }

    pub fn start_round(&mut self, bet: i64) -> Result<RoundSnapshot, GameError> {
        self.start_round_with_deck(bet, Deck::shuffled())
    }

    /// Like [`start_round`](Self::start_round) but deals from `deck`.
    pub fn start_round_with_deck(
        &mut self,
        bet: i64,
        deck: Deck,
    ) -> Result<RoundSnapshot, GameError> {
        let stake = u64::try_from(bet)
            .ok()
            .filter(|stake| (1..=self.balance).contains(stake))
            .ok_or(GameError::InvalidBet {
                bet,
                balance: self.balance,
            })?;

        if let Some(abandoned) = &self.round {
            tracing::warn!(
                player = %self.name,
                phase = %self.phase,
                forfeited = abandoned.bet,
                "new round replaces an unsettled one"
            );
        }

        self.balance -= stake;
        let round = Round::deal(deck, stake);
        let snapshot = RoundSnapshot {
            player_hand: round.player.clone(),
            dealer_visible: round.dealer_visible(),
            player_value: round.player.value(),
            balance: self.balance,
            bet: stake,
        };
        self.round = Some(round);
        self.phase = Phase::Playing;

        tracing::info!(
            player = %self.name,
            bet = stake,
            balance = self.balance,
            player_value = snapshot.player_value,
            "round started"
        );
        Ok(snapshot)
    }

    pub fn hit(&mut self) -> Result<HitResult, GameError> {
        let invalid = GameError::InvalidState {
            action: "hit",
            phase: self.phase,
        };
        if self.phase != Phase::Playing {
            return Err(invalid);
        }
        let Some(round) = self.round.as_mut() else {
            return Err(invalid);
        };

        let card = round.deck.draw();
        round.player.push(card);
        let value = round.player.value();
        let bust = round.player.is_bust();
        if bust {
            self.phase = Phase::Bust;
        }

        tracing::debug!(player = %self.name, %card, value, bust, "player hits");
        Ok(HitResult {
            player_hand: round.player.clone(),
            player_value: value,
            done: bust,
            bust,
            message: bust.then_some("Busted!"),
        })
    }

    pub fn stand(&mut self) -> Result<SettleResult, GameError> {
        let mut round = match (self.phase, self.round.take()) {
            (Phase::Playing | Phase::Bust, Some(round)) => round,
            (phase, round) => {
                self.round = round;
                return Err(GameError::InvalidState {
                    action: "stand",
                    phase,
                });
            }
        };

        if self.phase == Phase::Playing {
            self.phase = Phase::Stand;
            play_dealer(&mut round.dealer, &mut round.deck);
        }

        let player_value = round.player.value();
        let dealer_value = round.dealer.value();
        let settlement = payout::resolve(player_value, dealer_value, round.bet);
        self.balance = self.balance.saturating_add(settlement.gross);
        self.phase = Phase::Finished;

        tracing::info!(
            player = %self.name,
            bet = round.bet,
            player_value,
            dealer_value,
            outcome = ?settlement.outcome,
            net = settlement.net,
            balance = self.balance,
            "round settled"
        );
        Ok(SettleResult {
            player_hand: round.player,
            dealer_hand: round.dealer,
            player_value,
            dealer_value,
            outcome: settlement.outcome,
            result: settlement.outcome.description(),
            balance: self.balance,
            winnings: settlement.net,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (player_hand, dealer_visible) = match &self.round {
            Some(round) => (round.player.clone(), round.dealer_visible()),
            None => (Hand::new(), Vec::new()),
        };
        SessionSnapshot {
            name: self.name.clone(),
            balance: self.balance,
            bet: self.bet(),
            phase: self.phase,
            player_value: player_hand.value(),
            player_hand,
            dealer_visible,
        }
    }
}
