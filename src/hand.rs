use serde::Serialize;

use crate::deck::Card;

pub const BLACKJACK: u32 = 21;

/// Best blackjack total for `cards`: Aces start at 11 and drop to 1, one at
/// a time, only while the total is over 21.
pub fn hand_value(cards: &[Card]) -> u32 {
    let (total, _) = evaluate(cards);
    total
}

/// True when at least one Ace still counts as 11.
pub fn is_soft(cards: &[Card]) -> bool {
    let (_, soft_aces) = evaluate(cards);
    soft_aces > 0
}

fn evaluate(cards: &[Card]) -> (u32, u32) {
    let mut total = 0;
    let mut aces = 0;

    for card in cards {
        total += card.value();
        if card.is_ace() {
            aces += 1;
        }
    }

    while total > BLACKJACK && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total, aces)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn first(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        self.value() > BLACKJACK
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand { cards }
    }
}
