use std::fmt;

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::{ser::SerializeTuple, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Base blackjack value, counting an Ace as 11.
    pub fn value(self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Suit {
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♠")]
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn value(&self) -> u32 {
        self.rank.value()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

// Cards go over the wire as `[rank, suit]`.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.rank)?;
        tuple.serialize_element(&self.suit)?;
        tuple.end()
    }
}

/// All 52 rank x suit combinations, unshuffled.
pub fn full_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
        .collect()
}

/// A single 52-card deck owned by one round.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: SmallRng,
}

impl Deck {
    pub fn shuffled() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    /// Deals `cards` front to back. Once they run out the deck rebuilds
    /// itself like any other deck.
    pub fn stacked(cards: Vec<Card>) -> Self {
        let mut cards = cards;
        cards.reverse();
        Deck {
            cards,
            rng: SmallRng::seed_from_u64(0),
        }
    }

    fn from_rng(rng: SmallRng) -> Self {
        let mut deck = Deck {
            cards: Vec::with_capacity(52),
            rng,
        };
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
    }

    pub fn draw(&mut self) -> Card {
        loop {
            if let Some(card) = self.cards.pop() {
                return card;
            }
            tracing::debug!("deck exhausted, reshuffling");
            self.shuffle();
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_deck_has_52_distinct_cards() {
        let cards = full_deck();
        assert_eq!(cards.len(), 52);
        let unique: HashSet<Card> = cards.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_shuffled_deck_draws_each_card_once() {
        let mut deck = Deck::with_seed(7);
        assert_eq!(deck.remaining(), 52);
        let mut seen = HashSet::new();
        for _ in 0..52 {
            assert!(seen.insert(deck.draw()));
        }
        assert_eq!(deck.remaining(), 0);
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_empty_deck_rebuilds_before_draw() {
        let mut deck = Deck::with_seed(11);
        for _ in 0..52 {
            deck.draw();
        }
        let _ = deck.draw();
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = Deck::with_seed(42);
        let mut b = Deck::with_seed(42);
        for _ in 0..52 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_stacked_deck_deals_in_order() {
        let mut deck = Deck::stacked(vec![
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Two, Suit::Hearts),
        ]);
        assert_eq!(deck.draw(), Card::new(Rank::King, Suit::Spades));
        assert_eq!(deck.draw(), Card::new(Rank::Two, Suit::Hearts));
        assert_eq!(deck.remaining(), 0);
        deck.draw();
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn test_card_serializes_as_pair() {
        let card = Card::new(Rank::Ten, Suit::Spades);
        assert_eq!(serde_json::to_string(&card).unwrap(), r#"["10","♠"]"#);
        assert_eq!(card.to_string(), "10♠");
    }
}
