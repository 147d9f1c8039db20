use crate::{deck::Deck, hand::Hand};

/// The dealer stops drawing once the hand reaches this value, soft or hard.
pub const DEALER_STANDS_ON: u32 = 17;

/// Draws into `hand` until it is worth at least 17. Never looks at the
/// player's cards.
pub fn play_dealer(hand: &mut Hand, deck: &mut Deck) {
    while hand.value() < DEALER_STANDS_ON {
        hand.push(deck.draw());
    }
}
