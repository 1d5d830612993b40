//! Core card-related types: Card, Rank, Suit

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

/// Card ranks in Landlord order: 3 is lowest, the big joker highest.
///
/// Discriminants are the ordering values (Seven = 7, Ace = 14, Two = 15).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
    Two = 15,
    SmallJoker = 16,
    BigJoker = 17,
}

impl Rank {
    /// The thirteen suited ranks, lowest first.
    pub const SUITED: [Rank; 13] = [
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
        Rank::Two,
    ];

    /// Numeric ordering value (3..=17).
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_joker(self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }

    /// Ranks allowed inside straights, pair runs and airplanes (3..=A).
    pub const fn can_chain(self) -> bool {
        (self as u8) <= (Rank::Ace as u8)
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        let rank = match value {
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            14 => Rank::Ace,
            15 => Rank::Two,
            16 => Rank::SmallJoker,
            17 => Rank::BigJoker,
            _ => return None,
        };
        Some(rank)
    }
}

/// A single card. `suit` is `None` exactly for the two jokers.
///
/// The derived ordering is rank-major (then suit) and is what hands are
/// sorted by.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Option<Suit>,
}

impl Card {
    pub const SMALL_JOKER: Card = Card {
        rank: Rank::SmallJoker,
        suit: None,
    };
    pub const BIG_JOKER: Card = Card {
        rank: Rank::BigJoker,
        suit: None,
    };

    /// A suited card. Jokers use the associated constants instead.
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card {
            rank,
            suit: Some(suit),
        }
    }

    pub const fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }
}
