//! Card parsing from string tokens (e.g., "7S", "TD", "SJ", "BJ")

use std::fmt;
use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

fn parse_error(s: &str) -> DomainError {
    DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SJ" => return Ok(Card::SMALL_JOKER),
            "BJ" => return Ok(Card::BIG_JOKER),
            _ => {}
        }
        if s.len() != 2 {
            return Err(parse_error(s));
        }
        let mut chars = s.chars();
        let rank_ch = chars.next().ok_or_else(|| parse_error(s))?;
        let suit_ch = chars.next().ok_or_else(|| parse_error(s))?;
        let rank = match rank_ch {
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            '2' => Rank::Two,
            _ => return Err(parse_error(s)),
        };
        let suit = match suit_ch {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            _ => return Err(parse_error(s)),
        };
        Ok(Card::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank_ch = match self.rank {
            Rank::SmallJoker => return f.write_str("SJ"),
            Rank::BigJoker => return f.write_str("BJ"),
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
            Rank::Two => '2',
        };
        let suit_ch = match self.suit {
            Some(Suit::Clubs) => 'C',
            Some(Suit::Diamonds) => 'D',
            Some(Suit::Hearts) => 'H',
            Some(Suit::Spades) => 'S',
            // A suited rank without a suit has no token; render something inspectable.
            None => '?',
        };
        write!(f, "{rank_ch}{suit_ch}")
    }
}

/// Non-panicking helper to parse card tokens into Card instances.
/// Returns the first parse error if any token is invalid.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}

/// Parse a whitespace-separated hand such as `"3S 3H 4D SJ"`.
pub fn parse_hand(text: &str) -> Result<Vec<Card>, DomainError> {
    try_parse_cards(text.split_whitespace())
}
