//! Random selection and the four choice methods.
//!
//! `random_in_range` is the only place randomness enters the program; the
//! coin, the dice and the list pick are thin mappings over it. The RNG is a
//! type parameter so tests can drive a seeded `StdRng` while the application
//! uses the thread-local generator.

use std::fmt;
use std::str::FromStr;

use rand::rngs::ThreadRng;
use rand::Rng;
use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{fetch_item, fetch_item_ids_for_list, fetch_item_list_by_name};
use crate::error::ChooserError;

/// Sides of the standard die.
pub const NORMAL_DICE_SIDES: i64 = 6;
/// Custom die range used until the user picks one.
pub const CUSTOM_DICE_RANGE_DEFAULT: i64 = 20;

/// Uniform integer in `[0, max)`. A bound of zero or less is rejected instead
/// of silently producing 0.
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, max: i64) -> Result<i64, ChooserError> {
    if max <= 0 {
        return Err(ChooserError::InvalidRange(max));
    }
    Ok(rng.random_range(0..max))
}

/// Interpret user input for the custom die. Anything that is not a positive
/// integer falls back to the last good value.
pub fn parse_custom_range(input: &str, fallback: i64) -> i64 {
    match input.trim().parse::<i64>() {
        Ok(value) if value > 0 => value,
        _ => {
            warn!(input, fallback, "ignoring invalid custom dice range");
            fallback
        }
    }
}

/// The four ways of producing a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChoiceMethod {
    FromList,
    #[default]
    ThrowCoin,
    RuleDice,
    RuleCustomDice,
}

impl ChoiceMethod {
    pub const ALL: [ChoiceMethod; 4] = [
        ChoiceMethod::FromList,
        ChoiceMethod::ThrowCoin,
        ChoiceMethod::RuleDice,
        ChoiceMethod::RuleCustomDice,
    ];

    /// Name stored in the settings table.
    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceMethod::FromList => "FROM_LIST",
            ChoiceMethod::ThrowCoin => "THROW_COIN",
            ChoiceMethod::RuleDice => "RULE_DICE",
            ChoiceMethod::RuleCustomDice => "RULE_CUSTOM_DICE",
        }
    }

    /// Human label for menus.
    pub fn label(self) -> &'static str {
        match self {
            ChoiceMethod::FromList => "Choose from list",
            ChoiceMethod::ThrowCoin => "Throw a coin",
            ChoiceMethod::RuleDice => "Roll a die",
            ChoiceMethod::RuleCustomDice => "Roll a custom die",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|method| *method == self)
            .unwrap_or_default()
    }

    /// Step through `ALL`, wrapping at both ends.
    pub fn cycle(self, offset: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + offset).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

impl fmt::Display for ChoiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown choice method \"{0}\"")]
pub struct ParseChoiceMethodError(pub String);

impl FromStr for ChoiceMethod {
    type Err = ParseChoiceMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChoiceMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| ParseChoiceMethodError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => f.write_str("Heads"),
            CoinSide::Tails => f.write_str("Tails"),
        }
    }
}

/// Outcome of a single choice. `Display` yields the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Item(String),
    Coin(CoinSide),
    Die { face: i64, sides: i64 },
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Item(name) => f.write_str(name),
            Choice::Coin(side) => write!(f, "{side}"),
            Choice::Die { face, .. } => write!(f, "{face}"),
        }
    }
}

/// Everything the orchestrator needs to run one method.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceRequest<'a> {
    pub method: ChoiceMethod,
    /// Only read for `FromList`.
    pub list_name: Option<&'a str>,
    /// Only read for `RuleCustomDice`.
    pub custom_range: i64,
}

/// Holds the RNG and the last custom range that actually produced a roll.
pub struct Chooser<R = ThreadRng> {
    rng: R,
    last_custom_range: i64,
}

impl Chooser<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }
}

impl Default for Chooser<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Chooser<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            last_custom_range: CUSTOM_DICE_RANGE_DEFAULT,
        }
    }

    pub fn random_in_range(&mut self, max: i64) -> Result<i64, ChooserError> {
        random_in_range(&mut self.rng, max)
    }

    pub fn last_custom_range(&self) -> i64 {
        self.last_custom_range
    }

    /// Restore a remembered range, e.g. from settings. Non-positive values
    /// are ignored.
    pub fn set_last_custom_range(&mut self, range: i64) {
        if range > 0 {
            self.last_custom_range = range;
        }
    }

    pub fn throw_coin(&mut self) -> CoinSide {
        if self.rng.random_range(0..2) == 0 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }

    /// Face of a six-sided die, 1..=6.
    pub fn roll_dice(&mut self) -> i64 {
        self.rng.random_range(1..=NORMAL_DICE_SIDES)
    }

    /// Face in 1..=range. A valid range becomes the remembered one.
    pub fn roll_custom_dice(&mut self, range: i64) -> Result<i64, ChooserError> {
        let roll = self.random_in_range(range)?;
        self.last_custom_range = range;
        Ok(roll + 1)
    }

    /// Pick a random item name from the named list. An empty list is not an
    /// error and yields `None`.
    pub fn choose_from_list(
        &mut self,
        conn: &Connection,
        list_name: &str,
    ) -> Result<Option<String>, ChooserError> {
        let list = fetch_item_list_by_name(conn, list_name)?;
        let item_ids = fetch_item_ids_for_list(conn, list.id)?;
        if item_ids.is_empty() {
            debug!(list_name, "list has no items");
            return Ok(None);
        }

        let index = self.random_in_range(item_ids.len() as i64)? as usize;
        let item = fetch_item(conn, item_ids[index])?;
        Ok(Some(item.name))
    }

    /// Run the requested method and return its outcome.
    pub fn choose(
        &mut self,
        conn: &Connection,
        request: &ChoiceRequest<'_>,
    ) -> Result<Option<Choice>, ChooserError> {
        let choice = match request.method {
            ChoiceMethod::FromList => {
                let list_name = request.list_name.ok_or(ChooserError::NoListSelected)?;
                self.choose_from_list(conn, list_name)?.map(Choice::Item)
            }
            ChoiceMethod::ThrowCoin => Some(Choice::Coin(self.throw_coin())),
            ChoiceMethod::RuleDice => Some(Choice::Die {
                face: self.roll_dice(),
                sides: NORMAL_DICE_SIDES,
            }),
            ChoiceMethod::RuleCustomDice => Some(Choice::Die {
                face: self.roll_custom_dice(request.custom_range)?,
                sides: request.custom_range,
            }),
        };
        debug!(method = %request.method, ?choice, "made a choice");
        Ok(choice)
    }
}
