use thiserror::Error;

use crate::{board::BlockType, engine::power_up::Inventory};

pub const DEFAULT_SIZE: usize = 8;
pub const DEFAULT_KINDS: u8 = BlockType::ALL.len() as u8;
pub const DEFAULT_MOVES: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("board size must be at least 3, got {0}")]
    BoardTooSmall(usize),

    #[error(
        "number of block kinds must be within 3..={max}, got {0}",
        max = DEFAULT_KINDS
    )]
    BadKinds(u8),

    #[error("a level needs at least one move")]
    NoMoves,

    #[error("target step must be positive so every level asks for more")]
    FlatTarget,
}

/// Tunable constants for one match-three session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub size: usize,
    /// How many of [`BlockType::ALL`] appear on the board.
    pub kinds: u8,
    pub base_moves: u32,
    pub base_target: u32,
    pub target_step: u32,
    pub inventory: Inventory,
    /// Resampling attempts per cell before the generator gives up on
    /// avoiding an initial match.
    pub max_retries: u32,
}

impl Rules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.size < 3 {
            return Err(RulesError::BoardTooSmall(self.size));
        }

        if !(3..=BlockType::ALL.len()).contains(&(self.kinds as usize)) {
            return Err(RulesError::BadKinds(self.kinds));
        }

        if self.base_moves == 0 {
            return Err(RulesError::NoMoves);
        }

        if self.target_step == 0 {
            return Err(RulesError::FlatTarget);
        }

        Ok(())
    }

    /// Score needed to clear `level` (1-based).
    pub fn target_for(&self, level: u32) -> u32 {
        self.base_target + level.saturating_sub(1) * self.target_step
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            kinds: DEFAULT_KINDS,
            base_moves: DEFAULT_MOVES,
            base_target: 1000,
            target_step: 500,
            inventory: Inventory::new(3, 2, 1),
            max_retries: 64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Rules::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_rules() {
        let rules = Rules {
            size: 2,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::BoardTooSmall(2)));

        let rules = Rules {
            kinds: 2,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::BadKinds(2)));

        let rules = Rules {
            kinds: 7,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::BadKinds(7)));

        let rules = Rules {
            base_moves: 0,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::NoMoves));

        let rules = Rules {
            target_step: 0,
            ..Rules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::FlatTarget));
    }

    #[test]
    fn test_target_grows() {
        let rules = Rules::default();
        assert_eq!(rules.target_for(1), 1000);
        assert_eq!(rules.target_for(2), 1500);
        assert!(rules.target_for(7) > rules.target_for(6));
    }
}
