use serde::{Deserialize, Serialize};

/// One board cell. Only the round's reveal step flips `is_revealed`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub is_mine: bool,
    pub is_revealed: bool,
    /// Mines among the 8 surrounding tiles, fixed at generation time.
    pub adjacent_mines: u8,
}

impl Tile {
    pub const fn is_hidden_safe(self) -> bool {
        !self.is_mine && !self.is_revealed
    }
}
