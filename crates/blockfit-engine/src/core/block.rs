use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{InvalidBlockDataError, UnknownBlockTypeError};

use super::MAX_BLOCK_CELLS;

/// A cell coordinate on the board, or a cell offset within a block shape.
///
/// Rows grow downward and columns grow rightward. Coordinates are signed so
/// that positions computed off the edge of the board stay representable and
/// can be rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns this position shifted by the given row and column offsets.
    #[must_use]
    pub const fn translated(self, row: i32, col: i32) -> Self {
        Self::new(self.row + row, self.col + col)
    }
}

/// Cell storage for a block shape.
pub type BlockShape = ArrayVec<Position, MAX_BLOCK_CELLS>;

/// Enum representing the type of block.
///
/// The serialized names (`"LINE_2"`, `"SQUARE_2X2"`, ...) are the names used
/// by [`BlockData`] and by [`BlockType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    /// Single cell.
    #[serde(rename = "SINGLE")]
    Single = 0,
    /// Horizontal line of 2 cells.
    #[serde(rename = "LINE_2")]
    Line2 = 1,
    /// Horizontal line of 3 cells.
    #[serde(rename = "LINE_3")]
    Line3 = 2,
    /// Horizontal line of 4 cells.
    #[serde(rename = "LINE_4")]
    Line4 = 3,
    /// Horizontal line of 5 cells.
    #[serde(rename = "LINE_5")]
    Line5 = 4,
    /// 2×2 square.
    #[serde(rename = "SQUARE_2X2")]
    Square2x2 = 5,
    /// 3×3 square.
    #[serde(rename = "SQUARE_3X3")]
    Square3x3 = 6,
    /// L of 3 cells.
    #[serde(rename = "L_SMALL")]
    LSmall = 7,
    /// L of 4 cells.
    #[serde(rename = "L_MEDIUM")]
    LMedium = 8,
    /// L of 5 cells.
    #[serde(rename = "L_LARGE")]
    LLarge = 9,
    /// T of 5 cells with a long stem.
    #[serde(rename = "T_SHAPE")]
    TShape = 10,
}

impl BlockType {
    /// Number of block types (11).
    pub const LEN: usize = 11;

    /// Every block type, in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        Self::Single,
        Self::Line2,
        Self::Line3,
        Self::Line4,
        Self::Line5,
        Self::Square2x2,
        Self::Square3x3,
        Self::LSmall,
        Self::LMedium,
        Self::LLarge,
        Self::TShape,
    ];

    /// Returns the canonical (unrotated) cells of this block type.
    #[must_use]
    pub const fn canonical_shape(self) -> &'static [Position] {
        macro_rules! shape {
            ($(($row:literal, $col:literal)),* $(,)?) => {
                &[$(Position { row: $row, col: $col }),*]
            };
        }

        match self {
            Self::Single => shape![(0, 0)],
            Self::Line2 => shape![(0, 0), (0, 1)],
            Self::Line3 => shape![(0, 0), (0, 1), (0, 2)],
            Self::Line4 => shape![(0, 0), (0, 1), (0, 2), (0, 3)],
            Self::Line5 => shape![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)],
            Self::Square2x2 => shape![(0, 0), (0, 1), (1, 0), (1, 1)],
            Self::Square3x3 => shape![
                (0, 0), (0, 1), (0, 2),
                (1, 0), (1, 1), (1, 2),
                (2, 0), (2, 1), (2, 2),
            ],
            Self::LSmall => shape![(0, 0), (1, 0), (1, 1)],
            Self::LMedium => shape![(0, 0), (1, 0), (2, 0), (2, 1)],
            Self::LLarge => shape![(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)],
            Self::TShape => shape![(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)],
        }
    }

    /// Returns the serialized name of this block type.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfit_engine::BlockType;
    ///
    /// assert_eq!(BlockType::Square2x2.as_str(), "SQUARE_2X2");
    /// assert_eq!("L_SMALL".parse::<BlockType>(), Ok(BlockType::LSmall));
    /// assert!("L_HUGE".parse::<BlockType>().is_err());
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Line2 => "LINE_2",
            Self::Line3 => "LINE_3",
            Self::Line4 => "LINE_4",
            Self::Line5 => "LINE_5",
            Self::Square2x2 => "SQUARE_2X2",
            Self::Square3x3 => "SQUARE_3X3",
            Self::LSmall => "L_SMALL",
            Self::LMedium => "L_MEDIUM",
            Self::LLarge => "L_LARGE",
            Self::TShape => "T_SHAPE",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = UnknownBlockTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownBlockTypeError { name: s.to_owned() })
    }
}

/// Rotation state of a block.
///
/// Stored as the number of clockwise quarter turns applied to the canonical
/// shape (0-3), exposed as degrees (0, 90, 180, 270).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRotation(u8);

impl BlockRotation {
    /// Creates a rotation from degrees, if it is a multiple of 90 below 360.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self(0)),
            90 => Some(Self(1)),
            180 => Some(Self(2)),
            270 => Some(Self(3)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0 as u16 * 90
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }
}

/// Width and height of a block's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockBounds {
    pub width: usize,
    pub height: usize,
}

/// Plain-data form of a [`Block`], suitable for storage or transmission.
///
/// # Example
///
/// ```
/// use blockfit_engine::{Block, BlockType};
///
/// let block = Block::new(BlockType::LSmall).rotated();
/// let json = serde_json::to_string(&block.to_data()).unwrap();
/// assert_eq!(
///     json,
///     r#"{"type":"L_SMALL","shape":[{"row":0,"col":1},{"row":0,"col":0},{"row":1,"col":0}],"rotation":90}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub shape: Vec<Position>,
    pub rotation: u16,
}

/// A block shape with its type and rotation state.
///
/// Blocks are immutable: rotation returns a new `Block` and leaves the
/// original untouched. Shapes are always normalized so that the minimum row
/// and minimum column are both 0.
///
/// # Example
///
/// ```
/// use blockfit_engine::{Block, BlockBounds, BlockType, Position};
///
/// let block = Block::new(BlockType::LLarge);
/// assert_eq!(block.bounds(), BlockBounds { width: 2, height: 4 });
///
/// let rotated = block.rotated();
/// assert_eq!(rotated.rotation().degrees(), 90);
/// assert_eq!(rotated.bounds(), BlockBounds { width: 4, height: 2 });
///
/// let cells = block.absolute_positions(2, 3);
/// assert_eq!(cells[0], Position::new(2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BlockData", try_from = "BlockData")]
pub struct Block {
    kind: BlockType,
    shape: BlockShape,
    rotation: BlockRotation,
}

impl Block {
    /// Creates a block with the canonical shape of `kind` and rotation 0.
    #[must_use]
    pub fn new(kind: BlockType) -> Self {
        Self {
            kind,
            shape: kind.canonical_shape().iter().copied().collect(),
            rotation: BlockRotation::default(),
        }
    }

    #[must_use]
    pub fn block_type(&self) -> BlockType {
        self.kind
    }

    /// Returns the cells of the block, relative to its top-left corner.
    #[must_use]
    pub fn shape(&self) -> &[Position] {
        &self.shape
    }

    #[must_use]
    pub fn rotation(&self) -> BlockRotation {
        self.rotation
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.shape.len()
    }

    /// Returns the cells of the block translated to `(base_row, base_col)`.
    ///
    /// No board validation is performed.
    #[must_use]
    pub fn absolute_positions(&self, base_row: i32, base_col: i32) -> BlockShape {
        self.shape
            .iter()
            .map(|pos| pos.translated(base_row, base_col))
            .collect()
    }

    /// Returns a copy of this block rotated 90° clockwise.
    ///
    /// Each cell is mapped with `(row, col) -> (col, -row)` and the result is
    /// shifted back so the minimum row and column are 0 again. Four rotations
    /// give back the original block.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let mut shape: BlockShape = self
            .shape
            .iter()
            .map(|pos| Position::new(pos.col, -pos.row))
            .collect();
        normalize(&mut shape);
        Self {
            kind: self.kind,
            shape,
            rotation: self.rotation.rotated_right(),
        }
    }

    /// Returns the size of the block's bounding box.
    ///
    /// An empty shape has bounds `{0, 0}`.
    #[must_use]
    pub fn bounds(&self) -> BlockBounds {
        let Some(max_row) = self.shape.iter().map(|pos| pos.row).max() else {
            return BlockBounds::default();
        };
        let max_col = self.shape.iter().map(|pos| pos.col).max().unwrap_or(0);
        BlockBounds {
            width: usize::try_from(max_col + 1).unwrap_or(0),
            height: usize::try_from(max_row + 1).unwrap_or(0),
        }
    }

    /// Converts the block into its plain-data form.
    #[must_use]
    pub fn to_data(&self) -> BlockData {
        BlockData {
            block_type: self.kind,
            shape: self.shape.to_vec(),
            rotation: self.rotation.degrees(),
        }
    }

    /// Rebuilds a block from data produced by [`Self::to_data`].
    pub fn from_data(data: &BlockData) -> Result<Self, InvalidBlockDataError> {
        let rotation = BlockRotation::from_degrees(data.rotation)
            .ok_or(InvalidBlockDataError::InvalidRotation(data.rotation))?;
        if data.shape.is_empty() {
            return Err(InvalidBlockDataError::EmptyShape);
        }
        let shape = BlockShape::try_from(data.shape.as_slice())
            .map_err(|_| InvalidBlockDataError::TooManyCells(data.shape.len()))?;
        let min_row = shape.iter().map(|pos| pos.row).min();
        let min_col = shape.iter().map(|pos| pos.col).min();
        if min_row != Some(0) || min_col != Some(0) {
            return Err(InvalidBlockDataError::NotNormalized);
        }
        Ok(Self {
            kind: data.block_type,
            shape,
            rotation,
        })
    }
}

impl From<Block> for BlockData {
    fn from(block: Block) -> Self {
        block.to_data()
    }
}

impl TryFrom<BlockData> for Block {
    type Error = InvalidBlockDataError;

    fn try_from(data: BlockData) -> Result<Self, Self::Error> {
        Self::from_data(&data)
    }
}

/// Shifts the shape so that its minimum row and minimum column are 0.
fn normalize(shape: &mut BlockShape) {
    let Some(min_row) = shape.iter().map(|pos| pos.row).min() else {
        return;
    };
    let min_col = shape.iter().map(|pos| pos.col).min().unwrap_or(0);
    for pos in shape.iter_mut() {
        *pos = pos.translated(-min_row, -min_col);
    }
}
