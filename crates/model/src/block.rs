use serde::{Deserialize, Serialize};

/// Smallest width (percent of the timeline) a block can be resized to.
pub const MIN_BLOCK_WIDTH: f64 = 5.0;
/// Width given to newly added blocks.
pub const DEFAULT_BLOCK_WIDTH: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl BlockType {
    pub const ALL: [BlockType; 5] = [
        BlockType::Intro,
        BlockType::Verse,
        BlockType::Chorus,
        BlockType::Bridge,
        BlockType::Outro,
    ];

    /// Fixed colour token for each section type.
    pub fn color(&self) -> &'static str {
        match self {
            BlockType::Intro => "bg-blue-500",
            BlockType::Verse => "bg-indigo-500",
            BlockType::Chorus => "bg-pink-500",
            BlockType::Bridge => "bg-orange-500",
            BlockType::Outro => "bg-purple-500",
        }
    }
}

/// One segment of the arrangement timeline. `width` is a share of the
/// timeline in percent; the blocks are not required to add up to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub color: String,
    pub width: f64,
}

impl SongBlock {
    pub fn new(id: impl Into<String>, kind: BlockType) -> Self {
        Self {
            id: id.into(),
            kind,
            color: kind.color().to_string(),
            width: DEFAULT_BLOCK_WIDTH,
        }
    }
}

/// A named snapshot of the block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArrangement {
    pub id: String,
    pub name: String,
    pub blocks: Vec<SongBlock>,
}
