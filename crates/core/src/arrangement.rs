//! Song-structure timeline and its saved snapshots.

use onbeat_model::{BlockType, MIN_BLOCK_WIDTH, SavedArrangement, SongBlock, fresh_id};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arrangement {
    blocks: Vec<SongBlock>,
    saved: Vec<SavedArrangement>,
}

impl Arrangement {
    pub fn new(blocks: Vec<SongBlock>, saved: Vec<SavedArrangement>) -> Self {
        Self { blocks, saved }
    }

    pub fn blocks(&self) -> &[SongBlock] {
        &self.blocks
    }

    pub fn saved(&self) -> &[SavedArrangement] {
        &self.saved
    }

    pub fn block(&self, id: &str) -> Option<&SongBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Append a block of `kind` at the end. Other widths are left alone.
    pub fn add_block(&mut self, kind: BlockType) -> String {
        let id = fresh_id();
        self.blocks.push(SongBlock::new(id.clone(), kind));
        id
    }

    pub fn remove_block(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        self.blocks.len() != before
    }

    /// Set the width of one block, never below [`MIN_BLOCK_WIDTH`].
    pub fn resize_block(&mut self, id: &str, width: f64) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.width = width.max(MIN_BLOCK_WIDTH);
                true
            }
            None => false,
        }
    }

    /// Resize by a drag delta, in percent of the timeline.
    pub fn drag_block(&mut self, id: &str, delta: f64) -> bool {
        match self.block(id).map(|b| b.width) {
            Some(width) => self.resize_block(id, width + delta),
            None => false,
        }
    }

    /// Snapshot the current blocks under `name`. Names may repeat.
    pub fn save(&mut self, name: &str) -> String {
        let id = fresh_id();
        self.saved.push(SavedArrangement {
            id: id.clone(),
            name: name.to_string(),
            blocks: self.blocks.clone(),
        });
        id
    }

    /// Replace the live blocks with a copy of a saved snapshot. Unknown ids
    /// leave the timeline as it is.
    pub fn load(&mut self, id: &str) -> bool {
        match self.saved.iter().find(|a| a.id == id) {
            Some(arrangement) => {
                self.blocks = arrangement.blocks.clone();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.saved.len();
        self.saved.retain(|a| a.id != id);
        self.saved.len() != before
    }

    pub fn into_parts(self) -> (Vec<SongBlock>, Vec<SavedArrangement>) {
        (self.blocks, self.saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onbeat_model::DEFAULT_BLOCK_WIDTH;

    fn shape(blocks: &[SongBlock]) -> Vec<(BlockType, f64)> {
        blocks.iter().map(|b| (b.kind, b.width)).collect()
    }

    #[test]
    fn test_add_chorus_to_empty_arrangement() {
        let mut arrangement = Arrangement::default();
        arrangement.add_block(BlockType::Chorus);

        assert_eq!(arrangement.blocks().len(), 1);
        let block = &arrangement.blocks()[0];
        assert_eq!(block.width, 15.0);
        assert_eq!(block.color, BlockType::Chorus.color());
        assert_eq!(block.color, "bg-pink-500");
    }

    #[test]
    fn test_add_does_not_renormalize() {
        let mut arrangement = Arrangement::default();
        for _ in 0..8 {
            arrangement.add_block(BlockType::Verse);
        }

        assert!(arrangement.blocks().iter().all(|b| b.width == DEFAULT_BLOCK_WIDTH));
        let total: f64 = arrangement.blocks().iter().map(|b| b.width).sum();
        assert_eq!(total, 120.0);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut arrangement = Arrangement::default();
        let id = arrangement.add_block(BlockType::Intro);

        for (requested, expected) in [(30.0, 30.0), (5.0, 5.0), (4.99, 5.0), (0.0, 5.0), (-40.0, 5.0)] {
            arrangement.resize_block(&id, requested);
            assert_eq!(arrangement.block(&id).expect("block").width, expected);
        }
    }

    #[test]
    fn test_resize_only_touches_matching_block() {
        let mut arrangement = Arrangement::default();
        let a = arrangement.add_block(BlockType::Intro);
        let b = arrangement.add_block(BlockType::Outro);

        arrangement.resize_block(&a, 40.0);

        assert_eq!(arrangement.block(&a).expect("a").width, 40.0);
        assert_eq!(arrangement.block(&b).expect("b").width, 15.0);
    }

    #[test]
    fn test_drag_applies_delta_and_clamps() {
        let mut arrangement = Arrangement::default();
        let id = arrangement.add_block(BlockType::Bridge);

        arrangement.drag_block(&id, 2.5);
        assert_eq!(arrangement.block(&id).expect("block").width, 17.5);

        arrangement.drag_block(&id, -100.0);
        assert_eq!(arrangement.block(&id).expect("block").width, 5.0);
    }

    #[test]
    fn test_save_then_load_restores_sequence_after_edits() {
        let mut arrangement = Arrangement::default();
        let intro = arrangement.add_block(BlockType::Intro);
        arrangement.add_block(BlockType::Verse);
        arrangement.add_block(BlockType::Chorus);
        arrangement.resize_block(&intro, 22.0);
        let expected = shape(arrangement.blocks());

        let saved = arrangement.save("Radio Edit");

        arrangement.remove_block(&intro);
        arrangement.add_block(BlockType::Outro);
        let last = arrangement.blocks()[0].id.clone();
        arrangement.resize_block(&last, 60.0);

        assert!(arrangement.load(&saved));
        assert_eq!(shape(arrangement.blocks()), expected);
    }

    #[test]
    fn test_loaded_blocks_do_not_alias_snapshot() {
        let mut arrangement = Arrangement::default();
        arrangement.add_block(BlockType::Verse);
        let saved = arrangement.save("A");

        arrangement.load(&saved);
        let id = arrangement.blocks()[0].id.clone();
        arrangement.resize_block(&id, 80.0);

        assert_eq!(arrangement.saved()[0].blocks[0].width, 15.0);
    }

    #[test]
    fn test_save_allows_duplicate_names() {
        let mut arrangement = Arrangement::default();
        let first = arrangement.save("Demo");
        let second = arrangement.save("Demo");

        assert_ne!(first, second);
        assert_eq!(arrangement.saved().len(), 2);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut arrangement = Arrangement::default();
        arrangement.add_block(BlockType::Verse);
        arrangement.save("Keep");
        let before = arrangement.clone();

        assert!(!arrangement.load("missing"));
        assert!(!arrangement.delete("missing"));
        assert!(!arrangement.remove_block("missing"));
        assert!(!arrangement.resize_block("missing", 50.0));
        assert_eq!(arrangement, before);
    }

    #[test]
    fn test_delete_removes_saved_arrangement() {
        let mut arrangement = Arrangement::default();
        let id = arrangement.save("Gone");
        assert!(arrangement.delete(&id));
        assert!(arrangement.saved().is_empty());
    }
}
