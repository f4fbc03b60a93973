//! Layout grouping: split the block sequence into visually contiguous groups.
//!
//! A new group starts whenever the page changes or the vertical distance
//! between the bottom of the previous block and the top of the current one
//! reaches the gap threshold. Groups borrow contiguous slices of the block
//! list, so grouping allocates nothing but the group index.

use crate::model::{Group, TextBlock};

/// Group `blocks` in a single pass.
pub fn group(blocks: &[TextBlock], gap_threshold: f32) -> Vec<Group<'_>> {
    let mut groups = Vec::new();
    let mut start = 0;

    for i in 1..blocks.len() {
        if starts_new_group(&blocks[i - 1], &blocks[i], gap_threshold) {
            groups.push(Group {
                page_num: blocks[start].page_num,
                blocks: &blocks[start..i],
            });
            start = i;
        }
    }

    if start < blocks.len() {
        groups.push(Group {
            page_num: blocks[start].page_num,
            blocks: &blocks[start..],
        });
    }

    groups
}

fn starts_new_group(prev: &TextBlock, curr: &TextBlock, gap_threshold: f32) -> bool {
    curr.page_num != prev.page_num || (curr.bbox.y0 - prev.bbox.y1).abs() >= gap_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockType, BoundingBox, ExtractedBlock};

    fn block(page: usize, top: f32, bottom: f32) -> TextBlock {
        ExtractedBlock {
            text: format!("p{page} {top}"),
            bbox: BoundingBox::new(72.0, top, 540.0, bottom),
            font_size: 12.0,
            font_name: String::new(),
            is_bold: false,
            is_italic: false,
            page_num: page,
        }
        .with_type(BlockType::Paragraph)
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group(&[], 25.0).is_empty());
    }

    #[test]
    fn small_gap_stays_together() {
        let blocks = vec![block(1, 50.0, 74.0), block(1, 94.0, 105.0)];
        let groups = group(&blocks, 25.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].blocks.len(), 2);
    }

    #[test]
    fn gap_at_threshold_splits() {
        let blocks = vec![block(1, 50.0, 60.0), block(1, 85.0, 95.0), block(1, 100.0, 110.0)];
        let groups = group(&blocks, 25.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].blocks.len(), 1);
        assert_eq!(groups[1].blocks.len(), 2);
    }

    #[test]
    fn page_change_splits_even_when_close() {
        let blocks = vec![block(1, 700.0, 712.0), block(2, 712.0, 724.0)];
        let groups = group(&blocks, 25.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].page_num, 2);
    }

    #[test]
    fn upward_jump_splits() {
        // Second column starting back at the top of the page.
        let blocks = vec![block(1, 600.0, 700.0), block(1, 60.0, 80.0)];
        assert_eq!(group(&blocks, 25.0).len(), 2);
    }

    #[test]
    fn groups_cover_every_block_in_order() {
        let blocks = vec![
            block(1, 10.0, 20.0),
            block(1, 30.0, 40.0),
            block(1, 100.0, 110.0),
            block(2, 10.0, 20.0),
        ];
        let groups = group(&blocks, 25.0);
        let flattened: Vec<&TextBlock> = groups.iter().flat_map(|g| g.blocks.iter()).collect();
        assert_eq!(flattened.len(), blocks.len());
        for (a, b) in flattened.iter().zip(blocks.iter()) {
            assert_eq!(*a, b);
        }
    }
}
