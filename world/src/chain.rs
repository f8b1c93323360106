use std::{collections::VecDeque, mem};

use snake_core::{ChainView, Segment};

/// Ordered snake segments. The head is stored apart from the body so the
/// chain can never be empty.
#[derive(Clone, Debug)]
pub(crate) struct SegmentChain {
    head: Segment,
    body: VecDeque<Segment>,
}

impl SegmentChain {
    /// Builds a chain from head-first segments; `None` below two segments.
    pub(crate) fn new(segments: Vec<Segment>) -> Option<Self> {
        let mut segments = segments.into_iter();
        let head = segments.next()?;
        let body: VecDeque<Segment> = segments.collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { head, body })
    }

    pub(crate) fn head(&self) -> Segment {
        self.head
    }

    /// Makes `segment` the new head; the previous head joins the body.
    pub(crate) fn push_head(&mut self, segment: Segment) {
        let previous = mem::replace(&mut self.head, segment);
        self.body.push_front(previous);
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Segment> {
        self.body.pop_back()
    }

    pub(crate) fn push_tail(&mut self, segment: Segment) {
        self.body.push_back(segment);
    }

    pub(crate) fn view(&self) -> ChainView<'_> {
        let (front, back) = self.body.as_slices();
        ChainView::new(&self.head, front, back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_core::{CellCoord, Direction};

    fn segment(column: u32, row: u32) -> Segment {
        Segment::new(CellCoord::new(column, row), Direction::Up)
    }

    #[test]
    fn new_requires_head_and_tail() {
        assert!(SegmentChain::new(Vec::new()).is_none());
        assert!(SegmentChain::new(vec![segment(0, 0)]).is_none());
        assert!(SegmentChain::new(vec![segment(0, 0), segment(0, 1)]).is_some());
    }

    #[test]
    fn push_head_shifts_previous_head_into_body() {
        let mut chain = SegmentChain::new(vec![segment(1, 1), segment(1, 2)]).expect("chain");
        chain.push_head(segment(1, 0));

        let cells: Vec<_> = chain.view().iter().map(Segment::cell).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2)
            ]
        );
    }

    #[test]
    fn pop_then_push_tail_restores_chain() {
        let mut chain = SegmentChain::new(vec![segment(1, 1), segment(1, 2)]).expect("chain");
        let tail = chain.pop_tail().expect("tail");
        assert_eq!(chain.view().len(), 1);
        chain.push_tail(tail);
        assert_eq!(chain.view().tail().cell(), CellCoord::new(1, 2));
    }
}
