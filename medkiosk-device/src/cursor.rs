//! Clamped pagination over a fetched list.

/// Direction of a cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Back,
    Forward,
}

/// A list with a current position.
///
/// The index is always inside `0..len` when the list is non-empty and is
/// reset to 0 whenever the list is replaced.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, index: 0 }
    }

    /// Swaps in a freshly fetched list and rewinds.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = 0;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Moves one step. Returns false, leaving the index alone, when the list
    /// is empty or the cursor is already at that end.
    pub fn step(&mut self, step: Step) -> bool {
        match step {
            Step::Back if self.index > 0 => {
                self.index -= 1;
                true
            }
            Step::Forward if self.index + 1 < self.items.len() => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_list_never_moves() {
        let mut list: Paginated<u32> = Paginated::default();
        assert!(!list.step(Step::Forward));
        assert!(!list.step(Step::Back));
        assert_eq!(list.current(), None);
        assert_eq!(list.index(), 0);
    }

    #[test]
    fn test_bounds() {
        let mut list = Paginated::new(vec!["a", "b", "c"]);
        assert!(!list.step(Step::Back));
        assert!(list.step(Step::Forward));
        assert!(list.step(Step::Forward));
        assert_eq!(list.current(), Some(&"c"));
        assert!(!list.step(Step::Forward));
        assert_eq!(list.index(), 2);
    }

    #[test]
    fn test_replace_rewinds() {
        let mut list = Paginated::new(vec![1, 2, 3]);
        list.step(Step::Forward);
        list.replace(vec![7, 8]);
        assert_eq!(list.index(), 0);
        assert_eq!(list.current(), Some(&7));
        list.clear();
        assert!(list.is_empty());
    }

    proptest! {
        #[test]
        fn prop_index_stays_in_bounds(
            len in 0usize..20,
            moves in prop::collection::vec(any::<bool>(), 0..64),
        ) {
            let mut list = Paginated::new((0..len).collect::<Vec<_>>());
            for forward in moves {
                let before = list.index();
                let step = if forward { Step::Forward } else { Step::Back };
                let moved = list.step(step);

                if len == 0 {
                    prop_assert_eq!(list.index(), 0);
                } else {
                    prop_assert!(list.index() < len);
                }
                prop_assert_eq!(moved, list.index() != before);
                prop_assert_eq!(list.current().copied(), if len == 0 { None } else { Some(list.index()) });
            }
        }
    }
}
