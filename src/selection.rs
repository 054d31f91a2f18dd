/// One ordered list with a cursor and a separate confirmation.
///
/// The cursor is `Some` whenever the list is non-empty and always points in
/// range. The confirmation is cleared by anything that moves the cursor or
/// changes the list, so a confirmed index never outlives the item it named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<String>,
    cursor: Option<usize>,
    confirmed: Option<usize>,
}

impl Selection {
    #[must_use]
    pub fn new(items: Vec<String>) -> Self {
        let cursor = if items.is_empty() { None } else { Some(0) };
        Self {
            items,
            cursor,
            confirmed: None,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn confirmed(&self) -> Option<usize> {
        self.confirmed
    }

    pub fn confirmed_item(&self) -> Option<&str> {
        self.confirmed
            .and_then(|idx| self.items.get(idx))
            .map(String::as_str)
    }

    pub fn move_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.cursor {
            Some(idx) if idx + 1 < self.items.len() => idx + 1,
            _ => 0,
        };
        self.cursor = Some(next);
        self.confirmed = None;
    }

    pub fn move_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let previous = match self.cursor {
            Some(idx) if idx > 0 && idx <= last => idx - 1,
            _ => last,
        };
        self.cursor = Some(previous);
        self.confirmed = None;
    }

    pub fn confirm(&mut self) {
        if let Some(idx) = self.cursor
            && idx < self.items.len()
        {
            self.confirmed = Some(idx);
        }
    }

    pub fn clear_confirmation(&mut self) {
        self.confirmed = None;
    }

    /// Appends a trimmed non-blank item and points the cursor at it.
    ///
    /// Returns `false` without touching the list for blank input.
    pub fn add(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        self.items.push(item.to_owned());
        self.cursor = Some(self.items.len() - 1);
        self.confirmed = None;
        true
    }

    /// Removes the item under the cursor, keeping the cursor on the same slot
    /// when possible.
    pub fn delete(&mut self) -> Option<String> {
        let idx = self.cursor.filter(|idx| *idx < self.items.len())?;
        let removed = self.items.remove(idx);
        self.cursor = if self.items.is_empty() {
            None
        } else {
            Some(idx.min(self.items.len() - 1))
        };
        self.confirmed = None;
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selection(items: &[&str]) -> Selection {
        Selection::new(items.iter().map(|item| (*item).to_owned()).collect())
    }

    #[test]
    fn new_points_at_first_item_or_nothing() {
        assert_eq!(selection(&["a", "b"]).cursor(), Some(0));
        assert_eq!(selection(&[]).cursor(), None);
    }

    #[test]
    fn movement_wraps_in_both_directions() {
        let mut list = selection(&["a", "b", "c"]);
        list.move_previous();
        assert_eq!(list.cursor(), Some(2));
        list.move_next();
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn movement_on_empty_list_is_noop() {
        let mut list = selection(&[]);
        list.move_next();
        list.move_previous();
        assert_eq!(list.cursor(), None);
    }

    #[test]
    fn movement_clears_confirmation() {
        let mut list = selection(&["a", "b"]);
        list.confirm();
        assert_eq!(list.confirmed(), Some(0));
        list.move_next();
        assert_eq!(list.confirmed(), None);
    }

    #[test]
    fn confirm_on_empty_list_is_noop() {
        let mut list = selection(&[]);
        list.confirm();
        assert_eq!(list.confirmed(), None);
        assert_eq!(list.confirmed_item(), None);
    }

    #[test]
    fn add_rejects_blank_input() {
        let mut list = selection(&["a"]);
        assert!(!list.add(""));
        assert!(!list.add("   "));
        assert_eq!(list.len(), 1);
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn add_appends_trimmed_and_moves_cursor() {
        let mut list = selection(&["a"]);
        list.confirm();
        assert!(list.add("  rtmp://x/live/1 "));
        assert_eq!(list.items(), ["a", "rtmp://x/live/1"]);
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.confirmed(), None);
    }

    #[test]
    fn delete_last_item_moves_cursor_back() {
        let mut list = selection(&["a", "b", "c"]);
        list.move_previous();
        assert_eq!(list.delete().as_deref(), Some("c"));
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn delete_middle_item_keeps_slot() {
        let mut list = selection(&["a", "b", "c"]);
        list.move_next();
        list.confirm();
        assert_eq!(list.delete().as_deref(), Some("b"));
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.items()[1], "c");
        assert_eq!(list.confirmed(), None);
    }

    #[test]
    fn delete_only_item_empties_cursor() {
        let mut list = selection(&["a"]);
        assert_eq!(list.delete().as_deref(), Some("a"));
        assert_eq!(list.cursor(), None);
        assert_eq!(list.delete(), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Next,
        Previous,
        Confirm,
        Add(String),
        Delete,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Next),
            Just(Op::Previous),
            Just(Op::Confirm),
            "[ a-z]{0,6}".prop_map(Op::Add),
            Just(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn next_then_previous_restores_cursor(
            items in prop::collection::vec("[a-z]{1,4}", 1..12),
            steps in 0_usize..20,
        ) {
            let mut list = Selection::new(items);
            for _ in 0..steps {
                list.move_next();
            }
            let before = list.cursor();
            list.move_next();
            list.move_previous();
            prop_assert_eq!(list.cursor(), before);
            list.move_previous();
            list.move_next();
            prop_assert_eq!(list.cursor(), before);
        }

        #[test]
        fn cursor_stays_in_range_under_any_edits(
            items in prop::collection::vec("[a-z]{1,4}", 0..8),
            ops in prop::collection::vec(op_strategy(), 0..64),
        ) {
            let mut list = Selection::new(items);
            for op in ops {
                match op {
                    Op::Next => list.move_next(),
                    Op::Previous => list.move_previous(),
                    Op::Confirm => list.confirm(),
                    Op::Add(item) => {
                        list.add(&item);
                    }
                    Op::Delete => {
                        list.delete();
                    }
                }
                prop_assert_eq!(list.cursor().is_none(), list.is_empty());
                if let Some(cursor) = list.cursor() {
                    prop_assert!(cursor < list.len());
                }
                if let Some(confirmed) = list.confirmed() {
                    prop_assert!(confirmed < list.len());
                }
            }
        }
    }
}
