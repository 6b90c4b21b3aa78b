//! Generic scrollable list state: selection, scroll offset and hiding.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub visible_indices: Vec<usize>,
    pub selected: usize,
    pub scroll_offset: usize,
    hide_fn: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            visible_indices: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            hide_fn: Box::new(|_| false),
        }
    }

    /// Replaces the items and resets the cursor to the top.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
        self.scroll_offset = 0;
        self.rebuild();
    }

    /// Items for which `hide` returns true are skipped.
    pub fn set_hidden(&mut self, hide: impl Fn(&T) -> bool + Send + Sync + 'static) {
        let prev = self.selected_original_index();
        self.hide_fn = Box::new(hide);
        self.rebuild();
        // A hidden cursor item hands the cursor to the next visible row
        if let Some(prev) = prev {
            if let Some(pos) = self.visible_indices.iter().position(|&i| i >= prev) {
                self.selected = pos;
            }
        }
    }

    pub fn rebuild(&mut self) {
        self.visible_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !(self.hide_fn)(item))
            .map(|(i, _)| i)
            .collect();
        if self.selected >= self.visible_indices.len() {
            self.selected = self.visible_indices.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        if self.visible_indices.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.visible_indices.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.visible_indices.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_indices.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        let idx = self.visible_indices.get(self.selected)?;
        self.items.get(*idx)
    }

    pub fn selected_original_index(&self) -> Option<usize> {
        self.visible_indices.get(self.selected).copied()
    }

    /// Returns (original_index, &item) pairs visible in `height` rows.
    /// Call ensure_visible first to update scroll_offset.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        if height == 0 || self.visible_indices.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.visible_indices.len());
        let end = (start + height).min(self.visible_indices.len());
        self.visible_indices[start..end]
            .iter()
            .map(|&i| (i, &self.items[i]))
            .collect()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected.saturating_sub(height - 1);
        }
    }

    /// Handle a click at `row` within the rendered area.
    /// Returns true if selection changed.
    pub fn handle_click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.visible_indices.len() {
            self.selected = target;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.visible_indices.len()
    }

    pub fn selected_in_view(&self, height: usize) -> usize {
        self.selected
            .saturating_sub(self.scroll_offset)
            .min(height.saturating_sub(1))
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> ScrollableList<usize> {
        let mut list = ScrollableList::new();
        list.set_items((0..n).collect());
        list
    }

    #[test]
    fn test_selection_clamps_to_bounds() {
        let mut list = list(3);
        list.select_up(5);
        assert_eq!(list.selected_item(), Some(&0));
        list.select_down(10);
        assert_eq!(list.selected_item(), Some(&2));

        let mut empty: ScrollableList<usize> = ScrollableList::new();
        empty.select_down(1);
        assert_eq!(empty.selected_item(), None);
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut list = list(20);
        list.select_down(12);
        list.ensure_visible(5);
        assert_eq!(list.scroll_offset, 8);
        assert_eq!(list.selected_in_view(5), 4);

        let rows: Vec<usize> = list.visible_items(5).into_iter().map(|(i, _)| i).collect();
        assert_eq!(rows, [8, 9, 10, 11, 12]);

        list.select_first();
        list.ensure_visible(5);
        assert_eq!(list.scroll_offset, 0);
    }

    #[test]
    fn test_hidden_items_are_skipped_and_selection_kept() {
        let mut list = list(5);
        list.select_down(3);
        list.set_hidden(|i| *i == 1);

        assert_eq!(list.len(), 4);
        assert_eq!(list.selected_item(), Some(&3));
        assert_eq!(list.selected_original_index(), Some(3));

        list.set_hidden(|i| *i == 3);
        assert_eq!(list.selected_item(), Some(&4));
    }

    #[test]
    fn test_click_outside_rows_is_ignored() {
        let mut list = list(2);
        assert!(list.handle_click(1));
        assert_eq!(list.selected, 1);
        assert!(!list.handle_click(4));
        assert_eq!(list.selected, 1);
    }
}
