use super::selection::ClickOutcome;

/// Selection state of the grouped-by-recording view.
///
/// At most one group is expanded. When the view's expand-all flag is set,
/// every group renders expanded and expand/collapse requests are ignored;
/// row selection still works.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedSelection {
    expanded_group: Option<String>,
    selected_index_in_group: Option<usize>,
}

impl GroupedSelection {
    pub fn expanded_group(&self) -> Option<&str> {
        self.expanded_group.as_deref()
    }

    pub fn selected_index_in_group(&self) -> Option<usize> {
        self.selected_index_in_group
    }

    pub fn is_empty(&self) -> bool {
        self.expanded_group.is_none() && self.selected_index_in_group.is_none()
    }

    pub fn clear(&mut self) {
        self.expanded_group = None;
        self.selected_index_in_group = None;
    }

    pub fn is_expanded(&self, group_id: &str, expand_all: bool) -> bool {
        expand_all || self.expanded_group.as_deref() == Some(group_id)
    }

    /// True when `group_id` holds the selected page
    pub fn has_active_page(&self, group_id: &str) -> bool {
        self.expanded_group.as_deref() == Some(group_id) && self.selected_index_in_group.is_some()
    }

    pub fn is_row_selected(&self, group_id: &str, index: usize) -> bool {
        self.expanded_group.as_deref() == Some(group_id)
            && self.selected_index_in_group == Some(index)
    }

    /// Expand `group_id`, collapsing whichever group was open.
    pub fn expand(&mut self, group_id: &str, expand_all: bool) -> bool {
        if expand_all {
            return false;
        }
        self.expanded_group = Some(group_id.to_string());
        self.selected_index_in_group = None;
        true
    }

    pub fn collapse(&mut self, expand_all: bool) -> bool {
        if expand_all || self.expanded_group.is_none() {
            return false;
        }
        self.clear();
        true
    }

    /// Click row `index` of group `group_id`, which has `group_len` rows.
    /// Clicking the selected row again deselects it but keeps the group open.
    pub fn click(&mut self, group_id: &str, index: usize, group_len: usize) -> ClickOutcome {
        if index >= group_len {
            return ClickOutcome::Rejected;
        }
        if self.is_row_selected(group_id, index) {
            self.selected_index_in_group = None;
            return ClickOutcome::Cleared;
        }
        self.expanded_group = Some(group_id.to_string());
        self.selected_index_in_group = Some(index);
        ClickOutcome::Selected
    }
}
