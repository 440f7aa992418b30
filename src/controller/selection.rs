use indexmap::IndexSet;

/// Modifier held while clicking a row. Shift wins when both are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickModifier {
    #[default]
    None,
    Shift,
    Meta,
}

/// Result of applying a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Index out of range for the displayed rows; state unchanged
    Rejected,
    /// The single selected row was clicked again and deselected
    Cleared,
    /// The selection now includes the clicked row (or a range/toggle of it)
    Selected,
}

/// Row selection in the flat table.
///
/// `Multi` keeps click order (used when building payloads) but compares as
/// a set. An empty `Multi` is never stored; it collapses to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(usize),
    Multi(IndexSet<usize>),
}

impl Selection {
    pub fn is_selected(&self, index: usize) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(i) => *i == index,
            Selection::Multi(set) => set.contains(&index),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi(set) => set.len(),
        }
    }

    /// Selected indices in the order they were selected
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(i) => vec![*i],
            Selection::Multi(set) => set.iter().copied().collect(),
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }

    /// Apply a click on row `index` of a table with `len` rows.
    pub fn click(&mut self, index: usize, modifier: ClickModifier, len: usize) -> ClickOutcome {
        if index >= len {
            return ClickOutcome::Rejected;
        }
        if *self == Selection::Single(index) {
            *self = Selection::None;
            return ClickOutcome::Cleared;
        }

        let next = match (modifier, &*self) {
            (_, Selection::None) => Selection::Single(index),
            (ClickModifier::None, _) => Selection::Single(index),
            (ClickModifier::Shift, Selection::Single(j)) => {
                let j = *j;
                span(j.min(index), j.max(index))
            }
            (ClickModifier::Shift, Selection::Multi(set)) => {
                // Bounds come from the extremes of the current selection,
                // so a shift-click inside the range never shrinks it.
                let lo = set.iter().copied().min().map_or(index, |m| m.min(index));
                let hi = set.iter().copied().max().map_or(index, |m| m.max(index));
                span(lo, hi)
            }
            (ClickModifier::Meta, Selection::Single(j)) => {
                Selection::Multi([*j, index].into_iter().collect())
            }
            (ClickModifier::Meta, Selection::Multi(set)) => {
                let mut set = set.clone();
                if !set.shift_remove(&index) {
                    set.insert(index);
                }
                if set.is_empty() {
                    Selection::None
                } else {
                    Selection::Multi(set)
                }
            }
        };
        *self = next;
        ClickOutcome::Selected
    }
}

fn span(lo: usize, hi: usize) -> Selection {
    Selection::Multi((lo..=hi).collect())
}
