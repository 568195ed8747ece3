use crate::models::{SearchEntry, StoryHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Fetch order. Only reachable as the initial state.
    #[default]
    None,
    Title,
    Author,
    Comments,
    Points,
}

impl SortKey {
    /// Columns offered to the user, in display order.
    pub const COLUMNS: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Author,
        SortKey::Comments,
        SortKey::Points,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "None",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Comments => "Comments",
            SortKey::Points => "Points",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub reverse: bool,
}

impl SortState {
    /// Clicking the active column flips direction; any other column becomes
    /// active in its natural direction.
    pub fn toggle(&mut self, column: SortKey) {
        self.reverse = self.key == column && !self.reverse;
        self.key = column;
    }

    /// Direction the projected list runs in. Comments and points descend
    /// unless reversed; text columns ascend unless reversed.
    pub fn is_ascending(&self) -> bool {
        match self.key {
            SortKey::Comments | SortKey::Points => self.reverse,
            SortKey::None | SortKey::Title | SortKey::Author => !self.reverse,
        }
    }
}

/// Orders an entry's hits for display without touching the entry.
///
/// Comments and points sort ascending and are then reversed, so their natural
/// order is descending and a reversed view of them is ascending again.
pub fn project(entry: Option<&SearchEntry>, state: SortState) -> Vec<StoryHit> {
    let Some(entry) = entry else {
        return Vec::new();
    };

    let mut list = entry.hits.clone();
    match state.key {
        SortKey::None => {}
        SortKey::Title => list.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Author => list.sort_by(|a, b| a.author.cmp(&b.author)),
        SortKey::Comments => {
            list.sort_by_key(|hit| hit.num_comments);
            list.reverse();
        }
        SortKey::Points => {
            list.sort_by_key(|hit| hit.points);
            list.reverse();
        }
    }

    if state.reverse {
        list.reverse();
    }
    list
}
