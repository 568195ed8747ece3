/// One story as returned by the search API. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryHit {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub num_comments: u32,
    pub points: i64,
}

/// A single fetched page: the hits in upstream order plus the page index the
/// source reports for them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    pub hits: Vec<StoryHit>,
    pub page: u32,
}

/// Everything accumulated so far for one search term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchEntry {
    pub hits: Vec<StoryHit>,
    pub page: u32,
}

impl SearchEntry {
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

#[cfg(test)]
pub(crate) fn hit(id: &str, title: &str) -> StoryHit {
    StoryHit {
        id: id.to_string(),
        title: title.to_string(),
        author: String::new(),
        url: format!("https://example.com/{}", id),
        num_comments: 0,
        points: 0,
    }
}
