use crate::models::Story;

// Case-insensitive substring match against the title. Pure; the caller
// recomputes this from the current items every frame.
pub fn filter_by_title(stories: &[Story], term: &str) -> Vec<Story> {
    if term.is_empty() {
        return stories.to_vec();
    }
    let needle = term.to_lowercase();
    stories
        .iter()
        .filter(|story| story.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    None,
    Title,
    Author,
    Comments,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortKey {
    // Text columns read naturally A-Z; score-like columns highest first
    fn default_order(self) -> SortOrder {
        match self {
            SortKey::None | SortKey::Title | SortKey::Author => SortOrder::Ascending,
            SortKey::Comments | SortKey::Points => SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::None,
            order: SortOrder::Ascending,
        }
    }
}

impl SortSpec {
    // Clicking the active column reverses it; picking another column
    // resets to that column's default order.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.order = match self.order {
                SortOrder::Ascending => SortOrder::Descending,
                SortOrder::Descending => SortOrder::Ascending,
            };
        } else {
            self.key = key;
            self.order = key.default_order();
        }
    }

    pub fn apply(&self, stories: &[Story]) -> Vec<Story> {
        let mut sorted = stories.to_vec();
        if self.key == SortKey::None {
            return sorted;
        }
        // Reverse the comparator rather than the vector so equal-key
        // stories stay in fetch order either way
        sorted.sort_by(|a, b| {
            let ordering = match self.key {
                SortKey::None => std::cmp::Ordering::Equal,
                SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortKey::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
                SortKey::Comments => a.num_comments.cmp(&b.num_comments),
                SortKey::Points => a.points.cmp(&b.points),
            };
            match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, title: &str, author: &str, num_comments: i64, points: i64) -> Story {
        Story {
            id: id.to_string(),
            url: String::new(),
            title: title.to_string(),
            author: author.to_string(),
            num_comments,
            points,
        }
    }

    #[test]
    fn filter_matches_substrings_case_insensitively() {
        let stories = vec![
            story("1", "React", "a", 0, 0),
            story("2", "Redux", "b", 0, 0),
        ];

        let hits = filter_by_title(&stories, "react");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "React");
    }

    #[test]
    fn empty_filter_matches_everything() {
        let stories = vec![
            story("1", "React", "a", 0, 0),
            story("2", "Redux", "b", 0, 0),
        ];

        assert_eq!(filter_by_title(&stories, "").len(), 2);
    }

    #[test]
    fn points_sort_defaults_to_descending() {
        let stories = vec![story("1", "a", "a", 0, 4), story("2", "b", "b", 0, 5)];

        let mut sort = SortSpec::default();
        sort.toggle(SortKey::Points);
        let sorted = sort.apply(&stories);
        assert_eq!(sorted[0].points, 5);
        assert_eq!(sorted[1].points, 4);
    }

    #[test]
    fn toggling_the_active_key_reverses_the_order() {
        let stories = vec![story("1", "a", "a", 0, 4), story("2", "b", "b", 0, 5)];

        let mut sort = SortSpec::default();
        sort.toggle(SortKey::Points);
        sort.toggle(SortKey::Points);
        assert_eq!(sort.order, SortOrder::Ascending);

        let sorted = sort.apply(&stories);
        assert_eq!(sorted[0].points, 4);
    }

    #[test]
    fn switching_keys_resets_to_that_keys_default() {
        let mut sort = SortSpec::default();
        sort.toggle(SortKey::Points);
        sort.toggle(SortKey::Points);
        assert_eq!(sort.order, SortOrder::Ascending);

        sort.toggle(SortKey::Comments);
        assert_eq!(sort.key, SortKey::Comments);
        assert_eq!(sort.order, SortOrder::Descending);

        sort.toggle(SortKey::Title);
        assert_eq!(sort.order, SortOrder::Ascending);
    }

    #[test]
    fn equal_keys_keep_fetch_order_in_both_directions() {
        let stories = vec![
            story("1", "a", "a", 0, 7),
            story("2", "b", "b", 0, 7),
            story("3", "c", "c", 0, 2),
        ];

        let mut sort = SortSpec::default();
        sort.toggle(SortKey::Points);
        let sorted = sort.apply(&stories);
        let ids: Vec<&str> = sorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        sort.toggle(SortKey::Points);
        let sorted = sort.apply(&stories);
        let ids: Vec<&str> = sorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let stories = vec![
            story("1", "zebra", "a", 0, 0),
            story("2", "Apple", "b", 0, 0),
            story("3", "mango", "c", 0, 0),
        ];

        let mut sort = SortSpec::default();
        sort.toggle(SortKey::Title);
        let sorted = sort.apply(&stories);
        let titles: Vec<&str> = sorted.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "mango", "zebra"]);
    }

    #[test]
    fn no_sort_key_keeps_fetch_order() {
        let stories = vec![story("1", "b", "b", 0, 1), story("2", "a", "a", 0, 2)];

        let sorted = SortSpec::default().apply(&stories);
        assert_eq!(sorted[0].id, "1");
        assert_eq!(sorted[1].id, "2");
    }
}
