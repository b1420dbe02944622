use crate::models::Story;

// All list state lives here and only changes through `reduce`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoriesState {
    pub items: Vec<Story>,
    pub is_loading: bool,
    pub is_error: bool,
    pub page: u32,
}

#[derive(Debug, Clone)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess { list: Vec<Story>, page: u32 },
    FetchFailure,
    Remove { id: String },
}

impl StoriesState {
    pub fn reduce(mut self, action: StoriesAction) -> Self {
        match action {
            StoriesAction::FetchInit => {
                self.is_loading = true;
                self.is_error = false;
                self
            }
            StoriesAction::FetchSuccess { list, page } => {
                self.is_loading = false;
                self.is_error = false;
                // Page 0 is a fresh search, anything later extends the list
                if page == 0 {
                    self.items = list;
                } else {
                    self.items.extend(list);
                }
                self.page = page;
                self
            }
            StoriesAction::FetchFailure => {
                self.is_loading = false;
                self.is_error = true;
                self
            }
            StoriesAction::Remove { id } => {
                self.items.retain(|story| story.id != id);
                self
            }
        }
    }
}
