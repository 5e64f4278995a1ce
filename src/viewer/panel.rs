use crate::catalog::{Catalog, Chapter};

/// Chapter side panel: open flag and the search box contents. Filtering
/// never touches the catalog itself.
#[derive(Debug, Default)]
pub struct ChapterPanel {
    open: bool,
    query: String,
}

impl ChapterPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    /// Chapters currently listed
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Chapter> {
        catalog.search(&self.query)
    }
}
