use crate::api::models::{Charity, CharityKey};

/// Case-insensitive substring filter on charity names, in catalog order.
/// An empty term matches everything.
pub fn filter_catalog(catalog: &[Charity], term: &str) -> Vec<Charity> {
    if term.is_empty() {
        return catalog.to_vec();
    }

    let needle = term.to_lowercase();
    catalog
        .iter()
        .filter(|charity| charity.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// What the charity list shows: the selection, the search box and the rows
/// that survive the search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected: Option<CharityKey>,
    pub search_term: String,
    pub visible: Vec<Charity>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&mut self, term: &str, catalog: &[Charity]) {
        self.search_term = term.to_string();
        self.refresh(catalog);
    }

    /// Recomputes the visible rows after the catalog changed.
    pub fn refresh(&mut self, catalog: &[Charity]) {
        self.visible = filter_catalog(catalog, &self.search_term);
    }

    pub fn is_selected(&self, charity: &Charity) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|key| key.as_str() == charity.name)
    }
}
