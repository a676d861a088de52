//! Combobox navigation for search-and-create menus (tag picker, source
//! picker, open-tabs menu).
//!
//! Mutually exclusive with the roving tab index: while a combobox menu is open
//! it owns the arrow/enter/escape keys.

use regex::RegexBuilder;

use crate::types::object::SourceEntry;
use crate::types::tab::Tab;

/// Text a combobox row is filtered and matched by.
pub trait ComboboxItem {
    fn label(&self) -> &str;
}

impl ComboboxItem for String {
    fn label(&self) -> &str {
        self
    }
}

impl ComboboxItem for SourceEntry {
    fn label(&self) -> &str {
        &self.title
    }
}

impl ComboboxItem for Tab {
    fn label(&self) -> &str {
        &self.title
    }
}

/// How an existing item suppresses the "create new" row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMatch {
    /// Only an item whose label equals the query (ignoring case).
    #[default]
    Exact,
    /// Any item whose label contains the query (ignoring case).
    Substring,
}

/// What a submit resolved to.
#[derive(Debug, PartialEq)]
pub enum ComboboxSubmit<'a, T> {
    Item { index: usize, item: &'a T },
    Create(String),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct Combobox<T> {
    items: Vec<T>,
    query: String,
    filtered: Vec<usize>,
    index: Option<usize>,
    allow_create: bool,
    create_match: CreateMatch,
    open: bool,
}

impl<T: ComboboxItem> Combobox<T> {
    pub fn new(items: Vec<T>, allow_create: bool) -> Self {
        let mut combobox = Self {
            items,
            query: String::new(),
            filtered: Vec::new(),
            index: None,
            allow_create,
            create_match: CreateMatch::default(),
            open: true,
        };
        combobox.refilter();
        combobox
    }

    pub fn with_create_match(mut self, create_match: CreateMatch) -> Self {
        self.create_match = create_match;
        self.refilter();
        self
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    /// Updates the query, refilters, and clamps the highlighted row.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> Vec<&T> {
        self.filtered.iter().map(|&i| &self.items[i]).collect()
    }

    pub fn result_count(&self) -> usize {
        self.filtered.len()
    }

    /// Rows in the menu: filtered results plus the create row when offered.
    pub fn row_count(&self) -> usize {
        self.filtered.len() + usize::from(self.can_create())
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_index_selected(&self, index: usize) -> bool {
        self.index == Some(index)
    }

    pub fn is_create_row_highlighted(&self) -> bool {
        self.can_create() && self.index == Some(self.filtered.len())
    }

    /// True iff the query is non-empty and no item matches it per the
    /// configured [`CreateMatch`].
    pub fn can_create(&self) -> bool {
        if !self.allow_create || self.query.is_empty() {
            return false;
        }
        match self.create_match {
            CreateMatch::Exact => {
                let query = self.query.to_lowercase();
                !self
                    .items
                    .iter()
                    .any(|item| item.label().to_lowercase() == query)
            }
            CreateMatch::Substring => self.filtered.is_empty(),
        }
    }

    fn refilter(&mut self) {
        self.filtered = if self.query.is_empty() {
            (0..self.items.len()).collect()
        } else {
            let pattern = RegexBuilder::new(&regex::escape(&self.query))
                .case_insensitive(true)
                .build();
            match pattern {
                Ok(re) => (0..self.items.len())
                    .filter(|&i| re.is_match(self.items[i].label()))
                    .collect(),
                Err(_) => {
                    let query = self.query.to_lowercase();
                    (0..self.items.len())
                        .filter(|&i| self.items[i].label().to_lowercase().contains(&query))
                        .collect()
                }
            }
        };
        self.clamp();
    }

    fn clamp(&mut self) {
        let rows = self.row_count();
        self.index = if rows == 0 {
            None
        } else {
            Some(self.index.unwrap_or(0).min(rows - 1))
        };
    }

    pub fn move_down(&mut self) -> Option<usize> {
        let rows = self.row_count();
        if rows == 0 {
            return None;
        }
        self.index = Some(match self.index {
            Some(i) => (i + 1).min(rows - 1),
            None => 0,
        });
        self.index
    }

    pub fn move_up(&mut self) -> Option<usize> {
        if self.row_count() == 0 {
            return None;
        }
        self.index = Some(self.index.map_or(0, |i| i.saturating_sub(1)));
        self.index
    }

    /// Highlights a row directly (pointer hover).
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.row_count() {
            return false;
        }
        self.index = Some(index);
        true
    }

    pub fn submit(&self) -> ComboboxSubmit<'_, T> {
        let Some(index) = self.index else {
            return ComboboxSubmit::Nothing;
        };
        if let Some(&item_index) = self.filtered.get(index) {
            return ComboboxSubmit::Item {
                index,
                item: &self.items[item_index],
            };
        }
        if self.can_create() && index == self.filtered.len() {
            return ComboboxSubmit::Create(self.query.clone());
        }
        ComboboxSubmit::Nothing
    }

    /// Runs `on_item` or `on_create` for the highlighted row.
    pub fn submit_with<I, C>(&self, on_item: I, on_create: C) -> bool
    where
        I: FnOnce(&T),
        C: FnOnce(&str),
    {
        match self.submit() {
            ComboboxSubmit::Item { item, .. } => {
                on_item(item);
                true
            }
            ComboboxSubmit::Create(query) => {
                on_create(&query);
                true
            }
            ComboboxSubmit::Nothing => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the menu without submitting. Returns whether it was open; the
    /// caller decides where focus goes next.
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        was_open
    }
}

/// Normalises typed tag names: whitespace becomes `-`, anything outside
/// `[A-Za-z0-9_-]` is dropped.
pub fn normalize_tag_query(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}
