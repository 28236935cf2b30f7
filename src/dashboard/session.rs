use crate::dashboard::pages::Page;
use crate::dashboard::*;

use survey_stats::{FilterSelection, SCALE_MAX, SCALE_MIN};

/// One of the three ways of filtering the respondents.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Dimension {
    Role,
    Function,
    Location,
}

impl Dimension {
    pub fn parse(s: &str) -> Option<Dimension> {
        match s {
            "role" | "roles" => Some(Dimension::Role),
            "function" | "functions" => Some(Dimension::Function),
            "location" | "locations" => Some(Dimension::Location),
            _ => None,
        }
    }
}

/// What one viewer is looking at: the page, the filters and the rating
/// that is singled out in the drill-down charts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Session {
    page: Page,
    selection: FilterSelection,
    focus: Option<u8>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Session {
        Session {
            page: Page::General,
            selection: FilterSelection::default(),
            focus: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Moves to another page. The filters and the focus do not carry over.
    pub fn select_page(&mut self, page: Page) {
        if page != self.page {
            debug!("select_page: {:?} -> {:?}, filters reset", self.page, page);
            self.page = page;
            self.clear();
        }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut Vec<String> {
        match dimension {
            Dimension::Role => &mut self.selection.roles,
            Dimension::Function => &mut self.selection.functions,
            Dimension::Location => &mut self.selection.locations,
        }
    }

    /// Adds a value to the filter, if not already there.
    pub fn select(&mut self, dimension: Dimension, value: &str) {
        let values = self.values_mut(dimension);
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    /// Adds the value when absent and removes it when present. Returns
    /// whether the value is selected afterwards.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) -> bool {
        let values = self.values_mut(dimension);
        match values.iter().position(|v| v == value) {
            Some(idx) => {
                values.remove(idx);
                false
            }
            None => {
                values.push(value.to_string());
                true
            }
        }
    }

    pub fn focus(&self) -> Option<u8> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<u8>) {
        self.focus = focus;
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.focus = None;
    }
}

/// Reads a rating to focus on: a value of the scale, or `none`.
pub fn parse_focus(s: &str) -> DResult<Option<u8>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match s.parse::<u8>() {
        Ok(v) if (SCALE_MIN..=SCALE_MAX).contains(&v) => Ok(Some(v)),
        _ => whatever!(
            "Invalid focus {:?}: expected a rating between {} and {}",
            s,
            SCALE_MIN,
            SCALE_MAX
        ),
    }
}
