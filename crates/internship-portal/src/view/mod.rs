//! Page view controllers.
//!
//! Every list page follows the same lifecycle: fetch once on load, keep the result as a shadow
//! copy, render it to HTML, and re-render from the shadow copy on local filter or mutation
//! events. [`ListController`] owns that lifecycle; each page contributes a [`ListTemplate`]
//! describing its empty state and item markup.

pub mod admin_dashboard;
pub mod admin_internships;
pub mod applications;
pub mod catalog;
pub mod home;
pub mod layout;
pub mod markup;
pub mod student_dashboard;

use tracing::warn;

use crate::api::ApiResult;

/// Fixed banners shown in place of the list when loading fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBanners {
    /// Backend answered `ok: false`.
    pub rejected: &'static str,
    /// Backend never answered.
    pub unreachable: &'static str,
}

/// What happened to a page's initial fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Rejected(Option<String>),
    Unreachable,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Item markup for one list page.
pub trait ListTemplate {
    type Item;

    fn empty_state(&self) -> &str;

    fn render_item(&self, item: &Self::Item, out: &mut String);

    fn render_items(&self, items: &[&Self::Item], out: &mut String) {
        for item in items {
            self.render_item(item, out);
        }
    }
}

/// Render `items`, or the template's empty state when there are none.
pub fn render_list<T: ListTemplate + ?Sized>(template: &T, items: &[&T::Item]) -> String {
    if items.is_empty() {
        return template.empty_state().to_string();
    }
    let mut out = String::new();
    template.render_items(items, &mut out);
    out
}

/// Shadow copy plus the container markup rendered from it.
pub struct ListController<T: ListTemplate> {
    template: T,
    banners: LoadBanners,
    items: Option<Vec<T::Item>>,
    html: String,
}

impl<T: ListTemplate> ListController<T> {
    pub fn new(template: T, banners: LoadBanners) -> Self {
        Self {
            template,
            banners,
            items: None,
            html: String::new(),
        }
    }

    /// Take the result of the page's initial fetch.
    pub fn accept(&mut self, result: ApiResult<Vec<T::Item>>) -> LoadOutcome {
        match result {
            Ok(response) if response.ok => {
                let items = response.data.unwrap_or_default();
                let count = items.len();
                self.items = Some(items);
                self.render_all();
                LoadOutcome::Loaded(count)
            }
            Ok(response) => {
                warn!(error = ?response.error, "list load rejected by backend");
                self.items = None;
                self.html = self.banners.rejected.to_string();
                LoadOutcome::Rejected(response.error)
            }
            Err(err) => {
                warn!(error = %err, "list load failed");
                self.items = None;
                self.html = self.banners.unreachable.to_string();
                LoadOutcome::Unreachable
            }
        }
    }

    pub fn render_all(&mut self) {
        let visible: Vec<&T::Item> = self.items.iter().flatten().collect();
        self.html = render_list(&self.template, &visible);
    }

    /// Re-render the subset of the shadow copy matching `predicate`, in original order.
    pub fn render_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&T::Item) -> bool,
    {
        let visible: Vec<&T::Item> = self
            .items
            .iter()
            .flatten()
            .filter(|item| predicate(item))
            .collect();
        let count = visible.len();
        self.html = render_list(&self.template, &visible);
        count
    }

    pub fn items(&self) -> &[T::Item] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn items_mut(&mut self) -> &mut [T::Item] {
        self.items.as_deref_mut().unwrap_or(&mut [])
    }

    pub fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn template(&self) -> &T {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut T {
        &mut self.template
    }
}

/// A click captured by a list container: the control's `data-action` and `data-target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedClick {
    pub action: String,
    pub target: String,
}

impl DelegatedClick {
    pub fn new(action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("invalid target '{0}'")]
    InvalidTarget(String),
}
