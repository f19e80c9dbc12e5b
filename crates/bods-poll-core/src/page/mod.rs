//! The page a widget is mounted on.
//!
//! Widgets read the current page URL for two things: the `tab` query
//! parameter, which decides whether a "View" link accompanies a terminal
//! badge, and the page path the link is built from.

use reqwest::Url;

use crate::http::HttpError;

pub const TAB_PARAM: &str = "tab";
pub const ACTIVE_TAB: &str = "active";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    url: Url,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(url: &str) -> Result<Self, HttpError> {
        Url::parse(url)
            .map(Self::new)
            .map_err(|e| HttpError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The `tab` query parameter, treating an empty value as absent.
    pub fn tab(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == TAB_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// Only the active tab gets a separate "View" link; on other tabs the
    /// dataset name itself is the link.
    pub fn shows_view_link(&self) -> bool {
        self.tab().is_none_or(|tab| tab == ACTIVE_TAB)
    }

    /// Review link for a dataset listed on this page, if one should be shown.
    pub fn view_link(&self, dataset_id: &str) -> Option<String> {
        self.shows_view_link()
            .then(|| format!("{}{}/update/review", self.url.path(), dataset_id))
    }
}
