use std::fmt;

use url::form_urlencoded;

/// Filter dimensions understood by the page renderer, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Commercial,
    Statut,
    Client,
}

impl FilterKey {
    pub const ALL: [FilterKey; 3] = [FilterKey::Commercial, FilterKey::Statut, FilterKey::Client];

    pub fn param(self) -> &'static str {
        match self {
            FilterKey::Commercial => "commercial",
            FilterKey::Statut => "statut",
            FilterKey::Client => "client",
        }
    }

    pub fn from_param(name: &str) -> Option<Self> {
        FilterKey::ALL.into_iter().find(|k| k.param() == name)
    }
}

/// User chosen filter values. Empty values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    commercial: Option<String>,
    statut: Option<String>,
    client: Option<String>,
}

impl FilterSelection {
    fn slot(&mut self, key: FilterKey) -> &mut Option<String> {
        match key {
            FilterKey::Commercial => &mut self.commercial,
            FilterKey::Statut => &mut self.statut,
            FilterKey::Client => &mut self.client,
        }
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        *self.slot(key) = (!value.is_empty()).then_some(value);
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Commercial => self.commercial.as_deref(),
            FilterKey::Statut => self.statut.as_deref(),
            FilterKey::Client => self.client.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// `application/x-www-form-urlencoded` query without the leading `?`.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for key in FilterKey::ALL {
            if let Some(value) = self.get(key) {
                serializer.append_pair(key.param(), value);
            }
        }
        serializer.finish()
    }

    /// Read the known filter parameters of a query. Unknown parameters are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut selection = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Some(key) = FilterKey::from_param(&name) {
                selection.set(key, value.into_owned());
            }
        }
        selection
    }
}

/// Address of the current page: the data path plus its query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query: String = query.into();
        Self {
            path: path.into(),
            query: query.strip_prefix('?').unwrap_or(&query).to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection::from_query(&self.query)
    }

    /// Same path, new filters. The caller reloads the page for the result.
    pub fn apply_filters(&self, selection: &FilterSelection) -> Location {
        Location::new(self.path.clone(), selection.to_query())
    }

    pub fn reset_filters(&self) -> Location {
        Location::new(self.path.clone(), "")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}
