//! Immutable route values.
//!
//! A [`Route`] is the path, fragment and query string of a request, without
//! scheme or host. Two routes are equal when their segment lists are equal:
//! the segments are taken from `path + "#" + fragment`, so `/a/b/` and `/a/b`
//! are the same route while `/a#b` and `/a/b` are not. The query string never
//! takes part in equality.

use {
    crate::{Error, Result},
    serde::{Deserialize, Serialize},
    std::{
        fmt,
        hash::{Hash, Hasher},
        str::FromStr,
        sync::LazyLock,
    },
    url::Url,
};

static ROOT: LazyLock<Route> = LazyLock::new(|| Route {
    path: "/".into(),
    fragment: None,
    query: None,
});

/// A request route: path, optional fragment and optional query string.
///
/// ```
/// use axum_entrypoint::Route;
///
/// let route: Route = "/docs/intro?lang=de#setup".parse().unwrap();
/// assert_eq!(route.path(), "/docs/intro");
/// assert_eq!(route.fragment(), Some("setup"));
/// assert_eq!(route.query(), Some("lang=de"));
/// assert_eq!(route.segments(), vec!["docs", "intro#setup"]);
/// assert_eq!(route.to_string(), "/docs/intro?lang=de#setup");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    path: String,
    fragment: Option<String>,
    query: Option<String>,
}

impl Route {
    /// The root route `/`.
    pub fn root() -> Route {
        ROOT.clone()
    }

    /// Parses a route from a string. Absolute URLs are accepted and reduced
    /// to their path, query and fragment.
    pub fn parse(input: &str) -> Result<Route> {
        let input = input.trim();
        if has_scheme(input) {
            let url = Url::parse(input)?;
            return Ok(Route::from_url(&url));
        }

        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (input, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        if path.contains(char::is_whitespace) {
            return Err(Error::invalid_route(format!(
                "route path must not contain whitespace: \"{input}\""
            )));
        }

        Ok(Route {
            path: normalize_path(path),
            fragment: fragment.filter(|f| !f.is_empty()).map(Into::into),
            query: query.filter(|q| !q.is_empty()).map(Into::into),
        })
    }

    /// Builds a route from the path, query and fragment of an absolute URL.
    pub fn from_url(url: &Url) -> Route {
        Route {
            path: normalize_path(url.path()),
            fragment: url.fragment().filter(|f| !f.is_empty()).map(Into::into),
            query: url.query().filter(|q| !q.is_empty()).map(Into::into),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Path and fragment, e.g. `/docs/intro#setup`. This is the string the
    /// route-map matcher consumes prefixes from.
    pub fn routename(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{}", self.path, fragment),
            None => self.path.clone(),
        }
    }

    /// The route sections (path + fragment) used for equality.
    pub fn segments(&self) -> Vec<String> {
        let routename = self.routename();
        let mut segments: Vec<String> = routename[1..].split('/').map(Into::into).collect();
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        segments
    }

    pub fn is_root(&self) -> bool {
        self.segments().is_empty()
    }

    /// Appends `child` below this route. The child's fragment wins; without
    /// one the parent's fragment is kept. The parent's query is kept.
    pub fn child_route(&self, child: &Route) -> Route {
        let mut path = self.path.trim_end_matches('/').to_string();
        let child_path = child.path.trim_start_matches('/');
        path.push('/');
        path.push_str(child_path);

        Route {
            path: normalize_path(&path),
            fragment: child.fragment.clone().or_else(|| self.fragment.clone()),
            query: self.query.clone(),
        }
    }

    /// Removes the first occurrence of `consumed` from the routename and
    /// returns what is left as a route (root when nothing is left).
    pub(crate) fn without_literal(&self, consumed: &str) -> Route {
        let routename = self.routename();
        let remaining = match (consumed.is_empty(), routename.find(consumed)) {
            (false, Some(idx)) => {
                format!("{}{}", &routename[..idx], &routename[idx + consumed.len()..])
            }
            _ => routename,
        };

        let mut route = Route::parse(&remaining).unwrap_or_else(|_| Route::root());
        route.query = self.query.clone();
        route
    }
}

fn has_scheme(input: &str) -> bool {
    match input.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');
    let mut previous_slash = true;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        normalized.push(c);
    }
    normalized
}

impl Default for Route {
    fn default() -> Self {
        Route::root()
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.segments() == other.segments()
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments().hash(state);
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({self})")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Route::parse(s)
    }
}

impl TryFrom<String> for Route {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Route::parse(&value)
    }
}

impl TryFrom<&str> for Route {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self> {
        Route::parse(value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.to_string()
    }
}
