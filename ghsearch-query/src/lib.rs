use thiserror::Error;

/// Users requested per page, in either direction.
pub const PAGE_SIZE: u32 = 12;

/// Which slice of the result set a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// First page, walking forward.
    First,
    /// The page after this cursor.
    After(String),
    /// The page before this cursor.
    Before(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub q: String,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("missing query parameter `q`")]
    MissingQuery,
}

/// GraphQL variables for one page of a user search.
/// Unset fields must be left out of the request entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variables {
    pub q: String,
    pub first: Option<u32>,
    pub after: Option<String>,
    pub last: Option<u32>,
    pub before: Option<String>,
}

impl SearchParams {
    /// Build params from already percent-decoded query pairs.
    /// Recognised keys: `q`, `next` (forward cursor), `prev` (backward cursor).
    /// - `q` is required and must not be blank.
    /// - Empty cursors count as absent.
    /// - `next` wins over `prev` when both are present.
    /// - Repeated keys: the last one wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut q: Option<String> = None;
        let mut next: Option<String> = None;
        let mut prev: Option<String> = None;
        for (k, v) in pairs {
            let slot = match k.as_ref() {
                "q" => &mut q,
                "next" => &mut next,
                "prev" => &mut prev,
                _ => continue,
            };
            *slot = Some(v.into());
        }

        let q = q.filter(|q| !q.trim().is_empty()).ok_or(ParamError::MissingQuery)?;
        let next = next.filter(|c| !c.is_empty());
        let prev = prev.filter(|c| !c.is_empty());
        let page = match (next, prev) {
            (Some(after), _) => Page::After(after),
            (None, Some(before)) => Page::Before(before),
            (None, None) => Page::First,
        };
        Ok(Self { q, page })
    }

    pub fn variables(&self) -> Variables {
        let mut vars = Variables { q: self.q.clone(), first: None, after: None, last: None, before: None };
        match &self.page {
            Page::First => vars.first = Some(PAGE_SIZE),
            Page::After(cursor) => {
                vars.first = Some(PAGE_SIZE);
                vars.after = Some(cursor.clone());
            }
            Page::Before(cursor) => {
                vars.last = Some(PAGE_SIZE);
                vars.before = Some(cursor.clone());
            }
        }
        vars
    }
}
