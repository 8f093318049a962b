use url::form_urlencoded;

/// A query parameter given more than once with different values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{name}' query parameter was given conflicting values")]
pub struct ConflictingParam {
    pub name: &'static str,
}

/// The decoded query string. Parsing never fails, so every malformed request
/// still gets a JSON reply from the handler.
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
        Params(pairs)
    }

    /// The value of `name`. Repeats are tolerated as long as they agree.
    pub fn single(&self, name: &'static str) -> Result<Option<&str>, ConflictingParam> {
        let mut values = self.0.iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str());

        let first = values.next();
        if values.any(|value| Some(value) != first) {
            return Err(ConflictingParam { name });
        }

        Ok(first)
    }
}
