use serde::{Deserialize, Deserializer, Serialize};

/// An entry of the investable universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRef {
    pub ticker: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub isin: Option<String>,
    #[serde(default, deserialize_with = "deserialize_label")]
    constraint_group: Option<String>,
}

impl InstrumentRef {
    /// Creates an instrument whose display name defaults to the ticker.
    #[must_use]
    pub fn new(ticker: impl Into<String>) -> Self {
        let ticker = ticker.into().trim().to_string();
        Self {
            name: ticker.clone(),
            ticker,
            isin: None,
            constraint_group: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.name = name.trim().to_string();
        }
        self
    }

    #[must_use]
    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = normalize(isin.into());
        self
    }

    /// Sets the constraint group. Blank labels mean "unconstrained".
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.constraint_group = normalize(group.into());
        self
    }

    /// Trimmed constraint group, `None` when unconstrained.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.constraint_group.as_deref()
    }

    /// ISIN or an empty string.
    #[must_use]
    pub fn isin_or_empty(&self) -> &str {
        self.isin.as_deref().unwrap_or("")
    }
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Applies the builder's trimming to deserialized labels.
fn deserialize_label<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(normalize))
}
