//! Static per-dataset addressing: namespace, alternate URI spellings, fetch template

use crate::config::DatasetConfig;

/// Immutable description of how one dataset names its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    /// URI prefix stripped to obtain local identifiers
    pub namespace: String,
    /// Alternate URI fragments; the local identifier follows the fragment
    pub matches: Vec<String>,
    /// Fetch URL template containing `{identifier}`
    pub fetch_template: String,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        fetch_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            matches: Vec::new(),
            fetch_template: fetch_template.into(),
        }
    }

    pub fn with_matches(mut self, matches: Vec<String>) -> Self {
        self.matches = matches;
        self
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(&config.name, &config.namespace, &config.fetch)
            .with_matches(config.matches.clone())
    }

    /// Local part of `uri` if this dataset owns it, `None` otherwise
    pub fn local_part(&self, uri: &str) -> Option<String> {
        if let Some(rest) = uri.strip_prefix(self.namespace.as_str()) {
            return non_empty(rest);
        }
        self.matches.iter().find_map(|fragment| {
            uri.find(fragment.as_str())
                .and_then(|at| non_empty(&uri[at + fragment.len()..]))
        })
    }

    /// Normalize an identifier (absolute or local) to local form.
    ///
    /// Absolute URIs this dataset does not own are reduced to their last
    /// path segment.
    pub fn to_local(&self, identifier: &str) -> String {
        let identifier = identifier.trim();
        if !is_absolute(identifier) {
            return identifier.trim_matches('/').to_string();
        }
        self.local_part(identifier)
            .unwrap_or_else(|| last_segment(identifier).to_string())
    }

    /// Fetch URL for a local identifier
    pub fn fetch_uri(&self, local: &str) -> String {
        self.fetch_template.replace("{identifier}", local)
    }
}

pub fn is_absolute(identifier: &str) -> bool {
    identifier.starts_with("http://") || identifier.starts_with("https://")
}

pub(crate) fn last_segment(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

fn non_empty(local: &str) -> Option<String> {
    let local = local.trim_matches('/');
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}
