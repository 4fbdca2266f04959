use std::collections::BTreeSet;

/// Languages a provider accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupportedLanguages {
    /// No explicit list; every tag is assumed supported
    Any,
    Listed(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCapability {
    pub languages: SupportedLanguages,
    /// Maximum characters accepted per call
    pub max_chars: usize,
    pub requires_credentials: bool,
}

impl ProviderCapability {
    pub fn any(max_chars: usize) -> Self {
        Self {
            languages: SupportedLanguages::Any,
            max_chars,
            requires_credentials: false,
        }
    }

    pub fn listed<I, S>(tags: I, max_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            languages: SupportedLanguages::Listed(
                tags.into_iter()
                    .map(|t| t.as_ref().to_ascii_lowercase())
                    .collect(),
            ),
            max_chars,
            requires_credentials: false,
        }
    }

    pub fn with_credentials(mut self) -> Self {
        self.requires_credentials = true;
        self
    }

    /// Whether the provider accepts `tag`. Matching is case-insensitive and
    /// falls back to the primary subtag (`zh-TW` is accepted when `zh` is).
    pub fn supports(&self, tag: &str) -> bool {
        let SupportedLanguages::Listed(set) = &self.languages else {
            return true;
        };

        let tag = tag.trim().to_ascii_lowercase();
        if set.contains(&tag) {
            return true;
        }
        tag.split(['-', '_'])
            .next()
            .is_some_and(|primary| set.contains(primary))
    }

    /// `auto` as a source is always accepted
    pub fn supports_pair(&self, from: &str, to: &str) -> bool {
        (from.eq_ignore_ascii_case("auto") || self.supports(from)) && self.supports(to)
    }
}
