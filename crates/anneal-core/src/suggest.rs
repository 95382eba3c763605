//! Suggestion sources
//!
//! A [`Suggestion`] is a named candidate value offered to an editing
//! surface, separate from validation. Providers enumerate push-style so a
//! catalog-backed source can stream without building intermediate lists;
//! the filter lets the surface skip candidates it already knows are
//! illegal.

use serde::{Deserialize, Serialize};

use crate::structure::VariantTag;

/// A candidate value offered to an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Display name shown to the user.
    pub name: String,
    /// The serialized value the suggestion stands for.
    pub value: String,
    /// Variant identity of the value, when it is a custom scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantTag>,
}

impl Suggestion {
    /// A suggestion whose display name is its value.
    pub fn value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
            variant: None,
        }
    }

    /// A suggestion with a distinct display name.
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            variant: None,
        }
    }

    /// A suggestion tagged with the variant type of its value.
    pub fn typed(name: impl Into<String>, value: impl Into<String>, variant: VariantTag) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            variant: Some(variant),
        }
    }
}

/// Pluggable enumeration of recommended values for a node.
///
/// Enumeration may be arbitrarily expensive (a provider can be backed by
/// an external catalog); callers are free to cache the collected result.
pub trait SuggestionProvider: Send + Sync {
    /// Push every suggestion passing `filter` into `accept`.
    fn provide(&self, accept: &mut dyn FnMut(Suggestion), filter: &dyn Fn(&Suggestion) -> bool);
}

impl<F> SuggestionProvider for F
where
    F: Fn(&mut dyn FnMut(Suggestion), &dyn Fn(&Suggestion) -> bool) + Send + Sync,
{
    fn provide(&self, accept: &mut dyn FnMut(Suggestion), filter: &dyn Fn(&Suggestion) -> bool) {
        self(accept, filter)
    }
}

/// Provider over a fixed, pre-built suggestion list.
#[derive(Debug, Clone)]
pub struct StaticSuggestions(Vec<Suggestion>);

impl StaticSuggestions {
    /// Wrap a fixed list of suggestions.
    pub fn new(suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        Self(suggestions.into_iter().collect())
    }

    /// Provider over plain values, display name equal to the value.
    pub fn of_values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self(values.into_iter().map(Suggestion::value).collect())
    }
}

impl SuggestionProvider for StaticSuggestions {
    fn provide(&self, accept: &mut dyn FnMut(Suggestion), filter: &dyn Fn(&Suggestion) -> bool) {
        for suggestion in &self.0 {
            if filter(suggestion) {
                accept(suggestion.clone());
            }
        }
    }
}

/// Collect every suggestion from a set of providers into one list.
pub fn collect_suggestions(
    providers: &[std::sync::Arc<dyn SuggestionProvider>],
    filter: &dyn Fn(&Suggestion) -> bool,
) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for provider in providers {
        provider.provide(&mut |s| out.push(s), filter);
    }
    out
}
