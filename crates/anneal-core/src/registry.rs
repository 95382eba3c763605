//! Variant registry and kind resolution
//!
//! A [`DataKind`] is the concrete behavior behind a scalar shape: its
//! default literal, whether an empty value is acceptable to an editing
//! surface, and (for custom variants) a normalizing parser. The
//! [`VariantRegistry`] maps variant tags to kinds; it is an explicit
//! object threaded through resolution rather than ambient global state,
//! and registration is first-wins so independent startup call sites can
//! race safely.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::codec;
use crate::parse::ParseResult;
use crate::structure::{ScalarKind, SimpleType, StructuredType, VariantTag};

/// Normalizing parser for a custom scalar variant.
///
/// Takes raw text, returns the canonical serialized form or an error,
/// the way a color kind turns `#ff00ff` into `0xFF00FF`.
pub type VariantParser = Arc<dyn Fn(&str) -> ParseResult<String> + Send + Sync>;

/// Concrete behavior of a scalar kind.
#[derive(Clone)]
pub struct DataKind {
    allows_empty: bool,
    default_literal: Cow<'static, str>,
    parser: Option<VariantParser>,
}

impl DataKind {
    /// Behavior for booleans.
    pub fn boolean() -> Self {
        Self {
            allows_empty: false,
            default_literal: Cow::Borrowed("false"),
            parser: None,
        }
    }

    /// Behavior for integers.
    pub fn integer() -> Self {
        Self {
            allows_empty: false,
            default_literal: Cow::Borrowed("0"),
            parser: None,
        }
    }

    /// Behavior for decimals.
    pub fn double() -> Self {
        Self {
            allows_empty: false,
            default_literal: Cow::Borrowed("0.0"),
            parser: None,
        }
    }

    /// Behavior for strings.
    pub fn string() -> Self {
        Self {
            allows_empty: true,
            default_literal: Cow::Borrowed(" "),
            parser: None,
        }
    }

    /// Behavior for enums.
    pub fn enumeration() -> Self {
        Self {
            allows_empty: true,
            default_literal: Cow::Borrowed(" "),
            parser: None,
        }
    }

    /// Behavior for a custom variant with a normalizing parser.
    pub fn custom(
        allows_empty: bool,
        default_literal: impl Into<String>,
        parser: VariantParser,
    ) -> Self {
        Self {
            allows_empty,
            default_literal: Cow::Owned(default_literal.into()),
            parser: Some(parser),
        }
    }

    /// Whether an editing surface may present an empty value.
    pub fn allows_empty(&self) -> bool {
        self.allows_empty
    }

    /// The literal used when a fresh value of this kind is synthesized.
    pub fn default_literal(&self) -> &str {
        &self.default_literal
    }

    /// Parse text through the variant parser, if one is attached.
    ///
    /// Kinds without a parser accept any text unchanged (string behavior).
    pub fn parse(&self, text: &str) -> ParseResult<String> {
        match &self.parser {
            Some(parser) => parser(text),
            None => ParseResult::success(text.to_string()),
        }
    }
}

impl fmt::Debug for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKind")
            .field("allows_empty", &self.allows_empty)
            .field("default_literal", &self.default_literal)
            .field("has_parser", &self.parser.is_some())
            .finish()
    }
}

/// Process-wide mapping from variant tags to their scalar behavior.
///
/// Constructed at startup and passed down through type resolution.
/// Registration is write-once-per-key, read-many.
#[derive(Debug, Default)]
pub struct VariantRegistry {
    kinds: RwLock<HashMap<VariantTag, DataKind>>,
}

impl VariantRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register behavior for a variant tag.
    ///
    /// The first registration for a tag wins; returns whether this call
    /// was the one that registered it.
    pub fn register(&self, tag: VariantTag, kind: DataKind) -> bool {
        let mut kinds = self.kinds.write();
        match kinds.entry(tag) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(kind);
                true
            }
            std::collections::hash_map::Entry::Occupied(_) => false,
        }
    }

    /// Resolve a simple shape to its concrete behavior.
    ///
    /// Unregistered custom tags fall back to string behavior. Resolution
    /// is idempotent and side-effect-free.
    ///
    /// Panics on a `Custom` kind declared without a variant tag; that is
    /// a static declaration bug, not user input.
    pub fn kind_of(&self, simple: &SimpleType) -> DataKind {
        if let Some(tag) = simple.variant_tag() {
            return self
                .kinds
                .read()
                .get(tag)
                .cloned()
                .unwrap_or_else(DataKind::string);
        }
        match simple.kind() {
            ScalarKind::Boolean => DataKind::boolean(),
            ScalarKind::Integer => DataKind::integer(),
            ScalarKind::Double => DataKind::double(),
            ScalarKind::String => DataKind::string(),
            ScalarKind::Enum => DataKind::enumeration(),
            ScalarKind::Custom => panic!("custom scalar declared without a variant tag"),
        }
    }

    /// Flatten a shape into the behaviors of all its leaf scalars.
    ///
    /// Compound flat-maps its field resolutions, a list resolves its
    /// element shape, a scalar is a singleton.
    pub fn resolve(&self, structure: &StructuredType) -> Vec<DataKind> {
        match structure {
            StructuredType::Simple(simple) => vec![self.kind_of(simple)],
            StructuredType::List(list) => self.resolve(list.element()),
            StructuredType::Compound(compound) => compound
                .fields()
                .iter()
                .flat_map(|field| self.resolve(field.structure()))
                .collect(),
        }
    }

    /// Synthesize the default serialized text for a shape.
    ///
    /// Scalars use their kind's default literal, lists start empty, and
    /// compounds merge the defaults of every field.
    pub fn generate_default(&self, structure: &StructuredType) -> String {
        match structure {
            StructuredType::Simple(simple) => self.kind_of(simple).default_literal().to_string(),
            StructuredType::List(_) => String::new(),
            StructuredType::Compound(compound) => codec::merge_layered(
                compound
                    .fields()
                    .iter()
                    .map(|field| self.generate_default(field.structure())),
            ),
        }
    }

    /// Check serialized text against a shape, by recursive descent.
    ///
    /// Lists check every element; compounds split (padding short input)
    /// and check each field, reporting the first field-level error.
    pub fn check_text(&self, structure: &StructuredType, text: &str) -> ParseResult<bool> {
        match structure {
            StructuredType::Simple(simple) => self.check_scalar(simple, text),
            StructuredType::List(list) => {
                for element in codec::split_layered(text) {
                    let result = self.check_text(list.element(), &element);
                    if result.has_error() {
                        return result;
                    }
                }
                ParseResult::success(true)
            }
            StructuredType::Compound(compound) => {
                let fields = codec::split_fields(text, compound.len());
                for (field, value) in compound.fields().iter().zip(&fields) {
                    let result = self.check_text(field.structure(), value);
                    if result.has_error() {
                        return result;
                    }
                }
                ParseResult::success(true)
            }
        }
    }

    fn check_scalar(&self, simple: &SimpleType, text: &str) -> ParseResult<bool> {
        match simple.effective_kind() {
            ScalarKind::Boolean => codec::parse_bool(text).map(|_| true),
            ScalarKind::Integer => codec::parse_int(text).map(|_| true),
            ScalarKind::Double => codec::parse_double(text).map(|_| true),
            ScalarKind::String => ParseResult::success(true),
            ScalarKind::Enum => codec::parse_enum(simple.constants(), text).map(|_| true),
            ScalarKind::Custom => self.kind_of(simple).parse(text).map(|_| true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseError;
    use crate::structure::{CompoundBuilder, ListType};

    fn color_parser() -> VariantParser {
        Arc::new(|text: &str| {
            let digits = text.trim().strip_prefix("0x").unwrap_or(text.trim());
            match u32::from_str_radix(digits, 16) {
                Ok(value) => ParseResult::success(format!("0x{value:06X}")),
                Err(_) => ParseResult::failure(ParseError::malformed("color", text)),
            }
        })
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = VariantRegistry::new();
        let tag = VariantTag::new("color");
        assert!(registry.register(tag.clone(), DataKind::custom(false, "0x000000", color_parser())));
        assert!(!registry.register(tag.clone(), DataKind::string()));

        let simple = SimpleType::variant(ScalarKind::Integer, tag);
        let kind = registry.kind_of(&simple);
        assert_eq!(kind.default_literal(), "0x000000");
        assert_eq!(kind.parse("ff00ff").value(), Some(&"0xFF00FF".to_string()));
    }

    #[test]
    fn test_unregistered_variant_falls_back_to_string() {
        let registry = VariantRegistry::new();
        let simple = SimpleType::variant(ScalarKind::Integer, VariantTag::new("unknown"));
        let kind = registry.kind_of(&simple);
        assert!(kind.allows_empty());
        assert!(kind.parse("anything").is_success());
    }

    #[test]
    fn test_resolve_flattens_leaves() {
        let registry = VariantRegistry::new();
        let mut builder = CompoundBuilder::new();
        builder.simple("Name", SimpleType::string()).finish();
        builder
            .list("Scores", StructuredType::Simple(SimpleType::integer()))
            .finish();
        let compound = StructuredType::Compound(builder.build());

        let kinds = registry.resolve(&compound);
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0].default_literal(), " ");
        assert_eq!(kinds[1].default_literal(), "0");
    }

    #[test]
    fn test_generate_default_recurses() {
        let registry = VariantRegistry::new();
        let mut builder = CompoundBuilder::new();
        builder.simple("Flag", SimpleType::boolean()).finish();
        builder.simple("Year", SimpleType::integer()).finish();
        let compound = StructuredType::Compound(builder.build());

        assert_eq!(registry.generate_default(&compound), "[false][0]");
        let list = StructuredType::List(ListType::new(compound));
        assert_eq!(registry.generate_default(&list), "");
    }

    #[test]
    fn test_check_text_reports_field_error() {
        let registry = VariantRegistry::new();
        let mut builder = CompoundBuilder::new();
        builder.simple("Name", SimpleType::string()).finish();
        builder.simple("Year", SimpleType::integer()).finish();
        let compound = StructuredType::Compound(builder.build());

        let good = codec::merge_layered(["Testing", "2000"]);
        assert!(registry.check_text(&compound, &good).is_success());

        let bad = codec::merge_layered(["Testing", "soon"]);
        let result = registry.check_text(&compound, &bad);
        assert!(result.has_error());
    }
}
