//! Structured type descriptions
//!
//! A [`StructuredType`] describes the *shape* of a configuration value:
//! a simple scalar, a homogeneous list, or a compound record of named,
//! ordered fields. Shapes are immutable and cheap to clone; they drive
//! default synthesis, suggestion aggregation, and the recursive descent
//! used by serialization and validation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::suggest::SuggestionProvider;

/// The scalar kinds a simple value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `true` / `false`.
    Boolean,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point.
    Double,
    /// Free-form text.
    String,
    /// One of a fixed constant catalog.
    Enum,
    /// Behavior supplied by a registered variant.
    Custom,
}

impl ScalarKind {
    /// Kind name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "decimal",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Custom => "custom",
        }
    }
}

/// Type identity of a custom scalar variant.
///
/// Tags key the variant registry and travel with typed suggestions, so
/// they are plain comparable strings rather than compile-time types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantTag(String);

impl VariantTag {
    /// Create a tag from its canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag's canonical name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A simple scalar shape: a kind plus an optional variant identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleType {
    kind: ScalarKind,
    variant: Option<VariantTag>,
    constants: Vec<String>,
}

impl SimpleType {
    /// Boolean scalar.
    pub fn boolean() -> Self {
        Self {
            kind: ScalarKind::Boolean,
            variant: None,
            constants: Vec::new(),
        }
    }

    /// Integer scalar.
    pub fn integer() -> Self {
        Self {
            kind: ScalarKind::Integer,
            variant: None,
            constants: Vec::new(),
        }
    }

    /// Decimal scalar.
    pub fn double() -> Self {
        Self {
            kind: ScalarKind::Double,
            variant: None,
            constants: Vec::new(),
        }
    }

    /// Free-form string scalar.
    pub fn string() -> Self {
        Self {
            kind: ScalarKind::String,
            variant: None,
            constants: Vec::new(),
        }
    }

    /// Enum scalar over a constant catalog.
    pub fn enumeration<S: Into<String>>(constants: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind: ScalarKind::Enum,
            variant: None,
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Custom scalar resolved through the variant registry.
    ///
    /// `base` records the kind the variant is written as on disk (a color
    /// stored as an integer keeps `Integer` here).
    pub fn variant(base: ScalarKind, tag: VariantTag) -> Self {
        Self {
            kind: base,
            variant: Some(tag),
            constants: Vec::new(),
        }
    }

    /// The declared base kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// The kind resolution actually dispatches on: `Custom` when a
    /// variant identity is present, the base kind otherwise.
    pub fn effective_kind(&self) -> ScalarKind {
        if self.variant.is_some() {
            ScalarKind::Custom
        } else {
            self.kind
        }
    }

    /// The variant identity, for custom scalars.
    pub fn variant_tag(&self) -> Option<&VariantTag> {
        self.variant.as_ref()
    }

    /// The constant catalog, for enum scalars (empty otherwise).
    pub fn constants(&self) -> &[String] {
        &self.constants
    }
}

/// A homogeneous list shape.
#[derive(Clone)]
pub struct ListType {
    element: Box<StructuredType>,
    suggestions: Vec<Arc<dyn SuggestionProvider>>,
}

impl ListType {
    /// List of the given element shape.
    pub fn new(element: StructuredType) -> Self {
        Self {
            element: Box::new(element),
            suggestions: Vec::new(),
        }
    }

    /// Attach a suggestion provider for elements of this list.
    pub fn with_suggestions(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.suggestions.push(provider);
        self
    }

    /// The element shape.
    pub fn element(&self) -> &StructuredType {
        &self.element
    }

    /// Suggestion providers for elements.
    pub fn suggestions(&self) -> &[Arc<dyn SuggestionProvider>] {
        &self.suggestions
    }
}

impl fmt::Debug for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListType")
            .field("element", &self.element)
            .field("suggestions", &self.suggestions.len())
            .finish()
    }
}

/// One named field of a compound record.
#[derive(Clone)]
pub struct CompoundField {
    name: String,
    structure: StructuredType,
    comments: Vec<String>,
    suggestions: Vec<Arc<dyn SuggestionProvider>>,
    forced: bool,
}

impl CompoundField {
    /// The field name, unique within its compound.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's shape.
    pub fn structure(&self) -> &StructuredType {
        &self.structure
    }

    /// Comment lines attached to the field.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Suggestion providers for the field.
    pub fn suggestions(&self) -> &[Arc<dyn SuggestionProvider>] {
        &self.suggestions
    }

    /// Whether the suggestion set is the exhaustive set of legal values.
    pub fn forced_suggestions(&self) -> bool {
        self.forced
    }
}

impl fmt::Debug for CompoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundField")
            .field("name", &self.name)
            .field("structure", &self.structure)
            .field("forced", &self.forced)
            .finish()
    }
}

/// A fixed-schema record of named, ordered fields.
///
/// Field order is significant: it is the serialization order.
#[derive(Debug, Clone)]
pub struct CompoundType {
    fields: Vec<CompoundField>,
}

impl CompoundType {
    /// The fields in declaration order.
    pub fn fields(&self) -> &[CompoundField] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a declared field, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Look up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&CompoundField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Fluent builder for [`CompoundType`].
///
/// Each `simple`/`list`/`compound` call opens a field; `finish` on the
/// returned [`FieldBuilder`] commits it. Duplicate field names are a
/// declaration bug and panic at `build`.
#[derive(Debug, Default)]
pub struct CompoundBuilder {
    fields: Vec<CompoundField>,
}

impl CompoundBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a simple scalar field.
    pub fn simple(&mut self, name: impl Into<String>, simple: SimpleType) -> FieldBuilder<'_> {
        self.field(name, StructuredType::Simple(simple))
    }

    /// Open an enum field; its constants are auto-suggested.
    pub fn enums<S: Into<String> + Clone>(
        &mut self,
        name: impl Into<String>,
        constants: &[S],
    ) -> FieldBuilder<'_> {
        let simple = SimpleType::enumeration(constants.iter().cloned());
        let provider = Arc::new(crate::suggest::StaticSuggestions::of_values(
            constants.iter().cloned(),
        ));
        let mut builder = self.field(name, StructuredType::Simple(simple));
        builder.field.suggestions.push(provider);
        builder
    }

    /// Open a list field.
    pub fn list(&mut self, name: impl Into<String>, element: StructuredType) -> FieldBuilder<'_> {
        self.field(name, StructuredType::List(ListType::new(element)))
    }

    /// Open a nested compound field.
    pub fn compound(&mut self, name: impl Into<String>, inner: CompoundType) -> FieldBuilder<'_> {
        self.field(name, StructuredType::Compound(inner))
    }

    /// Open a field of an arbitrary shape.
    pub fn field(&mut self, name: impl Into<String>, structure: StructuredType) -> FieldBuilder<'_> {
        FieldBuilder {
            owner: &mut self.fields,
            field: CompoundField {
                name: name.into(),
                structure,
                comments: Vec::new(),
                suggestions: Vec::new(),
                forced: false,
            },
        }
    }

    /// Finish the record.
    ///
    /// Panics if two fields share a name; that is a static declaration
    /// bug, not user input.
    pub fn build(self) -> CompoundType {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                panic!("duplicate compound field name: {}", field.name);
            }
        }
        CompoundType {
            fields: self.fields,
        }
    }
}

/// In-progress field of a [`CompoundBuilder`].
pub struct FieldBuilder<'a> {
    owner: &'a mut Vec<CompoundField>,
    field: CompoundField,
}

impl FieldBuilder<'_> {
    /// Attach comment lines.
    pub fn comments<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.field.comments.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Attach a suggestion provider.
    pub fn suggestions(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.field.suggestions.push(provider);
        self
    }

    /// Mark the suggestion set as exhaustive.
    pub fn forced(mut self, forced: bool) -> Self {
        self.field.forced = forced;
        self
    }

    /// Commit the field to the record.
    pub fn finish(self) {
        self.owner.push(self.field);
    }
}

/// Discriminant of a structured shape or staged node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// A simple scalar.
    Simple,
    /// A homogeneous list.
    List,
    /// A fixed-schema record.
    Compound,
}

/// The shape of a configuration value.
#[derive(Debug, Clone)]
pub enum StructuredType {
    /// A simple scalar.
    Simple(SimpleType),
    /// A homogeneous list.
    List(ListType),
    /// A fixed-schema record.
    Compound(CompoundType),
}

impl StructuredType {
    /// This shape's discriminant.
    pub fn kind(&self) -> StructureKind {
        match self {
            Self::Simple(_) => StructureKind::Simple,
            Self::List(_) => StructureKind::List,
            Self::Compound(_) => StructureKind::Compound,
        }
    }

    /// The simple scalar description, when this is a scalar shape.
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            Self::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    /// The list description, when this is a list shape.
    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// The compound description, when this is a record shape.
    pub fn as_compound(&self) -> Option<&CompoundType> {
        match self {
            Self::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}
