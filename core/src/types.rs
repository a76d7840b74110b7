//! Type model definitions consumed by the schema engine.
//!
//! This module defines the data model a reflection layer exports for each
//! source type. The types are designed for serialization with [`serde`] so a
//! model can be produced by any host tool and round-trip through JSON or
//! YAML before it reaches the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the type model file format (semver).
///
/// Embedded in every [`TypeModelPackage`](crate::TypeModelPackage) to track
/// compatibility between exporters and the engine.
pub const MODEL_FORMAT_VERSION: &str = "1.0.0";

/// Scalar JSON Schema type a primitive source type maps to.
///
/// # Examples
///
/// ```
/// use typeschema_core::PrimitiveType;
///
/// assert_eq!(PrimitiveType::Integer.schema_type(), "integer");
/// let parsed: PrimitiveType = serde_json::from_str("\"boolean\"").unwrap();
/// assert_eq!(parsed, PrimitiveType::Boolean);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// Text, characters, and anything rendered as a JSON string.
    String,
    /// Whole numbers of any width.
    Integer,
    /// Floating point and decimal numbers.
    Number,
    /// `true` / `false`.
    Boolean,
}

impl PrimitiveType {
    /// Returns the JSON Schema `type` keyword value.
    pub fn schema_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Scalar value carried by a key/value override.
///
/// Deserializes from a bare JSON scalar (`true`, `10`, `"text"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InjectValue {
    /// Boolean override value.
    Bool(bool),
    /// Integer override value.
    Int(i64),
    /// String override value.
    String(String),
}

impl InjectValue {
    /// Converts the value to a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

/// One key/value override.
///
/// `path` is a slash-separated key path relative to the node the override is
/// attached to, so `"items/minLength"` addresses a nested keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectPair {
    /// Slash-separated key path.
    pub path: String,
    /// Value written at `path`.
    pub value: InjectValue,
}

/// User-declared schema overrides for a type or member.
///
/// The three forms are applied in a fixed order on top of the generated
/// node: the raw JSON fragment, then each key/value pair in declaration
/// order, then the supplier output.
///
/// # Examples
///
/// ```
/// use typeschema_core::OverrideDeclaration;
///
/// let decl = OverrideDeclaration::new()
///     .with_json(r#"{"minLength": 3}"#)
///     .with_int("maxLength", 10)
///     .with_supplier("username-pattern");
///
/// assert_eq!(decl.pairs.len(), 1);
/// assert!(!decl.is_empty());
/// assert!(OverrideDeclaration::new().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideDeclaration {
    /// Raw JSON object text merged first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    /// Key/value overrides merged after the raw JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<InjectPair>,
    /// Name of a registered supplier whose output is merged last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl OverrideDeclaration {
    /// Creates an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw JSON fragment.
    pub fn with_json(mut self, json: &str) -> Self {
        self.json = Some(json.to_string());
        self
    }

    /// Appends a string-valued override.
    pub fn with_string(self, path: &str, value: &str) -> Self {
        self.with_pair(path, InjectValue::String(value.to_string()))
    }

    /// Appends an integer-valued override.
    pub fn with_int(self, path: &str, value: i64) -> Self {
        self.with_pair(path, InjectValue::Int(value))
    }

    /// Appends a boolean-valued override.
    pub fn with_bool(self, path: &str, value: bool) -> Self {
        self.with_pair(path, InjectValue::Bool(value))
    }

    /// Sets the supplier reference.
    pub fn with_supplier(mut self, name: &str) -> Self {
        self.supplier = Some(name.to_string());
        self
    }

    /// Returns `true` when no override form is declared.
    pub fn is_empty(&self) -> bool {
        self.json.is_none() && self.pairs.is_empty() && self.supplier.is_none()
    }

    fn with_pair(mut self, path: &str, value: InjectValue) -> Self {
        self.pairs.push(InjectPair {
            path: path.to_string(),
            value,
        });
        self
    }
}

/// Field of an object type.
///
/// # Examples
///
/// ```
/// use typeschema_core::MemberDescriptor;
///
/// let age = MemberDescriptor::required("age", "int");
/// assert!(!age.nullable);
///
/// let name = MemberDescriptor::nullable("name", "java.lang.String")
///     .with_description("Display name");
/// assert!(name.nullable);
/// assert_eq!(name.description.as_deref(), Some("Display name"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Property name as it appears in instances.
    pub name: String,
    /// Identity of the declared type.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the member may be absent or null.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Optional property title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional property description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Optional `format` keyword (e.g. `date-time`, `email`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Member-level overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OverrideDeclaration>,
}

fn default_nullable() -> bool {
    true
}

impl MemberDescriptor {
    /// Creates a non-nullable member.
    pub fn required(name: &str, type_ref: &str) -> Self {
        Self {
            name: name.to_string(),
            type_ref: type_ref.to_string(),
            nullable: false,
            title: None,
            description: None,
            default: None,
            format: None,
            overrides: None,
        }
    }

    /// Creates a nullable member.
    pub fn nullable(name: &str, type_ref: &str) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, type_ref)
        }
    }

    /// Adds a title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Adds a `format` keyword.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Attaches member-level overrides.
    pub fn with_overrides(mut self, overrides: OverrideDeclaration) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// How a discriminator value is derived when a subtype entry omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminatorStrategy {
    /// Use the subtype's simple name (the default).
    #[default]
    Name,
    /// Use the subtype's full identity.
    Class,
}

/// One concrete subtype of a polymorphic root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeEntry {
    /// Identity of the subtype.
    pub subtype: String,
    /// Discriminator value; derived from the strategy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Polymorphism metadata of a hierarchy root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polymorphism {
    /// Discriminator property name (e.g. `"type"`, `"kind"`).
    pub property: String,
    /// Strategy for subtypes that carry no explicit value.
    #[serde(default)]
    pub strategy: DiscriminatorStrategy,
    /// Concrete subtypes in declaration order.
    #[serde(default)]
    pub subtypes: Vec<SubtypeEntry>,
}

impl Polymorphism {
    /// Resolves the discriminator value for a subtype entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeschema_core::{DiscriminatorStrategy, Polymorphism, SubtypeEntry};
    ///
    /// let poly = Polymorphism {
    ///     property: "kind".into(),
    ///     strategy: DiscriminatorStrategy::Name,
    ///     subtypes: vec![SubtypeEntry { subtype: "zoo.Cat".into(), value: None }],
    /// };
    /// assert_eq!(poly.value_for(&poly.subtypes[0]), "Cat");
    /// ```
    pub fn value_for(&self, entry: &SubtypeEntry) -> String {
        if let Some(value) = &entry.value {
            return value.clone();
        }
        match self.strategy {
            DiscriminatorStrategy::Name => simple_name(&entry.subtype),
            DiscriminatorStrategy::Class => entry.subtype.clone(),
        }
    }
}

/// Description of one source type.
///
/// Category signals are independent fields; a descriptor may carry several
/// (an object that is also a polymorphic root) and the engine's classifier
/// resolves them by precedence. Type references are identities resolved
/// through a [`TypeGraph`](crate::TypeGraph).
///
/// # Examples
///
/// ```
/// use typeschema_core::{MemberDescriptor, PrimitiveType, TypeDescriptor};
///
/// let person = TypeDescriptor::object("com.example.Person")
///     .with_member(MemberDescriptor::nullable("name", "string"))
///     .with_member(MemberDescriptor::required("age", "integer"));
/// assert_eq!(person.simple_name(), "Person");
/// assert_eq!(person.members.as_ref().map(Vec::len), Some(2));
///
/// let text = TypeDescriptor::primitive("string", PrimitiveType::String);
/// assert_eq!(text.primitive, Some(PrimitiveType::String));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Stable identity: fully qualified name plus resolved generic arguments.
    pub identity: String,
    /// Primitive signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<PrimitiveType>,
    /// Enum signal: constant names in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_constants: Option<Vec<String>>,
    /// Collection signal: element type identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Collection elements are unique (set semantics).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    /// Map signal: value type identity (keys are string-like).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_value: Option<String>,
    /// Object signal: members in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MemberDescriptor>>,
    /// Polymorphic root signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polymorphism: Option<Polymorphism>,
    /// Nullable wrapper signal: identity of the wrapped type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_of: Option<String>,
    /// Optional title for the generated schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description for the generated schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type-level overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OverrideDeclaration>,
}

impl TypeDescriptor {
    fn with_identity(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            ..Default::default()
        }
    }

    /// Creates a primitive type.
    pub fn primitive(identity: &str, primitive: PrimitiveType) -> Self {
        Self {
            primitive: Some(primitive),
            ..Self::with_identity(identity)
        }
    }

    /// Creates an enum type from constant names in declaration order.
    pub fn enumeration<I, S>(identity: &str, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_constants: Some(constants.into_iter().map(Into::into).collect()),
            ..Self::with_identity(identity)
        }
    }

    /// Creates a list-like collection type.
    pub fn collection(identity: &str, element: &str) -> Self {
        Self {
            element: Some(element.to_string()),
            ..Self::with_identity(identity)
        }
    }

    /// Creates a set-like collection type (unique elements).
    pub fn set(identity: &str, element: &str) -> Self {
        Self {
            unique_items: true,
            ..Self::collection(identity, element)
        }
    }

    /// Creates a map type with string-like keys.
    pub fn map(identity: &str, value: &str) -> Self {
        Self {
            map_value: Some(value.to_string()),
            ..Self::with_identity(identity)
        }
    }

    /// Creates an object type with no members.
    pub fn object(identity: &str) -> Self {
        Self {
            members: Some(Vec::new()),
            ..Self::with_identity(identity)
        }
    }

    /// Creates a polymorphic root with a discriminator property and no
    /// subtypes yet.
    pub fn polymorphic(identity: &str, property: &str) -> Self {
        Self {
            polymorphism: Some(Polymorphism {
                property: property.to_string(),
                strategy: DiscriminatorStrategy::default(),
                subtypes: Vec::new(),
            }),
            ..Self::with_identity(identity)
        }
    }

    /// Creates a nullable wrapper around another type.
    pub fn optional(identity: &str, inner: &str) -> Self {
        Self {
            optional_of: Some(inner.to_string()),
            ..Self::with_identity(identity)
        }
    }

    /// Appends a member, turning the descriptor into an object if needed.
    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.get_or_insert_with(Vec::new).push(member);
        self
    }

    /// Appends a subtype with an explicit discriminator value.
    ///
    /// Has no effect unless the descriptor is a polymorphic root.
    pub fn with_subtype(mut self, subtype: &str, value: &str) -> Self {
        if let Some(poly) = self.polymorphism.as_mut() {
            poly.subtypes.push(SubtypeEntry {
                subtype: subtype.to_string(),
                value: Some(value.to_string()),
            });
        }
        self
    }

    /// Sets the discriminator strategy of a polymorphic root.
    pub fn with_strategy(mut self, strategy: DiscriminatorStrategy) -> Self {
        if let Some(poly) = self.polymorphism.as_mut() {
            poly.strategy = strategy;
        }
        self
    }

    /// Adds a title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Attaches type-level overrides.
    pub fn with_overrides(mut self, overrides: OverrideDeclaration) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Returns the identity with every package qualifier stripped.
    pub fn simple_name(&self) -> String {
        simple_name(&self.identity)
    }

    /// Returns `true` when the descriptor carries at least one category
    /// signal.
    pub fn has_signal(&self) -> bool {
        self.primitive.is_some()
            || self.enum_constants.is_some()
            || self.element.is_some()
            || self.map_value.is_some()
            || self.members.is_some()
            || self.polymorphism.is_some()
            || self.optional_of.is_some()
    }

    /// Returns every identity this descriptor refers to, in a stable order.
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let Some(inner) = &self.optional_of {
            refs.push(inner.as_str());
        }
        if let Some(element) = &self.element {
            refs.push(element.as_str());
        }
        if let Some(value) = &self.map_value {
            refs.push(value.as_str());
        }
        if let Some(members) = &self.members {
            refs.extend(members.iter().map(|m| m.type_ref.as_str()));
        }
        if let Some(poly) = &self.polymorphism {
            refs.extend(poly.subtypes.iter().map(|s| s.subtype.as_str()));
        }
        refs
    }
}

/// Strips package qualifiers from every segment of a type identity.
///
/// Generic arguments are kept and simplified too.
///
/// # Examples
///
/// ```
/// use typeschema_core::simple_name;
///
/// assert_eq!(simple_name("com.example.Person"), "Person");
/// assert_eq!(
///     simple_name("java.util.Map<java.lang.String, com.x.Foo>"),
///     "Map<String, Foo>"
/// );
/// assert_eq!(simple_name("integer"), "integer");
/// ```
pub fn simple_name(identity: &str) -> String {
    let mut out = String::with_capacity(identity.len());
    let mut segment = String::new();

    let flush = |segment: &mut String, out: &mut String| {
        let tail = segment.rsplit('.').next().unwrap_or_default();
        out.push_str(tail);
        segment.clear();
    };

    for ch in identity.chars() {
        if matches!(ch, '<' | '>' | ',' | ' ' | '[' | ']') {
            flush(&mut segment, &mut out);
            out.push(ch);
        } else {
            segment.push(ch);
        }
    }
    flush(&mut segment, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name_strips_nested_generic_packages() {
        assert_eq!(
            simple_name("com.example.Page<com.example.Wrapper<com.example.User>>"),
            "Page<Wrapper<User>>"
        );
        assert_eq!(simple_name("Outer$Inner"), "Outer$Inner");
    }

    #[test]
    fn test_member_deserializes_nullable_by_default() {
        let member: MemberDescriptor =
            serde_json::from_str(r#"{"name": "nick", "type": "string"}"#).unwrap();
        assert!(member.nullable);
        assert_eq!(member.type_ref, "string");
    }

    #[test]
    fn test_inject_value_deserializes_scalars() {
        let pairs: Vec<InjectPair> = serde_json::from_str(
            r#"[{"path": "a", "value": true}, {"path": "b", "value": 10}, {"path": "c", "value": "x"}]"#,
        )
        .unwrap();
        assert_eq!(pairs[0].value, InjectValue::Bool(true));
        assert_eq!(pairs[1].value, InjectValue::Int(10));
        assert_eq!(pairs[2].value, InjectValue::String("x".to_string()));
    }

    #[test]
    fn test_with_member_promotes_to_object() {
        let desc = TypeDescriptor::default().with_member(MemberDescriptor::required("id", "int"));
        assert!(desc.members.is_some());
        assert!(desc.has_signal());
    }

    #[test]
    fn test_with_subtype_ignored_without_polymorphism() {
        let desc = TypeDescriptor::object("a.B").with_subtype("a.C", "c");
        assert!(desc.polymorphism.is_none());
    }

    #[test]
    fn test_value_for_class_strategy_uses_identity() {
        let root = TypeDescriptor::polymorphic("zoo.Animal", "@class")
            .with_strategy(DiscriminatorStrategy::Class);
        let poly = root.polymorphism.unwrap();
        let entry = SubtypeEntry {
            subtype: "zoo.Dog".into(),
            value: None,
        };
        assert_eq!(poly.value_for(&entry), "zoo.Dog");
    }

    #[test]
    fn test_referenced_types_order() {
        let desc = TypeDescriptor::object("a.Owner")
            .with_member(MemberDescriptor::required("pet", "a.Pet"))
            .with_member(MemberDescriptor::nullable("tags", "list<string>"));
        assert_eq!(desc.referenced_types(), vec!["a.Pet", "list<string>"]);
    }
}
