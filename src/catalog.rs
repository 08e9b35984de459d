use rustc_hash::FxHashSet;
use serde_json::Value;

/// Primitive-type tag observed for a column value in one revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    /// The accessor path resolved to nothing in a revision.
    Undefined,
}

impl ValueKind {
    /// Classifies a resolved value; `None` maps to [`ValueKind::Undefined`].
    pub const fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Undefined,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Bool,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Undefined => "undefined",
        }
    }
}

/// Flat column descriptor as collected from revision files.
///
/// `path` doubles as the column id and must be unique within one catalog.
/// `path_array` holds the accessor segments used to pull the value out of a
/// revision record (object keys, or decimal indices into sequences).
#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub path: String,
    pub parent_path: Option<String>,
    pub label: String,
    pub path_array: Vec<String>,
}

impl ColumnDescriptor {
    pub fn new(
        path: impl Into<String>,
        parent_path: Option<&str>,
        label: impl Into<String>,
        path_array: &[&str],
    ) -> Self {
        Self {
            path: path.into(),
            parent_path: parent_path.map(str::to_string),
            label: label.into(),
            path_array: path_array.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Ordered flat collection of column descriptors.
///
/// Insertion order is preserved all the way into the built tree; buckets are
/// never sorted.
#[derive(Clone, Debug, Default)]
pub struct PathCatalog {
    descriptors: Vec<ColumnDescriptor>,
}

impl PathCatalog {
    pub const fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    pub fn from_descriptors(descriptors: Vec<ColumnDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn push(&mut self, descriptor: ColumnDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.descriptors.iter().any(|d| d.path == path)
    }

    /// A descriptor is a group iff some other descriptor claims it as parent.
    pub(crate) fn has_children(&self, path: &str) -> bool {
        self.descriptors
            .iter()
            .any(|d| d.parent_path.as_deref() == Some(path))
    }
}

/// Resolves an accessor path inside one revision record.
///
/// Segments index into objects by key and into sequences by decimal position.
pub fn resolve_value<'a>(record: &'a Value, path_array: &[String]) -> Option<&'a Value> {
    let mut current = record;
    for segment in path_array {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Renders a resolved value the way a cell displays it.
///
/// Sequences become a bracketed, comma-joined string of their elements; this
/// is a formatting contract consumed by the rendering side, not interpreted
/// anywhere in the engine.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", joined.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Aggregate of one column's values across every revision.
#[derive(Clone, Debug, Default)]
pub struct ValueSummary {
    /// Every primitive-type tag observed for the column.
    pub value_types: FxHashSet<ValueKind>,
    /// Longest rendered width across revisions.
    pub max_string_length: usize,
}

/// Scans every revision's value at the descriptor's accessor path.
///
/// A revision where the path resolves to nothing contributes the
/// `"undefined"` tag and no width.
pub fn scan_revisions(descriptor: &ColumnDescriptor, revisions: &[Value]) -> ValueSummary {
    let mut summary = ValueSummary::default();
    for revision in revisions {
        let value = resolve_value(revision, &descriptor.path_array);
        summary.value_types.insert(ValueKind::of(value));
        if let Some(value) = value {
            let width = render_value(value).chars().count();
            summary.max_string_length = summary.max_string_length.max(width);
        }
    }
    summary
}
