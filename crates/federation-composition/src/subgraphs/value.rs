use super::*;

/// A constant GraphQL value from a directive argument, a default value or a field set.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(StringId),
    Boolean(bool),
    Enum(StringId),
    List(Vec<Value>),
    Object(Vec<(StringId, Value)>),
}

impl Value {
    pub(crate) fn display<'a>(&'a self, subgraphs: &'a Subgraphs) -> ValueDisplay<'a> {
        ValueDisplay { value: self, subgraphs }
    }
}

pub(crate) struct ValueDisplay<'a> {
    value: &'a Value,
    subgraphs: &'a Subgraphs,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str("null"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => crate::render_sdl::write_quoted(f, &self.subgraphs[*s]),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Enum(name) => f.write_str(&self.subgraphs[*name]),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    item.display(self.subgraphs).fmt(f)?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", &self.subgraphs[*name], value.display(self.subgraphs))?;
                }
                f.write_str("}")
            }
        }
    }
}
