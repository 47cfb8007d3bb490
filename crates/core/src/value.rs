use serde::{Deserialize, Serialize};

/// A single cell.
///
/// Serializes untagged: numbers as JSON numbers, labels as strings and
/// missing cells as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Label(String),
    Missing,
}

impl Value {
    pub fn label(s: impl Into<String>) -> Self {
        Self::Label(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(s) => write!(f, "{s}"),
            Self::Missing => write!(f, "NA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_shape() {
        let row = vec![Value::Number(1.5), Value::label("<1000"), Value::Missing];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[1.5,"<1000",null]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<f64>), Value::Missing);
        assert_eq!(Value::from(Some("a")), Value::label("a"));
    }
}
