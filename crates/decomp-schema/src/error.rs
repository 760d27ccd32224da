use serde::Serialize;
use std::{collections::BTreeMap, fmt};

///
/// err
/// push a formatted message onto an ErrorTree
///

#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {{
        $errs.add(format!($($arg)*));
    }};
}

///
/// ErrorTree
///
/// Aggregated validation findings, keyed by the route (type or member path)
/// they were raised against. Validation collects every problem instead of
/// stopping at the first one.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record a message against a child route.
    pub fn add_for(&mut self, route: &str, message: impl Into<String>) {
        self.children
            .entry(route.to_string())
            .or_default()
            .add(message);
    }

    /// Merge another tree under a child route; empty trees are dropped.
    pub fn merge_for(&mut self, route: &str, other: Self) {
        if other.is_empty() {
            return;
        }

        let child = self.children.entry(route.to_string()).or_default();
        child.messages.extend(other.messages);
        for (key, tree) in other.children {
            child.merge_for(&key, tree);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of messages in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    // result
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Flatten into `(route, message)` pairs, routes joined with `.`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((prefix.to_string(), message.clone()));
        }

        for (key, child) in &self.children {
            let route = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            child.flatten_into(&route, out);
        }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat = self.flatten();
        for (i, (route, message)) in flat.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{message}")?;
            } else {
                write!(f, "{route}: {message}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_children_do_not_count_as_errors() {
        let mut tree = ErrorTree::new();
        tree.merge_for("com.example.Person", ErrorTree::new());

        assert!(tree.is_empty());
        assert!(tree.result().is_ok());
    }

    #[test]
    fn flatten_joins_routes() {
        let mut tree = ErrorTree::new();
        tree.add("top");
        tree.add_for("Person", "bad field");

        let mut nested = ErrorTree::new();
        nested.add_for("name", "empty");
        tree.merge_for("Person", nested);

        assert_eq!(tree.len(), 3);
        assert_eq!(
            tree.flatten(),
            vec![
                (String::new(), "top".to_string()),
                ("Person".to_string(), "bad field".to_string()),
                ("Person.name".to_string(), "empty".to_string()),
            ]
        );
    }
}
