//! Test unit references

use std::fmt;
use std::sync::Arc;

/// Identifier naming one runnable unit in a catalog
///
/// Cheap to clone: stress replication hands out many copies of the same id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(Arc<str>);

impl UnitId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_ordering() {
        let mut ids = vec![UnitId::from("b.two"), UnitId::from("a.one"), UnitId::from("a")];
        ids.sort();
        let names: Vec<_> = ids.iter().map(UnitId::as_str).collect();
        assert_eq!(names, vec!["a", "a.one", "b.two"]);
    }

    #[test]
    fn test_unit_id_equality() {
        assert_eq!(UnitId::from("smoke.boot"), UnitId::from("smoke.boot".to_string()));
        assert_eq!(UnitId::from("x").to_string(), "x");
    }
}
