//! Query answers

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One answer: query variable names paired with rendered bindings, in query order
///
/// Serializes as a JSON object whose keys keep the query's variable order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    bindings: Vec<(String, String)>,
}

impl Solution {
    pub fn new(bindings: Vec<(String, String)>) -> Self {
        Self { bindings }
    }

    /// Rendered binding of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn into_bindings(self) -> Vec<(String, String)> {
        self.bindings
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Solution {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bindings.is_empty() {
            return write!(f, "true");
        }
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (name, value) in &self.bindings {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Solution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SolutionVisitor;

        impl<'de> Visitor<'de> for SolutionVisitor {
            type Value = Solution;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map from variable names to rendered terms")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Solution, A::Error> {
                let mut bindings = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    bindings.push((name, value));
                }
                Ok(Solution { bindings })
            }
        }

        deserializer.deserialize_map(SolutionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_keeps_variable_order() {
        let solution: Solution = [("Z", "1"), ("A", "f(b)")].into_iter().collect();
        let json = serde_json::to_string(&solution).unwrap();
        assert_eq!(json, r#"{"Z":"1","A":"f(b)"}"#);
    }

    #[test]
    fn test_json_read_back_in_order() {
        let solution: Solution = serde_json::from_str(r#"{"Y":"2","X":"1"}"#).unwrap();
        assert_eq!(
            solution.into_bindings(),
            vec![("Y".to_string(), "2".to_string()), ("X".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_display() {
        let solution: Solution = [("X", "1"), ("Y", "[a]")].into_iter().collect();
        assert_eq!(solution.to_string(), "X = 1, Y = [a]");
        assert_eq!(Solution::default().to_string(), "true");
    }
}
