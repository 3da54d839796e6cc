//! Build targets and the ordered target table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::util::diagnostic::suggestions;

/// A named platform/architecture build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Target identifier, also used as a directory name (e.g. `arm64-v8a`).
    pub name: String,

    /// Compiler flags, in order.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Target {
    pub fn new<I, S>(name: impl Into<String>, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Target {
            name: name.into(),
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// Flags joined into a single compiler-flags string, if there are any.
    pub fn flags_string(&self) -> Option<String> {
        if self.flags.is_empty() {
            None
        } else {
            Some(self.flags.join(" "))
        }
    }

    fn validate(&self) -> Result<(), BuildError> {
        let name = &self.name;
        if name.trim().is_empty() {
            return Err(BuildError::config("target name must not be empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(BuildError::config(format!(
                "target name `{}` cannot be used as a directory name",
                name
            )));
        }
        Ok(())
    }
}

/// Ordered, non-empty collection of uniquely named targets.
///
/// Order is build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    /// Validate and wrap a list of targets.
    pub fn new(targets: Vec<Target>) -> Result<Self, BuildError> {
        if targets.is_empty() {
            return Err(BuildError::config("no targets configured"));
        }

        let mut seen = HashSet::new();
        for target in &targets {
            target.validate()?;
            if !seen.insert(target.name.as_str()) {
                return Err(BuildError::config(format!(
                    "target `{}` is defined more than once",
                    target.name
                )));
            }
        }

        Ok(TargetSet { targets })
    }

    /// The four Android ABIs, with the baseline ISA flags each ABI guarantees.
    pub fn android_default() -> Self {
        TargetSet {
            targets: vec![
                Target::new("arm64-v8a", ["-march=armv8-a"]),
                Target::new(
                    "armeabi-v7a",
                    ["-march=armv7-a", "-mfpu=neon", "-mfloat-abi=softfp"],
                ),
                Target::new("x86", ["-march=i686", "-mssse3"]),
                Target::new("x86_64", ["-march=x86-64", "-msse4.2", "-mpopcnt"]),
            ],
        }
    }

    /// Restrict to the named targets, keeping table order.
    ///
    /// An empty filter selects everything. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<TargetSet, BuildError> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        for requested in names {
            if self.get(requested).is_none() {
                return Err(BuildError::config_with_help(
                    format!(
                        "unknown target `{}` (available: {})",
                        requested,
                        self.names().join(", ")
                    ),
                    suggestions::UNKNOWN_TARGET,
                ));
            }
        }

        let targets = self
            .targets
            .iter()
            .filter(|t| names.iter().any(|n| n == &t.name))
            .cloned()
            .collect();
        Ok(TargetSet { targets })
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> TargetSet {
        TargetSet::new(names.iter().map(|n| Target::new(*n, ["-O2"])).collect()).unwrap()
    }

    #[test]
    fn test_android_default_table() {
        let targets = TargetSet::android_default();
        assert_eq!(targets.names(), ["arm64-v8a", "armeabi-v7a", "x86", "x86_64"]);
        assert_eq!(
            targets.get("x86").and_then(Target::flags_string).as_deref(),
            Some("-march=i686 -mssse3")
        );
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(TargetSet::new(vec![]).is_err());

        let dup = TargetSet::new(vec![Target::new("a", ["-O2"]), Target::new("a", ["-O3"])]);
        assert!(dup.unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["", "  ", "a/b", "..", "a\\b"] {
            let result = TargetSet::new(vec![Target::new(bad, Vec::<String>::new())]);
            assert!(result.is_err(), "accepted `{}`", bad);
        }
    }

    #[test]
    fn test_select_keeps_table_order() {
        let targets = set(&["a", "b", "c"]);
        let selected = targets
            .select(&["c".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(selected.names(), ["a", "c"]);
    }

    #[test]
    fn test_select_empty_filter_is_everything() {
        let targets = set(&["a", "b"]);
        assert_eq!(targets.select(&[]).unwrap(), targets);
    }

    #[test]
    fn test_select_unknown_target() {
        let err = set(&["a", "b"]).select(&["z".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown target `z`"));
        assert!(err.to_string().contains("available: a, b"));
    }

    #[test]
    fn test_flags_string_empty() {
        assert_eq!(Target::new("a", Vec::<String>::new()).flags_string(), None);
    }
}
