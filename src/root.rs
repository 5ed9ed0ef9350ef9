//! Working directory resolution.
//!
//! Controls which directory a spawned process runs in. The allow-list is the
//! only authorization source: paths are compared as configured strings and
//! used verbatim as the child's working directory.

use crate::error::RootDenial;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A directory callers may run tools against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootDescriptor {
    /// Directory path, also the root's identity.
    pub path: String,

    /// Short display name.
    pub name: String,

    /// What lives in this directory.
    #[serde(default)]
    pub description: String,

    /// Search hints for automated callers.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl RootDescriptor {
    /// Create a descriptor with no description or keywords.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            description: String::new(),
            keywords: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// Body returned by root listing tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootListing {
    pub roots: Vec<RootDescriptor>,
}

/// Allow-list of roots plus the default used when none is requested.
#[derive(Debug, Clone)]
pub struct RootResolver {
    roots: Vec<RootDescriptor>,
    default_root: String,
}

impl RootResolver {
    /// Create a resolver.
    ///
    /// The default root does not have to appear in `roots`.
    pub fn new(roots: Vec<RootDescriptor>, default_root: impl Into<String>) -> Self {
        Self {
            roots,
            default_root: default_root.into(),
        }
    }

    /// Validate and resolve the working directory.
    ///
    /// # Arguments
    ///
    /// * `requested` - The root named by the caller, if any
    ///
    /// # Returns
    ///
    /// The configured path to use as the working directory, or the reason
    /// it was refused. Existence is checked on every call.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, RootDenial> {
        let Some(requested) = requested else {
            if !is_directory(&self.default_root) {
                tracing::warn!(root = %self.default_root, "default root does not exist");
                return Err(RootDenial::ServerMisconfiguration {
                    root: self.default_root.clone(),
                });
            }
            return Ok(self.default_root.clone());
        };

        // Exact string match, no normalization
        if !self.is_allowed(requested) {
            tracing::warn!(root = %requested, "root not allowed");
            return Err(RootDenial::Forbidden {
                root: requested.to_string(),
            });
        }

        if !is_directory(requested) {
            tracing::warn!(root = %requested, "allow-listed root does not exist");
            return Err(RootDenial::NotFound {
                root: requested.to_string(),
            });
        }

        Ok(requested.to_string())
    }

    /// Whether `path` is exactly one of the configured roots.
    pub fn is_allowed(&self, path: &str) -> bool {
        self.roots.iter().any(|root| root.path == path)
    }

    /// Get the configured roots.
    pub fn roots(&self) -> &[RootDescriptor] {
        &self.roots
    }

    /// Get the default root.
    pub fn default_root(&self) -> &str {
        &self.default_root
    }

    /// Snapshot of the roots for listing tools.
    pub fn listing(&self) -> RootListing {
        RootListing {
            roots: self.roots.clone(),
        }
    }
}

fn is_directory(path: &str) -> bool {
    std::fs::metadata(Path::new(path))
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_of(dir: &TempDir) -> String {
        dir.path().display().to_string()
    }

    #[test]
    fn test_default_used_when_none_requested() {
        let tmp = TempDir::new().unwrap();
        let resolver = RootResolver::new(vec![], path_of(&tmp));

        assert_eq!(resolver.resolve(None).unwrap(), path_of(&tmp));
    }

    #[test]
    fn test_missing_default_is_misconfiguration() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("gone").display().to_string();
        let resolver = RootResolver::new(vec![], gone.clone());

        let result = resolver.resolve(None);
        assert_eq!(
            result,
            Err(RootDenial::ServerMisconfiguration { root: gone })
        );
    }

    #[test]
    fn test_allowlisted_root_resolves_verbatim() {
        let tmp1 = TempDir::new().unwrap();
        let tmp2 = TempDir::new().unwrap();
        let resolver = RootResolver::new(
            vec![
                RootDescriptor::new(path_of(&tmp1), "one"),
                RootDescriptor::new(path_of(&tmp2), "two"),
            ],
            path_of(&tmp1),
        );

        assert_eq!(resolver.resolve(Some(&path_of(&tmp1))).unwrap(), path_of(&tmp1));
        assert_eq!(resolver.resolve(Some(&path_of(&tmp2))).unwrap(), path_of(&tmp2));
    }

    #[test]
    fn test_unlisted_root_forbidden() {
        let tmp = TempDir::new().unwrap();
        let resolver = RootResolver::new(
            vec![RootDescriptor::new(path_of(&tmp), "one")],
            path_of(&tmp),
        );

        // Existing directory, but not configured
        let result = resolver.resolve(Some("/tmp"));
        assert_eq!(
            result,
            Err(RootDenial::Forbidden {
                root: "/tmp".to_string()
            })
        );
    }

    #[test]
    fn test_match_is_exact_not_normalized() {
        let tmp = TempDir::new().unwrap();
        let resolver = RootResolver::new(
            vec![RootDescriptor::new(path_of(&tmp), "one")],
            path_of(&tmp),
        );

        let trailing_slash = format!("{}/", path_of(&tmp));
        let dotted = format!("{}/.", path_of(&tmp));
        assert!(matches!(
            resolver.resolve(Some(&trailing_slash)),
            Err(RootDenial::Forbidden { .. })
        ));
        assert!(matches!(
            resolver.resolve(Some(&dotted)),
            Err(RootDenial::Forbidden { .. })
        ));
    }

    #[test]
    fn test_deleted_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("project");
        std::fs::create_dir(&sub).unwrap();
        let sub_path = sub.display().to_string();

        let resolver = RootResolver::new(
            vec![RootDescriptor::new(sub_path.clone(), "project")],
            path_of(&tmp),
        );
        assert!(resolver.resolve(Some(&sub_path)).is_ok());

        std::fs::remove_dir(&sub).unwrap();
        assert_eq!(
            resolver.resolve(Some(&sub_path)),
            Err(RootDenial::NotFound { root: sub_path.clone() })
        );

        // Not cached: recreating the directory makes it resolvable again
        std::fs::create_dir(&sub).unwrap();
        assert!(resolver.resolve(Some(&sub_path)).is_ok());
    }

    #[test]
    fn test_file_is_not_a_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let file_path = file.display().to_string();

        let resolver = RootResolver::new(
            vec![RootDescriptor::new(file_path.clone(), "file")],
            path_of(&tmp),
        );
        assert!(matches!(
            resolver.resolve(Some(&file_path)),
            Err(RootDenial::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let resolver = RootResolver::new(
            vec![RootDescriptor::new(path_of(&tmp), "one")],
            path_of(&tmp),
        );

        let first = resolver.resolve(Some(&path_of(&tmp)));
        let second = resolver.resolve(Some(&path_of(&tmp)));
        assert_eq!(first, second);
        assert!(first.is_ok());
    }

    #[test]
    fn test_listing_preserves_order_and_fields() {
        let resolver = RootResolver::new(
            vec![
                RootDescriptor::new("/b", "b")
                    .with_description("second")
                    .with_keywords(["x", "y"]),
                RootDescriptor::new("/a", "a"),
            ],
            "/b",
        );

        let json = serde_json::to_value(resolver.listing()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "roots": [
                    {"path": "/b", "name": "b", "description": "second", "keywords": ["x", "y"]},
                    {"path": "/a", "name": "a", "description": "", "keywords": []}
                ]
            })
        );
    }
}
