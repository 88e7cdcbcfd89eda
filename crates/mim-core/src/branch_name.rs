//! Validated branch names for the `branch` verb.
//!
//! Names are passed to git as separate argv entries, never through a
//! shell, so the concern here is git's own ref-name rules plus names that
//! git would read as an option.

use std::fmt;

use crate::error::Error;

/// A branch name accepted by `git check-ref-format --branch`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Validate `name`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] if git would reject the name or
    /// parse it as an option.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if let Some(reason) = violation(&name) {
            return Err(Error::InvalidBranchName { name, reason });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// First rule `name` breaks, if any.
fn violation(name: &str) -> Option<String> {
    let fixed: &[(bool, &str)] = &[
        (name.is_empty(), "branch name cannot be empty"),
        (name == "@", "branch name cannot be '@'"),
        (name == "HEAD", "branch name cannot be 'HEAD'"),
        (name.starts_with('-'), "branch name cannot start with '-'"),
        (name.starts_with('.'), "branch name cannot start with '.'"),
        (name.ends_with('.'), "branch name cannot end with '.'"),
        (name.ends_with(".lock"), "branch name cannot end with '.lock'"),
        (
            name.starts_with('/') || name.ends_with('/'),
            "branch name cannot start or end with '/'",
        ),
        (name.contains(".."), "branch name cannot contain '..'"),
        (name.contains("//"), "branch name cannot contain '//'"),
        (name.contains("@{"), "branch name cannot contain '@{'"),
        (name.contains("/."), "path components cannot start with '.'"),
    ];
    if let Some((_, reason)) = fixed.iter().find(|(broken, _)| *broken) {
        return Some((*reason).to_owned());
    }

    name.chars().find_map(|c| {
        if c.is_ascii_control() {
            Some("branch name cannot contain control characters".to_owned())
        } else if matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\') {
            Some(format!("branch name cannot contain '{c}'"))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        for name in ["main", "feature/auth", "fix-123", "user/jo/wip", "v1.2"] {
            assert!(BranchName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_git_invalid_names() {
        for name in [
            "", "@", "HEAD", ".hidden", "end.", "x.lock", "/lead", "trail/", "a..b", "a//b",
            "a@{1}", "a/.b", "sp ace", "til~de", "car^et", "co:lon", "q?", "st*r", "br[acket",
            "back\\slash", "tab\tname",
        ] {
            assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn rejects_option_lookalikes() {
        let err = BranchName::new("--orphan").unwrap_err();
        assert!(err.to_string().contains("cannot start with '-'"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn displays_as_plain_name() {
        let name = BranchName::new("feature/x").unwrap();
        assert_eq!(name.to_string(), "feature/x");
        assert_eq!(name.as_str(), "feature/x");
        assert!(name == *"feature/x");
    }
}
