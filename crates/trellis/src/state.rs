use std::{fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::{error, error::Result};

/// Return true if the character is valid in a node name.
pub fn valid_nodename_char(c: char) -> bool {
    (c.is_ascii_lowercase() || c.is_ascii_digit()) || c == '_'
}

/// Return true if the full name is valid.
pub fn valid_nodename(name: &str) -> bool {
    !name.is_empty() && name.chars().all(valid_nodename_char)
}

/// A node name used for diagnostic lookup. Names are not unique; they consist
/// of lowercase ASCII alphanumeric characters plus underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName {
    /// Stored node name string.
    name: String,
}

impl FromStr for NodeName {
    type Err = error::Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl NodeName {
    /// Create a new `NodeName`, returning an error if the string contains
    /// invalid characters.
    fn new(name: &str) -> Result<Self> {
        if !valid_nodename(name) {
            return Err(error::Error::Invalid(name.into()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Takes a string and munges it into a valid node name by converting to
    /// snake case and removing invalid characters.
    pub fn convert(name: &str) -> Self {
        let raw = name.to_case(Case::Snake);
        let filtered: String = raw.chars().filter(|x| valid_nodename_char(*x)).collect();
        let name = if filtered.is_empty() {
            "node".to_string()
        } else {
            filtered
        };
        Self { name }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl PartialEq<String> for NodeName {
    fn eq(&self, other: &String) -> bool {
        self.name == *other
    }
}

impl TryFrom<&str> for NodeName {
    type Error = error::Error;
    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

/// Per-node mouse-capture state. At most one leaf-to-root path in a tree
/// carries capture: the capturing node is `ThisHasCaptured` and every ancestor
/// is `ChildHasCaptured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Neither this node nor a descendant holds capture.
    #[default]
    NotCaptured,
    /// A descendant of this node holds capture.
    ChildHasCaptured,
    /// This node holds capture: all move/up events route here until mouse-up.
    ThisHasCaptured,
}

/// Per-node classification of how the pointer currently overlaps the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderMouse {
    /// The pointer is not over this node.
    #[default]
    NotUnder,
    /// The pointer is over this node, but a descendant is the topmost node at
    /// that point.
    UnderNotFirst,
    /// This node is the innermost, topmost node under the pointer.
    First,
}
