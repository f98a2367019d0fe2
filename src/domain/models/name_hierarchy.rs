//! Flat, reversible serialization of qualified names.
//!
//! A serialized name looks like
//! `<delimiter>\tm<name>\ts<prefix>\tp<postfix>\tn<name>\ts<prefix>\tp<postfix>...`
//! with elements written root-first, so the serialization of an enclosing
//! declaration is always a string prefix of the serialization of anything
//! declared inside it. Tab-led markers cannot occur in Java identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const META_DELIMITER: &str = "\tm";
pub const NAME_DELIMITER: &str = "\tn";
pub const PARTS_DELIMITER: &str = "\ts";
pub const SIGNATURE_DELIMITER: &str = "\tp";

/// Separator used when a hierarchy is displayed as a single qualified string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameDelimiter {
    Java,
    File,
}

impl NameDelimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameDelimiter::Java => ".",
            NameDelimiter::File => "/",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "." => Some(NameDelimiter::Java),
            "/" => Some(NameDelimiter::File),
            _ => None,
        }
    }
}

/// One segment of a qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameElement {
    name: String,
    prefix: String,
    postfix: String,
}

impl NameElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            postfix: String::new(),
        }
    }

    pub fn with_signature(mut self, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.postfix = postfix.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn postfix(&self) -> &str {
        &self.postfix
    }
}

/// A root-first sequence of name elements plus its display delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHierarchy {
    delimiter: NameDelimiter,
    elements: Vec<NameElement>,
}

impl NameHierarchy {
    pub fn new(delimiter: NameDelimiter) -> Self {
        Self {
            delimiter,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: NameElement) {
        self.elements.push(element);
    }

    pub fn with_element(mut self, element: NameElement) -> Self {
        self.push(element);
        self
    }

    pub fn delimiter(&self) -> NameDelimiter {
        self.delimiter
    }

    pub fn elements(&self) -> &[NameElement] {
        &self.elements
    }

    pub fn leaf(&self) -> Option<&NameElement> {
        self.elements.last()
    }

    pub fn serialize(&self) -> String {
        let mut out = String::from(self.delimiter.as_str());
        out.push_str(META_DELIMITER);
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                out.push_str(NAME_DELIMITER);
            }
            out.push_str(&element.name);
            out.push_str(PARTS_DELIMITER);
            out.push_str(&element.prefix);
            out.push_str(SIGNATURE_DELIMITER);
            out.push_str(&element.postfix);
        }
        out
    }

    pub fn deserialize(serialized: &str) -> Result<Self, DomainError> {
        let (delimiter, body) = serialized.split_once(META_DELIMITER).ok_or_else(|| {
            DomainError::invalid_input(format!("missing meta delimiter in {:?}", serialized))
        })?;
        let delimiter = NameDelimiter::parse(delimiter).ok_or_else(|| {
            DomainError::invalid_input(format!("unknown name delimiter {:?}", delimiter))
        })?;

        let mut hierarchy = Self::new(delimiter);
        if body.is_empty() {
            return Ok(hierarchy);
        }

        for part in body.split(NAME_DELIMITER) {
            let (name, signature) = part.split_once(PARTS_DELIMITER).ok_or_else(|| {
                DomainError::invalid_input(format!("missing parts delimiter in {:?}", part))
            })?;
            let (prefix, postfix) = signature.split_once(SIGNATURE_DELIMITER).ok_or_else(|| {
                DomainError::invalid_input(format!("missing signature delimiter in {:?}", part))
            })?;
            hierarchy.push(NameElement::new(name).with_signature(prefix, postfix));
        }
        Ok(hierarchy)
    }

    /// Element names joined by the display delimiter, signatures left out.
    pub fn qualified_name(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(self.delimiter.as_str())
    }
}

impl fmt::Display for NameHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.leaf() {
            Some(leaf) if !leaf.prefix.is_empty() => {
                write!(f, "{} {}{}", leaf.prefix, self.qualified_name(), leaf.postfix)
            }
            Some(leaf) => write!(f, "{}{}", self.qualified_name(), leaf.postfix),
            None => Ok(()),
        }
    }
}
