// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;

/// An id class. Generated ids of a class carry its short prefix (`n:` for
/// nodes, `e:` for edges, `g:` for groups, `d:` for documents), so a raw id
/// string is self-describing in messages and wire payloads.
pub trait IdTag {
    const PREFIX: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentIdTag {}

impl IdTag for DocumentIdTag {
    const PREFIX: &'static str = "d:";
}

pub type DocumentId = Id<DocumentIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}

impl IdTag for NodeIdTag {
    const PREFIX: &'static str = "n:";
}

pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}

impl IdTag for EdgeIdTag {
    const PREFIX: &'static str = "e:";
}

pub type EdgeId = Id<EdgeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupIdTag {}

impl IdTag for GroupIdTag {
    const PREFIX: &'static str = "g:";
}

pub type GroupId = Id<GroupIdTag>;

/// A typed entity id.
///
/// Ids are opaque non-empty strings without `/` (they travel inside API
/// routes like `/documents/<document_id>/...`); callers may supply any such
/// string. Ids the crate generates itself go through [`Id::from_suffix`] and
/// carry the class prefix of their [`IdTag`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.contains('/') {
            return Err(IdError::ContainsSlash);
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T: IdTag> Id<T> {
    /// Stamp the class prefix onto a generated suffix (an alias or a
    /// counter value).
    pub fn from_suffix(suffix: impl fmt::Display) -> Result<Self, IdError> {
        Self::new(format!("{}{suffix}", T::PREFIX))
    }

    /// The id without its class prefix; foreign-shaped ids come back whole.
    pub fn suffix(&self) -> &str {
        self.value.strip_prefix(T::PREFIX).unwrap_or(&self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ContainsSlash,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::ContainsSlash => f.write_str("id must not contain '/'"),
        }
    }
}

impl std::error::Error for IdError {}
