// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasError {
    Empty,
    ContainsWhitespace,
    InvalidChar { ch: char },
}

impl fmt::Display for AliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("must not be empty"),
            Self::ContainsWhitespace => f.write_str("must not contain whitespace"),
            Self::InvalidChar { ch } => write!(f, "contains invalid character: '{ch}'"),
        }
    }
}

pub(super) fn validate_alias(alias: &str) -> Result<(), AliasError> {
    if alias.is_empty() {
        return Err(AliasError::Empty);
    }
    if alias.chars().any(|c| c.is_whitespace()) {
        return Err(AliasError::ContainsWhitespace);
    }
    if let Some(ch) = alias.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(AliasError::InvalidChar { ch });
    }
    Ok(())
}

/// Derive an alias from a display label: lowercased, non-alphanumerics
/// stripped. `"Process Step 2"` becomes `processstep2`.
pub(super) fn alias_from_label(label: &str) -> Result<String, AliasError> {
    let alias = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect::<String>();
    if alias.is_empty() {
        return Err(AliasError::Empty);
    }
    Ok(alias)
}

/// Best-effort alias for export when a node carries none: the alphanumerics
/// and underscores of the id's suffix.
pub(super) fn sanitize_alias(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{alias_from_label, sanitize_alias, validate_alias, AliasError};

    #[test]
    fn validates_word_aliases() {
        assert_eq!(validate_alias("api_call2"), Ok(()));
        assert_eq!(validate_alias(""), Err(AliasError::Empty));
        assert_eq!(validate_alias("a b"), Err(AliasError::ContainsWhitespace));
        assert_eq!(validate_alias("a-b"), Err(AliasError::InvalidChar { ch: '-' }));
    }

    #[test]
    fn derives_alias_from_label() {
        assert_eq!(alias_from_label("Process Step 2"), Ok("processstep2".to_owned()));
        assert_eq!(alias_from_label("---"), Err(AliasError::Empty));
    }

    #[test]
    fn sanitizes_to_alias_characters() {
        assert_eq!(sanitize_alias("ware-house"), "warehouse");
        assert_eq!(sanitize_alias("stage_1"), "stage_1");
        assert_eq!(sanitize_alias("plain"), "plain");
    }
}
