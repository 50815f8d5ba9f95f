// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

mod ident;
pub mod workflow;

pub use ident::AliasError;
pub use workflow::{export_workflow, parse_workflow, WorkflowParseError};
