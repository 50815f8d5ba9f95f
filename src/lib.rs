// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton — graph-backed PlantUML workflow editor core.
//!
//! PlantUML text round-trips through a typed graph model; a workspace layer
//! synchronizes open documents with a persisted-file store and an axum JSON
//! API exposes the tab surface.

pub mod format;
pub mod model;
pub mod ops;
pub mod render;
pub mod server;
pub mod store;
pub mod validate;
pub mod workspace;
