// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection establishment resilience.
//!
//! Only opening the transport is retried. Statement execution never is: a
//! rejected statement surfaces to the caller on the first failure.

pub mod retry;
