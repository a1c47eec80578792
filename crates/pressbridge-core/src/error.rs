// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pressbridge.
//
// Interaction delivery itself is best-effort and never returns these: a
// dropped press is logged, not raised.  The variants below cover the few
// operations that can genuinely fail (config I/O, wire parsing, widgets).

use thiserror::Error;

/// Top-level error type for all Pressbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Wire contract --
    #[error("unsupported event schema version {found} (expected {expected})")]
    UnsupportedSchema { expected: u16, found: u16 },

    #[error("invalid event payload: {0}")]
    InvalidPayload(String),

    // -- Host queue --
    #[error("host runtime queue is closed")]
    HostUnavailable,

    #[error("host runtime queue is full")]
    QueueFull,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform widget --
    #[error("platform widget error: {0}")]
    Widget(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
