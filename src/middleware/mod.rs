// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request ID propagation, per-request spans, and CORS setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod cors;
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, with_request_tracing, RequestId, REQUEST_ID_HEADER};
