// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod facebook;
pub mod session;

pub use auth::{AuthService, LoginOutcome};
pub use facebook::{FacebookClient, ProviderProfile};
pub use session::SessionManager;
