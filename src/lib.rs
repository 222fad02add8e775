// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Facebook Login: a small site that signs people in with Facebook.
//!
//! This crate provides the login flow, the user record store and the
//! session-guarded profile page.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod tokens;

use config::Config;
use db::Database;
use services::{AuthService, FacebookClient, SessionManager};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub facebook: FacebookClient,
    pub sessions: SessionManager,
    pub auth: AuthService,
}

impl AppState {
    /// Wire up services around a config and an open database.
    pub fn new(config: Config, db: Database, facebook: FacebookClient) -> Self {
        let sessions = SessionManager::new(db.clone(), config.session_ttl);
        let auth = AuthService::new(db, sessions.clone());
        Self {
            config,
            facebook,
            sessions,
            auth,
        }
    }
}
