//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the conversation
//! controller and the session store shared by all handlers.

use crate::store::SessionStore;
use alma_core::ConversationController;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConversationController>,
    pub store: Arc<SessionStore>,
}
