//! Router Module Index
//!
//! Splits routing by access: public pages and JSON on one side, the admin
//! panel (wrapped in the login guard by `create_router`) on the other.

/// Routes accessible to every client, logged in or not.
pub mod public;

/// Routes behind the session gate.
pub mod admin;
