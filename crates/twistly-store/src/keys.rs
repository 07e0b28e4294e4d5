//! Storage key namespace.
//!
//! Every collection lives under one of these keys as a JSON array. The
//! session key holds a raw string (an email or a guest id), and the guest
//! flag lives only in the transient, tab-scoped store.

pub const USERS: &str = "twistly-users";
pub const SESSION: &str = "twistly-session";
pub const POSTS: &str = "twistly-posts";
pub const MESSAGES: &str = "twistly-messages";
pub const GUEST_FLAG: &str = "twistly-guest";
