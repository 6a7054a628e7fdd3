//! Identifier helpers for Tchap, the French government Matrix deployment.
//!
//! Every function here is total: malformed input degrades to an empty string or
//! passes through untouched, it never fails.

/// Room alias generation and parsing.
pub mod alias;
/// Display-name derivation from user IDs and `Name [Domain]` display names.
pub mod display_name;
/// Homeserver extraction and classification.
pub mod mxid;

pub use alias::{
    ROOM_ALIAS_SUFFIX_LEN, create_room_alias, create_room_alias_name,
    create_room_alias_name_with, extract_room_alias_name, random_string, random_string_with,
};
pub use display_name::{domain_from_display_name, name_from_display_name, to_display_name};
pub use mxid::{
    homeserver_display_name, homeserver_name, is_external_tchap_server, is_external_tchap_user,
};
