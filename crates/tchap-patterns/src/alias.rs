use rand::{Rng, distributions::Alphanumeric};

use crate::mxid::homeserver_name;

/// Number of random characters appended to generated alias names.
pub const ROOM_ALIAS_SUFFIX_LEN: usize = 10;

/// Suggested alias local part: the prefix stripped to ASCII alphanumerics,
/// followed by [`ROOM_ALIAS_SUFFIX_LEN`] random alphanumerics.
pub fn create_room_alias_name(prefix: &str) -> String {
    create_room_alias_name_with(prefix, &mut rand::thread_rng())
}

/// Same as [`create_room_alias_name`] with a caller-provided RNG.
pub fn create_room_alias_name_with<R: Rng>(prefix: &str, rng: &mut R) -> String {
    let mut name: String = prefix
        .trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    name.push_str(&random_string_with(ROOM_ALIAS_SUFFIX_LEN, rng));
    name
}

/// Full room alias `#<name>:<server>` on the homeserver of `session_id`.
pub fn create_room_alias(session_id: &str, prefix: &str) -> String {
    format!(
        "#{}:{}",
        create_room_alias_name(prefix),
        homeserver_name(session_id)
    )
}

/// Local part of a room alias: `"#general:example.org"` gives `"general"`.
pub fn extract_room_alias_name(room_alias: &str) -> &str {
    let name = room_alias
        .split_once('#')
        .map_or(room_alias, |(_, rest)| rest);
    name.split_once(':').map_or(name, |(local, _)| local)
}

/// Random string of `len` characters drawn from `[a-zA-Z0-9]`.
pub fn random_string(len: usize) -> String {
    random_string_with(len, &mut rand::thread_rng())
}

/// Same as [`random_string`] with a caller-provided RNG.
pub fn random_string_with<R: Rng>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
