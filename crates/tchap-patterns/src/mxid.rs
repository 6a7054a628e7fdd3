const TCHAP_DOMAIN_SUFFIX: &str = "tchap.gouv.fr";
const EXTERNAL_SERVER_PREFIXES: [&str; 2] = ["e.", "agent.externe."];

/// Homeserver part of any Matrix identifier (user, room, alias...).
///
/// `"@jean:matrix.test.org"` and `"!AAAA:matrix.test.org"` both give
/// `"matrix.test.org"`. Identifiers without `:` give an empty string.
pub fn homeserver_name(mx_id: &str) -> &str {
    mx_id.split_once(':').map_or("", |(_, server)| server)
}

/// Capitalized display name of the homeserver an identifier lives on.
///
/// For Tchap servers this is the label in front of the agency suffix, so both
/// `name1.tchap.gouv.fr` and `agent.name2.tchap.gouv.fr` resolve to the agency
/// label (`"Name1"`, `"Name2"`). Other servers are returned whole, capitalized.
pub fn homeserver_display_name(mx_id: &str) -> String {
    let mut server = homeserver_name(mx_id);
    if server.contains(TCHAP_DOMAIN_SUFFIX) {
        let labels: Vec<&str> = server.split('.').collect();
        if labels.len() >= 4 {
            server = labels[labels.len() - 4];
        }
    }
    capitalize_first(server)
}

/// Whether a homeserver name belongs to the external (guest) Tchap servers.
///
/// An empty name counts as external.
pub fn is_external_tchap_server(homeserver: &str) -> bool {
    homeserver.is_empty()
        || EXTERNAL_SERVER_PREFIXES
            .iter()
            .any(|prefix| homeserver.starts_with(prefix))
}

/// Whether a user ID belongs to an external Tchap user.
///
/// Invalid identifiers are treated as external.
pub fn is_external_tchap_user(user_id: &str) -> bool {
    is_external_tchap_server(homeserver_name(user_id))
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        Some(_) => value.to_owned(),
        None => String::new(),
    }
}
