use crate::mxid::is_external_tchap_user;

const DOMAIN_OPEN: char = '[';
const DOMAIN_CLOSE: char = ']';

/// Name part of a `Name [Domain]` display name.
///
/// `"Jean Martin [Modernisation]"` gives `"Jean Martin"`; a display name without
/// a domain is returned trimmed.
pub fn name_from_display_name(display_name: &str) -> &str {
    display_name
        .split_once(DOMAIN_OPEN)
        .map_or(display_name, |(name, _)| name)
        .trim()
}

/// Domain part of a `Name [Domain]` display name, or `""` when there is none.
pub fn domain_from_display_name(display_name: &str) -> &str {
    let Some(after_open) = display_name.split(DOMAIN_OPEN).nth(1) else {
        return "";
    };
    after_open
        .split_once(DOMAIN_CLOSE)
        .map_or(after_open, |(domain, _)| domain)
        .trim()
}

/// Best-effort display name derived from a Tchap user ID.
///
/// Internal users are `@first.last-domain.tld:server`, so the text before the
/// last hyphen is turned into `First Last`:
/// `"@jean-philippe.martin-modernisation.fr:matrix.org"` gives
/// `"Jean-Philippe Martin"`.
///
/// External users are `@local-emaildomain.tld:server`; when the local part has
/// a single hyphen it is turned back into the email address. The domain is
/// never surfaced for internal users.
pub fn to_display_name(user_id: &str) -> String {
    let identifier = user_id.split_once('@').map_or(user_id, |(_, rest)| rest);
    let identifier = identifier.split_once(':').map_or(identifier, |(local, _)| local);

    let Some(last_hyphen) = identifier.rfind('-') else {
        return identifier.to_owned();
    };

    if is_external_tchap_user(user_id) {
        if identifier.find('-') == Some(last_hyphen) {
            let mut email = String::with_capacity(identifier.len());
            email.push_str(&identifier[..last_hyphen]);
            email.push('@');
            email.push_str(&identifier[last_hyphen + 1..]);
            return email;
        }
        return identifier.to_owned();
    }

    let mut out = String::with_capacity(last_hyphen);
    let mut capitalize_next = true;
    for ch in identifier[..last_hyphen].chars() {
        match ch {
            '.' | '-' if capitalize_next => continue,
            '.' => {
                out.push(' ');
                capitalize_next = true;
            }
            '-' => {
                out.push('-');
                capitalize_next = true;
            }
            _ if capitalize_next => {
                out.extend(ch.to_uppercase());
                capitalize_next = false;
            }
            _ => out.push(ch),
        }
    }
    out
}
