//! LDAP search filters and value escaping.

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape special characters in a DN attribute value (RFC 4514).
pub fn escape_dn_value(value: &str) -> String {
    let count = value.chars().count();
    let mut escaped = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        let is_first = i == 0;
        let is_last = i + 1 == count;

        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\0' => escaped.push_str("\\00"),
            ' ' if is_first || is_last => escaped.push_str("\\20"),
            '#' if is_first => escaped.push_str("\\23"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

/// Escape every byte of a binary value for use in a filter.
pub fn escape_binary_value(value: &[u8]) -> String {
    value.iter().map(|byte| format!("\\{:02x}", byte)).collect()
}

/// User whose common name matches.
pub fn user_by_common_name(name: &str) -> String {
    format!(
        "(&(objectCategory=person)(objectClass=user)(cn={}))",
        escape_filter_value(name)
    )
}

/// User whose pre-Windows 2000 logon name matches.
pub fn user_by_sam_account_name(name: &str) -> String {
    format!(
        "(&(objectCategory=person)(objectClass=user)(sAMAccountName={}))",
        escape_filter_value(name)
    )
}

/// Computer whose name matches.
pub fn computer_by_name(name: &str) -> String {
    format!("(&(objectClass=computer)(cn={}))", escape_filter_value(name))
}

/// Group whose common name or account name matches.
pub fn group_by_name(name: &str) -> String {
    let value = escape_filter_value(name);
    format!(
        "(&(objectClass=group)(|(cn={value})(sAMAccountName={value})))",
        value = value
    )
}

/// Group with the given binary `objectSid`.
pub fn group_by_sid(sid: &[u8]) -> String {
    format!("(&(objectClass=group)(objectSid={}))", escape_binary_value(sid))
}

/// Groups listing the given DN as a direct member.
pub fn groups_with_member(distinguished_name: &str) -> String {
    format!(
        "(&(objectClass=group)(member={}))",
        escape_filter_value(distinguished_name)
    )
}
