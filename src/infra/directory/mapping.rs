//! Conversion between LDAP entries and principal structs.

use std::collections::{HashMap, HashSet};

use ldap3::{Mod, SearchEntry};

use crate::config::{UAC_ACCOUNTDISABLE, UAC_NORMAL_ACCOUNT, USER_OBJECT_CLASSES};
use crate::domain::{ComputerPrincipal, GroupPrincipal, Principal, UserPrincipal};

/// Attributes requested for user lookups
pub const USER_ATTRIBUTES: &[&str] = &[
    "cn",
    "sAMAccountName",
    "userPrincipalName",
    "displayName",
    "mail",
    "userAccountControl",
];

/// Attributes requested for computer lookups
pub const COMPUTER_ATTRIBUTES: &[&str] = &[
    "cn",
    "sAMAccountName",
    "dNSHostName",
    "userAccountControl",
    "managedBy",
    "isSynchronized",
    "isGlobalCatalogReady",
];

/// Attributes requested for group lookups
pub const GROUP_ATTRIBUTES: &[&str] = &["cn", "sAMAccountName", "description"];

/// Attributes needed to resolve an entry's primary group
pub const PRIMARY_GROUP_ATTRIBUTES: &[&str] = &["primaryGroupID", "objectSid"];

/// Attribute list for an LDAP add: name to set of raw values.
pub type AddAttributes = Vec<(Vec<u8>, HashSet<Vec<u8>>)>;

/// Case-insensitive view over a search entry's attributes.
///
/// Servers echo attribute names in whatever case they store them, so
/// lookups are done on lowercased keys.
#[derive(Debug, Clone)]
pub struct EntryAttributes {
    dn: String,
    attrs: HashMap<String, Vec<String>>,
    bin_attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl From<SearchEntry> for EntryAttributes {
    fn from(entry: SearchEntry) -> Self {
        let attrs = entry
            .attrs
            .into_iter()
            .map(|(name, values)| (name.to_ascii_lowercase(), values))
            .collect();
        let bin_attrs = entry
            .bin_attrs
            .into_iter()
            .map(|(name, values)| (name.to_ascii_lowercase(), values))
            .collect();
        Self {
            dn: entry.dn,
            attrs,
            bin_attrs,
        }
    }
}

impl EntryAttributes {
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// First value of an attribute
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value as raw bytes. Values that happen to be valid UTF-8 are
    /// stored as text by ldap3, so both maps are consulted.
    pub fn binary(&self, name: &str) -> Option<&[u8]> {
        let key = name.to_ascii_lowercase();
        self.bin_attrs
            .get(&key)
            .and_then(|values| values.first())
            .map(Vec::as_slice)
            .or_else(|| self.first(&key).map(str::as_bytes))
    }

    fn owned(&self, name: &str) -> Option<String> {
        self.first(name).map(str::to_string)
    }

    /// Integer attribute. AD stores `userAccountControl` as a signed 32-bit
    /// value, so negative text is reinterpreted bitwise.
    fn flags(&self, name: &str) -> Option<u32> {
        let raw = self.first(name)?.trim();
        raw.parse::<u32>()
            .ok()
            .or_else(|| raw.parse::<i32>().ok().map(|v| v as u32))
    }

    fn boolean(&self, name: &str) -> Option<bool> {
        match self.first(name)?.trim().to_ascii_uppercase().as_str() {
            "TRUE" => Some(true),
            "FALSE" => Some(false),
            _ => None,
        }
    }

    /// `cn` attribute, falling back to the leading RDN value.
    fn common_name(&self) -> String {
        self.owned("cn").unwrap_or_else(|| {
            self.dn
                .split(',')
                .next()
                .and_then(|rdn| rdn.split_once('='))
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
    }
}

pub fn to_user(entry: &EntryAttributes) -> UserPrincipal {
    UserPrincipal {
        distinguished_name: entry.dn().to_string(),
        common_name: entry.common_name(),
        sam_account_name: entry.owned("sAMAccountName").unwrap_or_default(),
        user_principal_name: entry.owned("userPrincipalName"),
        display_name: entry.owned("displayName"),
        email_address: entry.owned("mail"),
        user_account_control: entry.flags("userAccountControl"),
    }
}

pub fn to_computer(entry: &EntryAttributes) -> ComputerPrincipal {
    ComputerPrincipal {
        distinguished_name: entry.dn().to_string(),
        common_name: entry.common_name(),
        sam_account_name: entry.owned("sAMAccountName"),
        dns_host_name: entry.owned("dNSHostName"),
        user_account_control: entry.flags("userAccountControl"),
        managed_by: entry.owned("managedBy"),
        is_synchronized: entry.boolean("isSynchronized"),
        is_global_catalog_ready: entry.boolean("isGlobalCatalogReady"),
    }
}

pub fn to_group(entry: &EntryAttributes) -> GroupPrincipal {
    GroupPrincipal {
        distinguished_name: entry.dn().to_string(),
        common_name: entry.common_name(),
        sam_account_name: entry.owned("sAMAccountName"),
        description: entry.owned("description"),
    }
}

/// SID of the entry's primary group: the entry's own SID with its last
/// sub-authority (the RID) replaced by `primaryGroupID`.
pub fn primary_group_sid(entry: &EntryAttributes) -> Option<Vec<u8>> {
    let rid = entry.first("primaryGroupID")?.trim().parse::<u32>().ok()?;
    let sid = entry.binary("objectSid")?;
    replace_rid(sid, rid)
}

/// Binary SID layout: revision, sub-authority count, 6-byte authority,
/// then the sub-authorities as little-endian u32.
fn replace_rid(sid: &[u8], rid: u32) -> Option<Vec<u8>> {
    let count = usize::from(*sid.get(1)?);
    if count == 0 || sid.len() != 8 + 4 * count {
        return None;
    }
    let mut group_sid = sid.to_vec();
    let rid_start = group_sid.len() - 4;
    group_sid[rid_start..].copy_from_slice(&rid.to_le_bytes());
    Some(group_sid)
}

/// Encode a plaintext password for AD's `unicodePwd` attribute:
/// surrounded by double quotes, then UTF-16LE.
pub fn encode_unicode_pwd(password: &str) -> Vec<u8> {
    format!("\"{}\"", password)
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// userAccountControl for a new account.
pub fn new_account_uac(enabled: bool) -> u32 {
    if enabled {
        UAC_NORMAL_ACCOUNT
    } else {
        UAC_NORMAL_ACCOUNT | UAC_ACCOUNTDISABLE
    }
}

/// Values written for a new user entry.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub account_name: &'a str,
    pub common_name: &'a str,
    pub display_name: &'a str,
    pub email_address: &'a str,
    pub enabled: bool,
}

/// Build the attribute list for adding a user entry.
///
/// Empty optional values are left out; AD rejects attributes with no value.
pub fn new_user_attributes(user: &NewUser<'_>, password: &str) -> AddAttributes {
    let mut attrs: AddAttributes = vec![
        (
            b"objectClass".to_vec(),
            USER_OBJECT_CLASSES
                .iter()
                .map(|oc| oc.as_bytes().to_vec())
                .collect(),
        ),
        single("cn", user.common_name),
        single("sAMAccountName", user.account_name),
        single(
            "userAccountControl",
            &new_account_uac(user.enabled).to_string(),
        ),
        (
            b"unicodePwd".to_vec(),
            HashSet::from([encode_unicode_pwd(password)]),
        ),
    ];

    if !user.display_name.is_empty() {
        attrs.push(single("displayName", user.display_name));
    }
    if !user.email_address.is_empty() {
        attrs.push(single("mail", user.email_address));
    }

    attrs
}

/// Replace modifications for the writable fields that are populated.
pub fn modifications(principal: &Principal) -> Vec<Mod<Vec<u8>>> {
    let mut mods = Vec::new();

    match principal {
        Principal::User(user) => {
            replace(&mut mods, "displayName", user.display_name.as_deref());
            replace(&mut mods, "mail", user.email_address.as_deref());
            replace(
                &mut mods,
                "userPrincipalName",
                user.user_principal_name.as_deref(),
            );
            replace(
                &mut mods,
                "userAccountControl",
                user.user_account_control.map(signed_text).as_deref(),
            );
        }
        Principal::Computer(computer) => {
            replace(
                &mut mods,
                "userAccountControl",
                computer.user_account_control.map(signed_text).as_deref(),
            );
            replace(&mut mods, "managedBy", computer.managed_by.as_deref());
            replace(&mut mods, "dNSHostName", computer.dns_host_name.as_deref());
            replace(
                &mut mods,
                "isSynchronized",
                computer.is_synchronized.map(ldap_bool),
            );
            replace(
                &mut mods,
                "isGlobalCatalogReady",
                computer.is_global_catalog_ready.map(ldap_bool),
            );
        }
        Principal::Group(group) => {
            replace(&mut mods, "description", group.description.as_deref());
        }
    }

    mods
}

fn single(name: &str, value: &str) -> (Vec<u8>, HashSet<Vec<u8>>) {
    (
        name.as_bytes().to_vec(),
        HashSet::from([value.as_bytes().to_vec()]),
    )
}

fn replace(mods: &mut Vec<Mod<Vec<u8>>>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        mods.push(Mod::Replace(
            name.as_bytes().to_vec(),
            HashSet::from([value.as_bytes().to_vec()]),
        ));
    }
}

// AD expects INTEGER syntax as a signed 32-bit decimal
fn signed_text(flags: u32) -> String {
    (flags as i32).to_string()
}

fn ldap_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}
