//! Phone and chat-address normalization.
//!
//! WAHA identifies senders either by a canonical address
//! (`5519992115781@c.us`) or by an opaque numeric alias
//! (`140084804370526@lid`) that must be resolved through the gateway
//! before it can be matched to a user.
//!
//! All functions here are total over strings: malformed input simply
//! fails to match a pattern and passes through unchanged.

/// Network suffixes stripped from raw identifiers.
const CHAT_SUFFIXES: &[&str] = &["@c.us", "@s.whatsapp.net", "@lid"];

/// Suffix marking the canonical chat address.
const CHAT_ADDRESS_SUFFIX: &str = "@c.us";

/// Suffix marking an aliased (LID) identifier.
const LID_SUFFIX: &str = "@lid";

/// Strip network suffixes and formatting punctuation from a raw identifier.
///
/// With `strip_country_code`, a leading country code is also removed,
/// yielding the local number the backend stores.
pub fn clean_phone(raw: &str, strip_country_code: bool, country_code: &str) -> String {
    let mut clean: String = raw.trim().to_string();
    for suffix in CHAT_SUFFIXES {
        clean = clean.replace(suffix, "");
    }
    clean.retain(|c| !matches!(c, ' ' | '-' | '(' | ')'));

    if strip_country_code {
        if let Some(rest) = clean.strip_prefix(country_code) {
            return rest.to_string();
        }
    }

    clean
}

/// Whether an identifier matches the alias pattern: digits followed by `@lid`.
pub fn is_lid(identifier: &str) -> bool {
    match identifier.strip_suffix(LID_SUFFIX) {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Extract the numeric alias payload, removing the `@lid` suffix.
pub fn extract_lid(identifier: &str) -> String {
    identifier.replace(LID_SUFFIX, "").trim().to_string()
}

/// Produce the canonical chat address (`<country_code><digits>@c.us`)
/// from any accepted input shape. Idempotent.
pub fn to_chat_address(phone: &str, country_code: &str) -> String {
    let mut clean = clean_phone(phone, false, country_code);

    if !clean.starts_with(country_code) {
        clean = format!("{country_code}{clean}");
    }
    if !clean.ends_with(CHAT_ADDRESS_SUFFIX) {
        clean = format!("{clean}{CHAT_ADDRESS_SUFFIX}");
    }

    clean
}

/// Fold accented characters to plain ASCII (`almoço` → `almoco`).
///
/// Covers the Latin-1/Portuguese range the bot actually sees; anything
/// else non-ASCII is dropped, like an NFKD decomposition followed by an
/// ASCII re-encode.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii() {
                return Some(c);
            }
            let folded = match c {
                'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
                'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
                'é' | 'è' | 'ê' | 'ë' => 'e',
                'É' | 'È' | 'Ê' | 'Ë' => 'E',
                'í' | 'ì' | 'î' | 'ï' => 'i',
                'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
                'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
                'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
                'ú' | 'ù' | 'û' | 'ü' => 'u',
                'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
                'ç' => 'c',
                'Ç' => 'C',
                'ñ' => 'n',
                'Ñ' => 'N',
                _ => return None,
            };
            Some(folded)
        })
        .collect()
}
