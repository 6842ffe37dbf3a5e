//! Business profile rules.

use chrono::{DateTime, Utc};

/// Business name every new profile starts with.
pub const DEFAULT_BUSINESS_NAME: &str = "My Business";

/// Theme color for new profiles.
pub const DEFAULT_THEME_COLOR: &str = "#09090b";

/// Normalize user input into a storefront slug.
///
/// Lowercases and trims, drops anything that is not an ASCII word character,
/// whitespace or hyphen, then collapses runs of whitespace, underscores and
/// hyphens into a single `-`. Leading and trailing separators are removed.
///
/// ```
/// use slipbook_core::profile::normalize_slug;
///
/// assert_eq!(normalize_slug("  Mama's Kitchen! "), "mamas-kitchen");
/// assert_eq!(normalize_slug("suya__spot -- lekki"), "suya-spot-lekki");
/// assert_eq!(normalize_slug("!!!"), "");
/// ```
#[must_use]
pub fn normalize_slug(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_separator = true;
        } else if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        }
    }
    slug
}

/// Whether the owner still has to finish branding.
///
/// Drives the dashboard alert: the name is unset or still the default, or
/// there is no phone number or logo.
#[must_use]
pub fn is_profile_incomplete(
    business_name: &str,
    phone: Option<&str>,
    logo_url: Option<&str>,
) -> bool {
    let blank = |v: Option<&str>| v.is_none_or(|s| s.trim().is_empty());
    needs_onboarding(business_name) || blank(phone) || blank(logo_url)
}

/// Whether the owner has not named their business yet.
#[must_use]
pub fn needs_onboarding(business_name: &str) -> bool {
    let name = business_name.trim();
    name.is_empty() || name == DEFAULT_BUSINESS_NAME
}

/// Where to send a user right after sign-in.
#[must_use]
pub fn landing_route(is_admin: bool, business_name: &str) -> &'static str {
    if is_admin {
        "/admin"
    } else if needs_onboarding(business_name) {
        "/onboarding"
    } else {
        "/dashboard"
    }
}

/// Whether `value` is a `#rrggbb` color, the only form accepted for themes.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit())
}

/// Uppercase initial shown in place of a missing logo.
#[must_use]
pub fn logo_letter(name: &str, fallback: char) -> char {
    name.trim()
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(fallback)
}

/// UTC date and hour used to group page views into visits (`2026-10-19T14`).
#[must_use]
pub fn session_bucket(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_slug_collapses_separators() {
        assert_eq!(normalize_slug("Ada_Bakes"), "ada-bakes");
        assert_eq!(normalize_slug("  --lagos   chops--  "), "lagos-chops");
        assert_eq!(normalize_slug("café olé"), "caf-ol");
    }

    #[test]
    fn test_slug_never_starts_or_ends_with_separator() {
        assert_eq!(normalize_slug(" ! a"), "a");
        assert_eq!(normalize_slug("-_ suya spot _-"), "suya-spot");
        for input in ["--x--", "! ? x", "y !!", "_"] {
            let slug = normalize_slug(input);
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{slug:?}");
        }
    }

    #[test]
    fn test_normalize_slug_is_idempotent() {
        for input in ["Mama's Kitchen", "a - b _ c", "x9", ""] {
            let once = normalize_slug(input);
            assert_eq!(normalize_slug(&once), once);
        }
    }

    #[test]
    fn test_profile_incomplete() {
        assert!(is_profile_incomplete("My Business", Some("080"), Some("x.png")));
        assert!(is_profile_incomplete("Ada Bakes", None, Some("x.png")));
        assert!(is_profile_incomplete("Ada Bakes", Some("080"), Some("  ")));
        assert!(!is_profile_incomplete("Ada Bakes", Some("080"), Some("x.png")));
    }

    #[test]
    fn test_landing_route() {
        assert_eq!(landing_route(true, "My Business"), "/admin");
        assert_eq!(landing_route(false, ""), "/onboarding");
        assert_eq!(landing_route(false, "My Business"), "/onboarding");
        assert_eq!(landing_route(false, "Ada Bakes"), "/dashboard");
    }

    #[test]
    fn test_logo_letter() {
        assert_eq!(logo_letter("ada bakes", 'B'), 'A');
        assert_eq!(logo_letter("   ", 'B'), 'B');
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#1a2B3c"));
        assert!(!is_hex_color("1a2b3c"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#ggg000"));
    }

    #[test]
    fn test_session_bucket() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 14, 59, 59).unwrap();
        assert_eq!(session_bucket(at), "2026-10-19T14");
    }
}
