//! SteamID64 parsing and formatting.
//!
//! Understands the three forms a player's Steam ID shows up in: the
//! legacy `STEAM_0:Y:Z` form, the modern `[U:1:W]` form, and the raw
//! 64-bit integer printed as a decimal string. All three round-trip
//! through the same `76561197960265728 + accountId` relationship.

/// First valid individual-account SteamID64, corresponding to account id 0
/// in the public universe.
pub const STEAM_ID64_BASE: u64 = 76561197960265728;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SteamIdError {
    #[error("not a recognized SteamID format: {0:?}")]
    UnrecognizedFormat(String),
    #[error("SteamID64 {0} is below the valid individual-account base")]
    BelowBase(u64),
}

/// Parse any of `STEAM_0:Y:Z`, `[U:1:W]`, or a raw decimal SteamID64 into
/// its canonical 64-bit form.
pub fn parse(input: &str) -> Result<u64, SteamIdError> {
    let input = input.trim();

    if let Some(rest) = input.strip_prefix("STEAM_") {
        return parse_steam2_body(rest).ok_or_else(|| SteamIdError::UnrecognizedFormat(input.to_string()));
    }

    if input.starts_with('[') && input.ends_with(']') {
        return parse_steam3_body(&input[1..input.len() - 1])
            .ok_or_else(|| SteamIdError::UnrecognizedFormat(input.to_string()));
    }

    if let Ok(raw) = input.parse::<u64>() {
        if raw < STEAM_ID64_BASE {
            return Err(SteamIdError::BelowBase(raw));
        }
        return Ok(raw);
    }

    Err(SteamIdError::UnrecognizedFormat(input.to_string()))
}

/// `STEAM_0:Y:Z` without the `STEAM_` prefix, i.e. `X:Y:Z`.
fn parse_steam2_body(body: &str) -> Option<u64> {
    let mut parts = body.split(':');
    let _universe = parts.next()?;
    let auth_server: u64 = parts.next()?.parse().ok()?;
    let account_half: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if auth_server > 1 {
        return None;
    }
    let account_id = account_half.checked_mul(2)?.checked_add(auth_server)?;
    Some(STEAM_ID64_BASE + account_id)
}

/// `U:1:W` without the surrounding brackets.
fn parse_steam3_body(body: &str) -> Option<u64> {
    let mut parts = body.split(':');
    let letter = parts.next()?;
    if letter != "U" {
        return None;
    }
    let _universe = parts.next()?;
    let account_id: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(STEAM_ID64_BASE + account_id)
}

/// Format as the legacy `STEAM_0:Y:Z` form.
pub fn format_steam_id2(steam_id64: u64) -> Option<String> {
    if steam_id64 < STEAM_ID64_BASE {
        return None;
    }
    let account_id = steam_id64 - STEAM_ID64_BASE;
    let auth_server = account_id % 2;
    let account_half = account_id / 2;
    Some(format!("STEAM_0:{auth_server}:{account_half}"))
}

/// Format as the modern `[U:1:W]` form.
pub fn format_steam_id3(steam_id64: u64) -> Option<String> {
    if steam_id64 < STEAM_ID64_BASE {
        return None;
    }
    let account_id = steam_id64 - STEAM_ID64_BASE;
    Some(format!("[U:1:{account_id}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scenario_s7() {
        assert_eq!(parse("STEAM_0:0:26039975").unwrap(), 76561198012345678);
        assert_eq!(parse("[U:1:52079950]").unwrap(), 76561198012345678);
        assert_eq!(parse("76561198012345678").unwrap(), 76561198012345678);
        assert!(parse("invalid").is_err());
    }

    proptest! {
        #[test]
        fn p9_round_trip(account_id in 0u64..1_000_000_000) {
            let s = STEAM_ID64_BASE + account_id;
            let s2 = format_steam_id2(s).unwrap();
            let s3 = format_steam_id3(s).unwrap();
            prop_assert_eq!(parse(&s2).unwrap(), s);
            prop_assert_eq!(parse(&s3).unwrap(), s);
        }
    }
}
