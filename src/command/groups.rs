//! Permission-group authorization gate.
//!
//! Every account carries an 8-bit group mask; every command names a
//! permission group whose live bitmask comes from configuration. The
//! gate runs before argument parsing: a forbidden command is never
//! tokenized further, and the caller learns only "reserved" or
//! "deactivated", never which bit was missing.

use crate::error::CommandError;
use std::collections::HashMap;

/// Outcome of the authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    /// No bitmask is configured for the command's group - an operator
    /// disabled it at runtime.
    Deactivated,
    /// The account's mask shares no bit with the required mask.
    Forbidden,
}

/// Live mapping from permission-group name to required bitmask.
///
/// Built from the `[groups]` config table; absence of a group means
/// every command in it is deactivated.
#[derive(Debug, Clone, Default)]
pub struct CommandGroups {
    masks: HashMap<String, u8>,
}

impl CommandGroups {
    pub fn new(masks: HashMap<String, u8>) -> Self {
        Self { masks }
    }

    /// Required bitmask for a group, if the group is configured.
    pub fn mask_for(&self, group: &str) -> Option<u8> {
        self.masks.get(group).copied()
    }

    /// Gate a command in permission group `group` against an account's
    /// group bitmask.
    pub fn authorize(&self, group: &str, account_mask: u8) -> Authorization {
        match self.mask_for(group) {
            None => Authorization::Deactivated,
            Some(0) => Authorization::Deactivated,
            Some(required) if required & account_mask != 0 => Authorization::Allowed,
            Some(_) => Authorization::Forbidden,
        }
    }
}

/// Parse a run of group digits ('1'..'8') into a bitmask.
///
/// Digit *n* sets bit *n*-1, so "18" yields `0b1000_0001`.
pub fn parse_group_mask(digits: &str) -> Result<u8, CommandError> {
    let mut mask = 0u8;
    for ch in digits.chars() {
        match ch.to_digit(10) {
            Some(n @ 1..=8) => mask |= 1 << (n - 1),
            _ => {
                return Err(CommandError::StateConflict(format!(
                    "got bad group: {ch}"
                )));
            }
        }
    }
    Ok(mask)
}

/// Render a bitmask as the conventional eight-column digit listing:
/// position *n* shows digit *n*+1 when the bit is set, a space
/// otherwise.
pub fn render_group_mask(mask: u8) -> String {
    (0..8u8)
        .map(|bit| {
            if mask & (1 << bit) != 0 {
                char::from_digit(u32::from(bit) + 1, 10).unwrap_or(' ')
            } else {
                ' '
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> CommandGroups {
        let mut masks = HashMap::new();
        masks.insert("everyone".to_string(), 0b0000_0001);
        masks.insert("staff".to_string(), 0b1000_0000);
        masks.insert("disabled".to_string(), 0);
        CommandGroups::new(masks)
    }

    #[test]
    fn allowed_iff_masks_intersect() {
        let gate = gate();
        assert_eq!(gate.authorize("everyone", 0b0001), Authorization::Allowed);
        assert_eq!(gate.authorize("staff", 0b1000_0000), Authorization::Allowed);
        assert_eq!(gate.authorize("staff", 0b0000_0001), Authorization::Forbidden);
    }

    #[test]
    fn unmapped_group_is_deactivated() {
        let gate = gate();
        assert_eq!(gate.authorize("missing", 0xFF), Authorization::Deactivated);
    }

    #[test]
    fn zero_mask_is_deactivated() {
        // An operator zeroing the mask disables the group even for
        // accounts holding every bit.
        let gate = gate();
        assert_eq!(gate.authorize("disabled", 0xFF), Authorization::Deactivated);
    }

    #[test]
    fn parse_digits() {
        assert_eq!(parse_group_mask("1").unwrap(), 0b0000_0001);
        assert_eq!(parse_group_mask("18").unwrap(), 0b1000_0001);
        assert_eq!(parse_group_mask("2345678").unwrap(), 0b1111_1110);
    }

    #[test]
    fn parse_rejects_bad_digit() {
        assert!(parse_group_mask("19").is_err());
        assert!(parse_group_mask("x").is_err());
        assert!(parse_group_mask("0").is_err());
    }

    #[test]
    fn render_columns() {
        assert_eq!(render_group_mask(0b0000_0001), "1       ");
        assert_eq!(render_group_mask(0b1000_0001), "1      8");
        assert_eq!(render_group_mask(0), "        ");
    }

    #[test]
    fn parse_render_agree() {
        let mask = parse_group_mask("135").unwrap();
        assert_eq!(render_group_mask(mask), "1 3 5   ");
    }
}
