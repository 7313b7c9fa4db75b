//! Inbound commands to the application core.
//!
//! Remote peers publish raw text on the two command topics; the
//! [`CommandRouter`](super::router::CommandRouter) turns each payload into
//! one of these and applies it immediately.  Nothing is retained.
//!
//! Payload decoding never fails: garbage degrades to a default value
//! (`SetSwitch(false)`, `SetPosition(0)`).

/// Commands that remote peers can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Binary switch on (`true`) or off.
    SetSwitch(bool),
    /// Positional actuator angle in degrees.  Not range-checked here.
    SetPosition(i32),
}

/// `true` iff the payload is the token `true` in any letter case.
/// Anything else, including invalid UTF-8, means off.
pub fn parse_switch(payload: &[u8]) -> bool {
    payload.eq_ignore_ascii_case(b"true")
}

/// Lenient decimal conversion: optional leading whitespace, optional
/// sign, then as many digits as are present.  No digits yields 0;
/// overflow saturates.
pub fn parse_position(payload: &[u8]) -> i32 {
    let mut bytes = payload
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    for b in bytes.take_while(u8::is_ascii_digit) {
        let digit = i32::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
