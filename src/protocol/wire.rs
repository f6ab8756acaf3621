//! RFC 854 wire constants and outbound framing helpers.

use std::borrow::Cow;

use memchr::memchr;

/// Interpret As Command: the escape marker that starts every control sequence.
pub const IAC: u8 = 0xFF;

/// End of subnegotiation (always preceded by IAC on the wire).
pub const SE: u8 = 0xF0;
/// Start of subnegotiation.
pub const SB: u8 = 0xFA;

pub const WILL: u8 = 0xFB;
pub const WONT: u8 = 0xFC;
pub const DO: u8 = 0xFD;
pub const DONT: u8 = 0xFE;

/// Well-known option codes, for handlers and demos.
pub mod opt {
    pub const ECHO: u8 = 1;
    pub const SUPPRESS_GO_AHEAD: u8 = 3;
    pub const STATUS: u8 = 5;
    pub const TERMINAL_TYPE: u8 = 24;
    pub const NAWS: u8 = 31;
    pub const LINEMODE: u8 = 34;
}

/// The four option-negotiation verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Will,
    Wont,
    Do,
    Dont,
}

impl Verb {
    /// Map a wire byte to a verb, if it is one.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            WILL => Some(Verb::Will),
            WONT => Some(Verb::Wont),
            DO => Some(Verb::Do),
            DONT => Some(Verb::Dont),
            _ => None,
        }
    }

    /// The wire byte for this verb.
    pub fn as_byte(self) -> u8 {
        match self {
            Verb::Will => WILL,
            Verb::Wont => WONT,
            Verb::Do => DO,
            Verb::Dont => DONT,
        }
    }

    /// The verb that declines this request, if it is a request.
    ///
    /// `DO x` is declined with `WONT x`, `WILL x` with `DONT x`. The
    /// acknowledgement verbs `WONT`/`DONT` need no answer.
    pub fn refusal(self) -> Option<Verb> {
        match self {
            Verb::Do => Some(Verb::Wont),
            Verb::Will => Some(Verb::Dont),
            Verb::Wont | Verb::Dont => None,
        }
    }
}

/// Build a three-byte negotiation envelope: `IAC <verb> <option>`.
pub fn negotiate(verb: Verb, option: u8) -> [u8; 3] {
    [IAC, verb.as_byte(), option]
}

/// Build a subnegotiation envelope: `IAC SB <option> <payload> IAC SE`.
///
/// Any IAC byte inside the payload is doubled so it cannot terminate the
/// envelope early.
pub fn subnegotiate(option: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.extend_from_slice(&[IAC, SB, option]);
    match escape(payload) {
        Cow::Borrowed(b) => out.extend_from_slice(b),
        Cow::Owned(v) => out.extend_from_slice(&v),
    }
    out.extend_from_slice(&[IAC, SE]);
    out
}

/// Double every IAC byte so the data can travel as literal content.
///
/// Returns the input unchanged (borrowed, no copy) when it contains no IAC
/// byte, which is the common case for text traffic.
pub fn escape(data: &[u8]) -> Cow<'_, [u8]> {
    let Some(first) = memchr(IAC, data) else {
        return Cow::Borrowed(data);
    };

    let mut out = Vec::with_capacity(data.len() + 4);
    out.extend_from_slice(&data[..=first]);
    out.push(IAC);

    let mut rest = &data[first + 1..];
    while let Some(i) = memchr(IAC, rest) {
        out.extend_from_slice(&rest[..=i]);
        out.push(IAC);
        rest = &rest[i + 1..];
    }
    out.extend_from_slice(rest);

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_passes_clean_data_through_borrowed() {
        let data = b"plain text, no marker";
        assert!(matches!(escape(data), Cow::Borrowed(_)));
        assert_eq!(&*escape(data), data);
    }

    #[test]
    fn escape_doubles_every_iac() {
        let data = [100, 255, 200, 255, 150];
        assert_eq!(&*escape(&data), &[100, 255, 255, 200, 255, 255, 150]);
    }

    #[test]
    fn escape_handles_leading_and_trailing_iac() {
        assert_eq!(&*escape(&[255]), &[255, 255]);
        assert_eq!(&*escape(&[255, b'a', 255]), &[255, 255, b'a', 255, 255]);
    }

    #[test]
    fn verb_round_trips_through_bytes() {
        for verb in [Verb::Will, Verb::Wont, Verb::Do, Verb::Dont] {
            assert_eq!(Verb::from_byte(verb.as_byte()), Some(verb));
        }
        assert_eq!(Verb::from_byte(SB), None);
    }

    #[test]
    fn negotiate_builds_three_byte_envelope() {
        assert_eq!(negotiate(Verb::Wont, opt::ECHO), [IAC, WONT, 1]);
    }

    #[test]
    fn subnegotiate_escapes_payload_iac() {
        let env = subnegotiate(opt::NAWS, &[0, 255, 0, 24]);
        assert_eq!(env, vec![IAC, SB, opt::NAWS, 0, 255, 255, 0, 24, IAC, SE]);
    }
}
