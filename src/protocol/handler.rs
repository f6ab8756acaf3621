//! Negotiation policy as an injectable capability.
//!
//! The frame parser only recognizes control envelopes; what to answer is
//! policy, supplied by the application through [`NegotiationHandler`]. A
//! handler returns pre-framed wire bytes (already containing their IAC
//! prefixes) which the session sends back verbatim, unescaped.

use super::parser::Event;
use super::wire;

/// Receives every recognized control sequence from the inbound stream.
///
/// The returned bytes, if any, are written to the peer before the read
/// operation that triggered the event completes. Handlers must not block
/// indefinitely; they run on the session's read path.
pub trait NegotiationHandler: Send {
    fn handle(&mut self, event: Event) -> Option<Vec<u8>>;
}

impl<F> NegotiationHandler for F
where
    F: FnMut(Event) -> Option<Vec<u8>> + Send,
{
    fn handle(&mut self, event: Event) -> Option<Vec<u8>> {
        (self)(event)
    }
}

/// Discards every event without answering. Telnetlib's default behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ignore;

impl NegotiationHandler for Ignore {
    fn handle(&mut self, _event: Event) -> Option<Vec<u8>> {
        None
    }
}

/// Declines every option request: `DO x` is answered with `WONT x`,
/// `WILL x` with `DONT x`.
///
/// The safe default for servers that support no options at all; clients
/// settle into plain NVT mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefuseAll;

impl NegotiationHandler for RefuseAll {
    fn handle(&mut self, event: Event) -> Option<Vec<u8>> {
        match event {
            Event::Negotiate { verb, option } => verb
                .refusal()
                .map(|answer| wire::negotiate(answer, option).to_vec()),
            Event::Command(_) | Event::Subnegotiate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::{DONT, IAC, Verb, WONT, opt};

    #[test]
    fn refuse_all_declines_requests() {
        let mut handler = RefuseAll;
        assert_eq!(
            handler.handle(Event::Negotiate {
                verb: Verb::Do,
                option: opt::ECHO
            }),
            Some(vec![IAC, WONT, opt::ECHO])
        );
        assert_eq!(
            handler.handle(Event::Negotiate {
                verb: Verb::Will,
                option: opt::NAWS
            }),
            Some(vec![IAC, DONT, opt::NAWS])
        );
    }

    #[test]
    fn refuse_all_stays_silent_on_acknowledgements() {
        let mut handler = RefuseAll;
        assert_eq!(
            handler.handle(Event::Negotiate {
                verb: Verb::Wont,
                option: opt::ECHO
            }),
            None
        );
        assert_eq!(handler.handle(Event::Command(0xF1)), None);
    }

    #[test]
    fn closures_are_handlers() {
        let mut seen = Vec::new();
        {
            let mut handler = |event: Event| -> Option<Vec<u8>> {
                seen.push(event);
                None
            };
            let _ = handler.handle(Event::Command(0xF9));
        }
        assert_eq!(seen, vec![Event::Command(0xF9)]);
    }
}
