//! The drone's mode of operation.

use crate::error::SharedError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The drone's current flight mode.
///
/// `#[repr(u8)]` fixes the wire representation used by the UDP command
/// channel: a single datagram carrying the raw byte pattern of the tag.
/// One byte is this implementation's concrete choice of tag width — see
/// `DESIGN.md`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Action {
    Reserved = 0,
    SampleGPS = 1,
    Fly = 2,
    Land = 3,
    Idle = 4,
    Charge = 5,
    Abort = 6,
}

/// Number of bytes an `Action` occupies on the wire.
pub const ACTION_WIRE_SIZE: usize = 1;

impl Action {
    /// Encode to the single-byte wire representation.
    pub fn to_wire(self) -> [u8; ACTION_WIRE_SIZE] {
        [u8::from(self)]
    }

    /// Decode from a datagram payload, distinguishing a malformed-size
    /// payload from an unrecognized tag.
    ///
    /// Returns [`SharedError::MalformedCommand`] if the payload isn't
    /// exactly [`ACTION_WIRE_SIZE`] bytes, or `Ok(None)` if the size is
    /// right but the byte isn't a valid tag — callers treat an
    /// unrecognized tag as "no eligible command this tick", distinct from
    /// an in-band `Action` value that isn't in the current state's
    /// eligible set.
    pub fn try_from_wire(payload: &[u8]) -> Result<Option<Self>, SharedError> {
        if payload.len() != ACTION_WIRE_SIZE {
            return Err(SharedError::MalformedCommand { len: payload.len() });
        }
        Ok(Action::try_from_primitive(payload[0]).ok())
    }

    /// Decode from a datagram payload, folding a malformed size and an
    /// unrecognized tag into the same `None` — the convenience entry point
    /// for callers (the flight controller's command socket) that react to
    /// both the same way: no eligible command this tick.
    pub fn from_wire(payload: &[u8]) -> Option<Self> {
        Action::try_from_wire(payload).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for a in [
            Action::Reserved,
            Action::SampleGPS,
            Action::Fly,
            Action::Land,
            Action::Idle,
            Action::Charge,
            Action::Abort,
        ] {
            let wire = a.to_wire();
            assert_eq!(Action::from_wire(&wire), Some(a));
        }
    }

    #[test]
    fn wrong_size_payload_is_ignored() {
        assert_eq!(Action::from_wire(&[]), None);
        assert_eq!(Action::from_wire(&[1, 2]), None);
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(Action::from_wire(&[200]), None);
    }

    #[test]
    fn wrong_size_payload_is_malformed_command() {
        assert!(matches!(
            Action::try_from_wire(&[1, 2]),
            Err(SharedError::MalformedCommand { len: 2 })
        ));
    }

    #[test]
    fn right_size_unknown_tag_is_ok_none() {
        assert!(matches!(Action::try_from_wire(&[200]), Ok(None)));
    }
}
