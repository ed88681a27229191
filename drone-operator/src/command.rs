//! Operator textual command parsing: case-insensitive words mapped onto the
//! wire `Action` tag.

use drone_shared::Action;

/// Parse one line of operator input into the `Action` it names. Returns
/// `None` for anything that isn't one of the six recognized words; the
/// caller prints a usage hint and sends nothing in that case.
pub fn parse(line: &str) -> Option<Action> {
    match line.trim().to_ascii_lowercase().as_str() {
        "fly" => Some(Action::Fly),
        "samplegps" => Some(Action::SampleGPS),
        "land" => Some(Action::Land),
        "idle" => Some(Action::Idle),
        "charge" => Some(Action::Charge),
        "abort" => Some(Action::Abort),
        _ => None,
    }
}

pub const USAGE: &str = "commands: fly | samplegps | land | idle | charge | abort";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command_case_insensitively() {
        assert_eq!(parse("Fly"), Some(Action::Fly));
        assert_eq!(parse("SAMPLEGPS"), Some(Action::SampleGPS));
        assert_eq!(parse("land\n"), Some(Action::Land));
        assert_eq!(parse("  idle  "), Some(Action::Idle));
        assert_eq!(parse("Charge"), Some(Action::Charge));
        assert_eq!(parse("abort"), Some(Action::Abort));
    }

    #[test]
    fn rejects_unknown_words() {
        assert_eq!(parse("takeoff"), None);
        assert_eq!(parse(""), None);
    }
}
