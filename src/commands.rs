//! Text commands carried in socket messages.
//!
//! A message is one or more lines. Blank lines and lines starting with `#`
//! are skipped; every other line is a single command:
//!
//! ```text
//! digital <logical> <on|off|high|low|true|false|1|0>
//! analog  <logical> <level>
//! ```
//!
//! `d` and `a` are accepted for the verbs. Verbs and digital values are
//! case-insensitive. Analog levels are signed integers passed through
//! unchanged.
//!
//! # Example
//!
//! ```rust
//! use pinbox::commands::{parse_command, parse_message, PinCommand};
//!
//! assert_eq!(
//!     parse_command("digital 100 on"),
//!     Ok(PinCommand::Digital { pin: 100, state: true })
//! );
//!
//! let cmds = parse_message("a 102 512\n\n# comment\nD 101 off\n");
//! assert_eq!(cmds.len(), 2);
//! assert_eq!(cmds[0], Ok(PinCommand::Analog { pin: 102, level: 512 }));
//! ```

use crate::error::CommandError;

/// A single decoded pin write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum PinCommand {
    /// Switch the pin on or off.
    Digital {
        /// Logical pin ID.
        pin: i32,
        /// Requested state.
        state: bool,
    },
    /// Drive the pin at a level.
    Analog {
        /// Logical pin ID.
        pin: i32,
        /// Requested level on the 0..=1024 scale.
        level: i32,
    },
}

impl PinCommand {
    /// Logical pin the command addresses.
    #[inline]
    pub const fn pin(&self) -> i32 {
        match self {
            PinCommand::Digital { pin, .. } | PinCommand::Analog { pin, .. } => *pin,
        }
    }
}

/// Parse a digital value.
///
/// ```
/// use pinbox::commands::parse_state;
///
/// assert_eq!(parse_state("ON"), Some(true));
/// assert_eq!(parse_state("low"), Some(false));
/// assert_eq!(parse_state("2"), None);
/// ```
pub fn parse_state(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "high" | "true" | "1" => Some(true),
        "off" | "low" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse one command line.
pub fn parse_command(line: &str) -> Result<PinCommand, CommandError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(CommandError::Empty)?;
    let verb = verb.to_ascii_lowercase();

    let is_digital = match verb.as_str() {
        "digital" | "d" => true,
        "analog" | "a" => false,
        _ => return Err(CommandError::UnknownVerb(verb)),
    };

    let pin_token = tokens.next().ok_or(CommandError::MissingArgument("pin"))?;
    let pin = pin_token
        .parse::<i32>()
        .map_err(|_| CommandError::InvalidPin(pin_token.to_string()))?;

    let value = tokens.next().ok_or(CommandError::MissingArgument("level"))?;

    if is_digital {
        let state = parse_state(value).ok_or_else(|| CommandError::InvalidLevel(value.to_string()))?;
        Ok(PinCommand::Digital { pin, state })
    } else {
        let level = value
            .parse::<i32>()
            .map_err(|_| CommandError::InvalidLevel(value.to_string()))?;
        Ok(PinCommand::Analog { pin, level })
    }
}

/// Parse every command line of a message, in order.
///
/// Blank and `#` comment lines produce no entry.
pub fn parse_message(text: &str) -> Vec<Result<PinCommand, CommandError>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_command)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // parse_state
    // =========================================================================

    #[test]
    fn state_words() {
        for on in ["on", "high", "true", "1", " On "] {
            assert_eq!(parse_state(on), Some(true), "{on}");
        }
        for off in ["off", "low", "false", "0", "OFF"] {
            assert_eq!(parse_state(off), Some(false), "{off}");
        }
        assert_eq!(parse_state(""), None);
        assert_eq!(parse_state("yes"), None);
    }

    // =========================================================================
    // parse_command
    // =========================================================================

    #[test]
    fn digital_commands() {
        assert_eq!(
            parse_command("digital 101 off"),
            Ok(PinCommand::Digital { pin: 101, state: false })
        );
        assert_eq!(
            parse_command("  D   103   HIGH "),
            Ok(PinCommand::Digital { pin: 103, state: true })
        );
    }

    #[test]
    fn analog_commands() {
        assert_eq!(
            parse_command("analog 102 700"),
            Ok(PinCommand::Analog { pin: 102, level: 700 })
        );
        assert_eq!(
            parse_command("a 5 -3"),
            Ok(PinCommand::Analog { pin: 5, level: -3 })
        );
    }

    #[test]
    fn extra_tokens_are_ignored() {
        assert_eq!(
            parse_command("d 100 on now"),
            Ok(PinCommand::Digital { pin: 100, state: true })
        );
    }

    #[test]
    fn command_errors() {
        assert_eq!(parse_command(""), Err(CommandError::Empty));
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("blink 100"),
            Err(CommandError::UnknownVerb("blink".into()))
        );
        assert_eq!(parse_command("digital"), Err(CommandError::MissingArgument("pin")));
        assert_eq!(
            parse_command("digital 100"),
            Err(CommandError::MissingArgument("level"))
        );
        assert_eq!(
            parse_command("digital x on"),
            Err(CommandError::InvalidPin("x".into()))
        );
        assert_eq!(
            parse_command("digital 100 maybe"),
            Err(CommandError::InvalidLevel("maybe".into()))
        );
        assert_eq!(
            parse_command("analog 100 1.5"),
            Err(CommandError::InvalidLevel("1.5".into()))
        );
    }

    #[test]
    fn pin_accessor() {
        assert_eq!(PinCommand::Digital { pin: 3, state: true }.pin(), 3);
        assert_eq!(PinCommand::Analog { pin: 4, level: 0 }.pin(), 4);
    }

    // =========================================================================
    // parse_message
    // =========================================================================

    #[test]
    fn message_skips_blank_and_comment_lines() {
        let cmds = parse_message("# startup\n\ndigital 100 on\r\n  \nanalog 102 10\n");
        assert_eq!(
            cmds,
            vec![
                Ok(PinCommand::Digital { pin: 100, state: true }),
                Ok(PinCommand::Analog { pin: 102, level: 10 }),
            ]
        );
    }

    #[test]
    fn message_keeps_errors_in_place() {
        let cmds = parse_message("d 100 on\nbogus\nd 101 off");
        assert_eq!(cmds.len(), 3);
        assert!(cmds[0].is_ok());
        assert_eq!(cmds[1], Err(CommandError::UnknownVerb("bogus".into())));
        assert!(cmds[2].is_ok());
    }

    #[test]
    fn empty_message_has_no_commands() {
        assert!(parse_message("").is_empty());
        assert!(parse_message("\n\n# nothing\n").is_empty());
    }
}
