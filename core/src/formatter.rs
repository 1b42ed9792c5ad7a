use crate::protocol::ProtocolDefinition;
use log::debug;

/// Transmission terminator; anything after it is discarded
const TERMINATOR: &str = "4E4E";

/// Output rendering for formatted codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Grouped code only
    Minimal,
    /// Additionally log the source/destination address split
    Verbose,
}

/// Interpret repeater/pause grammar in a compressed tone sequence and regroup
/// it into a dash-separated address code.
///
/// A repeater mid-group repeats the previous character; a repeater or pause
/// landing exactly on a group boundary is a separator and is dropped. When
/// the protocol defines no pause symbol, a space acts as the implicit pause
/// marker. The group width comes from the definition itself.
pub fn format_selective(
    sequence: &str,
    protocol: &ProtocolDefinition,
    mode: FormatMode,
) -> String {
    if sequence.is_empty() {
        return String::new();
    }
    let group_size = protocol.group_size.max(1);

    let upper = sequence.to_uppercase();
    let trimmed = match upper.find(TERMINATOR) {
        Some(index) => &upper[..index + TERMINATOR.len()],
        None => upper.as_str(),
    };

    let chars: Vec<char> = trimmed.chars().collect();
    let mut resolved: Vec<char> = Vec::with_capacity(chars.len());

    for (i, &ch) in chars.iter().enumerate() {
        let is_pause = match protocol.pause {
            Some(pause) => ch == pause,
            None => ch == ' ',
        };
        if ch != protocol.repeater && !is_pause {
            resolved.push(ch);
            continue;
        }

        let on_boundary = i != 0 && i % group_size == 0;
        if is_pause && on_boundary {
            continue;
        }
        if ch == protocol.repeater && on_boundary {
            // A repeater on a group boundary separates, it does not repeat
            continue;
        }

        // Repeat instruction: duplicate the last output character, falling
        // back to the raw predecessor when nothing has been emitted yet
        if let Some(&previous) = resolved.last() {
            resolved.push(previous);
        } else if i >= 1 {
            resolved.push(chars[i - 1]);
        }
    }

    let groups: Vec<String> = resolved
        .chunks(group_size)
        .map(|chunk| chunk.iter().collect())
        .collect();

    if mode == FormatMode::Verbose && !groups.is_empty() {
        debug!("source address {:?}", groups[0]);
        if groups.len() > 1 {
            debug!("destination address {:?}", groups[1]);
        }
    }

    groups.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SelcallProtocol;

    fn zvei1() -> ProtocolDefinition {
        SelcallProtocol::Zvei1.definition()
    }

    #[test]
    fn test_plain_sequence_regroups() {
        let code = format_selective("1234567890", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "12345-67890");
    }

    #[test]
    fn test_pause_at_boundary_separates() {
        // C is the ZVEI pause; at index 5 it is a pure separator
        let code = format_selective("12345C67890", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "12345-67890");
    }

    #[test]
    fn test_repeater_mid_group_repeats() {
        let code = format_selective("1E21E", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "11211");
    }

    #[test]
    fn test_repeater_at_boundary_separates() {
        // No formal pause: the repeater at index 5 is a separator, not a
        // repeat of the preceding 1
        let def = zvei1().with_pause_symbol(None);
        let code = format_selective("11211E11211", &def, FormatMode::Minimal);
        assert_eq!(code, "11211-11211");
    }

    #[test]
    fn test_space_is_implicit_pause_without_pause_symbol() {
        let def = zvei1().with_pause_symbol(None);
        let code = format_selective("12345 67890", &def, FormatMode::Minimal);
        assert_eq!(code, "12345-67890");
    }

    #[test]
    fn test_pause_mid_group_acts_as_repeat() {
        // A pause away from a boundary falls through to the repeat rule
        let code = format_selective("12C45", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "12245");
    }

    #[test]
    fn test_terminator_discards_tail() {
        let with_tail = format_selective("123454E4E90210", &zvei1(), FormatMode::Minimal);
        let without_tail = format_selective("123454E4E", &zvei1(), FormatMode::Minimal);
        assert_eq!(with_tail, without_tail);
        assert!(!with_tail.contains('9'));
    }

    #[test]
    fn test_lowercase_input_is_normalized() {
        let code = format_selective("1e21e", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "11211");
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert_eq!(format_selective("", &zvei1(), FormatMode::Minimal), "");
    }

    #[test]
    fn test_leading_repeater_is_dropped() {
        // Nothing to repeat at index 0
        let code = format_selective("E1234", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "1234");
    }

    #[test]
    fn test_verbose_mode_returns_identical_string() {
        let minimal = format_selective("12345C67890", &zvei1(), FormatMode::Minimal);
        let verbose = format_selective("12345C67890", &zvei1(), FormatMode::Verbose);
        assert_eq!(minimal, verbose);
    }

    #[test]
    fn test_short_last_group() {
        let code = format_selective("1234567", &zvei1(), FormatMode::Minimal);
        assert_eq!(code, "12345-67");
    }

    #[test]
    fn test_group_size_three() {
        let def = zvei1().with_group_size(3);
        let code = format_selective("123E56", &def, FormatMode::Minimal);
        // Index 3 is a boundary for group size 3: the repeater separates
        assert_eq!(code, "123-56");
    }
}
