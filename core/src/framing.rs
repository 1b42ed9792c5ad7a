use log::debug;
use std::collections::VecDeque;

/// Symbol decisions retained before the oldest are discarded
const HISTORY_LIMIT: usize = 100;

/// Consecutive silence decisions that close a transmission
const SILENCE_RUN_LEN: usize = 4;

/// Shortest run-length-compressed sequence worth reporting
const MIN_SEQUENCE_LEN: usize = 3;

/// Debounces per-frame symbol decisions into validated tone sequences.
///
/// Decisions accumulate (silence included) until a run of silence marks the
/// end of a transmission. The non-silence symbols are then run-length
/// compressed; a sequence is reported once it is long enough and differs
/// from the previously reported one, and the history restarts. Rejected
/// candidates keep their history so a longer transmission can still
/// complete.
#[derive(Debug, Default)]
pub struct SequenceAssembler {
    history: VecDeque<Option<char>>,
    last_accepted: Option<String>,
}

impl SequenceAssembler {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            last_accepted: None,
        }
    }

    /// Feed one detector decision (`None` = silence). Returns a validated
    /// compressed sequence when a silence run closes one.
    pub fn push(&mut self, symbol: Option<char>) -> Option<String> {
        self.history.push_back(symbol);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }

        if self.history.len() < SILENCE_RUN_LEN {
            return None;
        }
        let tail_is_silent = self
            .history
            .iter()
            .rev()
            .take(SILENCE_RUN_LEN)
            .all(|s| s.is_none());
        if !tail_is_silent {
            return None;
        }

        let compressed = self.compressed_sequence();
        if compressed.is_empty() {
            return None;
        }
        if compressed.len() < MIN_SEQUENCE_LEN {
            debug!("sequence {:?} too short, keeping history", compressed);
            return None;
        }
        if self.last_accepted.as_deref() == Some(compressed.as_str()) {
            return None;
        }

        debug!("validated tone sequence {:?}", compressed);
        self.last_accepted = Some(compressed.clone());
        self.history.clear();
        Some(compressed)
    }

    /// Non-silence history with adjacent duplicates collapsed
    fn compressed_sequence(&self) -> String {
        let mut compressed = String::new();
        let mut last: Option<char> = None;
        for &symbol in self.history.iter().flatten() {
            if last != Some(symbol) {
                compressed.push(symbol);
                last = Some(symbol);
            }
        }
        compressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_str(assembler: &mut SequenceAssembler, symbols: &str) -> Vec<String> {
        symbols
            .chars()
            .filter_map(|c| assembler.push(if c == '-' { None } else { Some(c) }))
            .collect()
    }

    #[test]
    fn test_sequence_emitted_after_silence_run() {
        let mut assembler = SequenceAssembler::new();
        let emitted = push_str(&mut assembler, "12345----");
        assert_eq!(emitted, vec!["12345".to_string()]);
    }

    #[test]
    fn test_adjacent_duplicates_compress() {
        let mut assembler = SequenceAssembler::new();
        let emitted = push_str(&mut assembler, "11122E2333----");
        assert_eq!(emitted, vec!["12E23".to_string()]);
    }

    #[test]
    fn test_silence_gaps_inside_transmission_merge() {
        let mut assembler = SequenceAssembler::new();
        // Three silences never close the sequence; the symbols around them
        // compress as if contiguous
        let emitted = push_str(&mut assembler, "1--23---45----");
        assert_eq!(emitted, vec!["12345".to_string()]);
    }

    #[test]
    fn test_short_sequences_are_held_back() {
        let mut assembler = SequenceAssembler::new();
        assert!(push_str(&mut assembler, "12----").is_empty());
        // History was kept, so a continuation can still validate
        let emitted = push_str(&mut assembler, "345----");
        assert_eq!(emitted, vec!["12345".to_string()]);
    }

    #[test]
    fn test_duplicate_sequence_suppressed() {
        let mut assembler = SequenceAssembler::new();
        let first = push_str(&mut assembler, "12345----");
        assert_eq!(first.len(), 1);

        let second = push_str(&mut assembler, "12345----");
        assert!(second.is_empty(), "identical sequence must not re-emit");

        // Rejection keeps the history, so the suppressed repeat rides along
        // with the next differing sequence
        let third = push_str(&mut assembler, "67890----");
        assert_eq!(third, vec!["1234567890".to_string()]);
    }

    #[test]
    fn test_silence_only_history_never_emits() {
        let mut assembler = SequenceAssembler::new();
        assert!(push_str(&mut assembler, "--------------------").is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut assembler = SequenceAssembler::new();
        // 120 alternating digits; only the last 100 survive
        for i in 0..120u32 {
            let symbol = char::from_digit(i % 10, 10).unwrap();
            assert!(assembler.push(Some(symbol)).is_none());
        }

        let emitted = push_str(&mut assembler, "----");
        assert_eq!(emitted.len(), 1);
        // 96 of the kept 100 digits remain once the silences pushed above
        // evict the oldest four; all alternate, so nothing compresses away
        assert_eq!(emitted[0].len(), 96);
    }

    #[test]
    fn test_emission_clears_history() {
        let mut assembler = SequenceAssembler::new();
        push_str(&mut assembler, "12345----");
        // Nothing left over: pure silence afterwards stays quiet
        assert!(push_str(&mut assembler, "--------").is_empty());
    }
}
