//! Token batching for multicast sends.
//!
//! The backend accepts a bounded number of device tokens per request, so a
//! platform's token set is split into ordered chunks before sending. All
//! batches for one platform share the same built message.

use crate::error::{ChannelError, Result};

/// The maximum number of tokens the backend accepts in a single request.
pub const TOKENS_PER_REQUEST: usize = 500;

/// Split `tokens` into ordered chunks of at most `max_size` tokens.
///
/// Every chunk except possibly the last has exactly `max_size` tokens;
/// concatenating the chunks in order reproduces `tokens` exactly. An empty
/// input yields no chunks at all, not one empty chunk.
pub fn partition(tokens: &[String], max_size: usize) -> Result<Vec<Vec<String>>> {
    if max_size == 0 {
        return Err(ChannelError::InvalidBatchSize(max_size));
    }

    Ok(tokens.chunks(max_size).map(<[String]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("token-{i}")).collect()
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let batches = partition(&[], 500).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = partition(&tokens(3), 0).unwrap_err();
        assert!(matches!(err, ChannelError::InvalidBatchSize(0)));
    }

    #[test]
    fn exact_limit_is_one_batch() {
        let batches = partition(&tokens(500), TOKENS_PER_REQUEST).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 500);
    }

    #[test]
    fn one_over_the_limit_spills_into_a_second_batch() {
        let batches = partition(&tokens(501), TOKENS_PER_REQUEST).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 500);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn concatenation_reproduces_the_input() {
        let input = tokens(1203);
        let batches = partition(&input, TOKENS_PER_REQUEST).unwrap();
        assert_eq!(batches.len(), 3);

        let rejoined: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn all_batches_but_the_last_are_full() {
        let batches = partition(&tokens(10), 3).unwrap();
        assert_eq!(batches.len(), 4);
        for batch in &batches[..3] {
            assert_eq!(batch.len(), 3);
        }
        assert_eq!(batches[3].len(), 1);
    }
}
