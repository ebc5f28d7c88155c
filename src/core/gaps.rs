//! Detecting dead air and squashing it out of the session clock.
//!
//! Sessions often pause for hours (someone went to bed, the scene resumed the
//! next evening). The detector finds the typical pacing of a session, flags
//! silences far beyond it, and the squasher replaces each flagged silence with
//! one typical gap, so "time into session" reflects time spent writing.
//!
//! All arithmetic is done in whole milliseconds.

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::core::models::{Gap, Transcript};
use crate::message::{LogicalMessage, format_hh_mm};

/// A silence has to be longer than this multiple of the average gap...
const GAP_FACTOR: i64 = 3;

/// ...and longer than this, to be flagged.
const MIN_FLAGGED_GAP_MS: i64 = 60 * 60 * 1000;

/// Gaps at or above this multiple of the raw mean are left out of the average.
const OUTLIER_FACTOR: i64 = 2;

/// What the detector learned about a session's pacing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GapAnalysis {
    /// Mean of every gap, outliers included.
    pub raw_average: TimeDelta,
    /// Mean of the gaps below twice the raw mean: the typical pacing.
    pub average: TimeDelta,
    /// Flagged silences, in message order.
    pub gaps: Vec<Gap>,
}

/// Time since the previous message, for every message (`0` for the first).
pub fn gaps_from_previous(messages: &[LogicalMessage]) -> Vec<TimeDelta> {
    let mut previous = None;
    messages
        .iter()
        .map(|message| {
            let gap = previous.map_or_else(TimeDelta::zero, |p| message.sent_at - p);
            previous = Some(message.sent_at);
            gap
        })
        .collect()
}

/// Returns `(raw_average, average)` for a list of gaps.
///
/// An empty list averages to zero, as does a list with no gap below the
/// outlier threshold.
pub fn average_gap(gaps: &[TimeDelta]) -> (TimeDelta, TimeDelta) {
    let millis: Vec<i64> = gaps.iter().map(TimeDelta::num_milliseconds).collect();
    let raw = mean(&millis);

    let kept: Vec<i64> = millis
        .iter()
        .copied()
        .filter(|&gap| gap < raw.saturating_mul(OUTLIER_FACTOR))
        .collect();

    (
        TimeDelta::milliseconds(raw),
        TimeDelta::milliseconds(mean(&kept)),
    )
}

fn mean(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
    (sum / values.len() as i128) as i64
}

/// Finds abnormal silences and marks the message after each one.
///
/// A gap is flagged when it is longer than three times the average gap and
/// longer than an hour. Sessions with fewer than two messages have nothing to
/// flag.
pub fn detect_gaps(messages: &mut [LogicalMessage]) -> GapAnalysis {
    if messages.len() < 2 {
        return GapAnalysis::default();
    }

    let per_message = gaps_from_previous(messages);
    let (raw_average, average) = average_gap(&per_message);
    let threshold = average.num_milliseconds().saturating_mul(GAP_FACTOR);

    let mut gaps = Vec::new();
    for (message, gap) in messages.iter_mut().zip(per_message).skip(1) {
        let millis = gap.num_milliseconds();
        if millis > threshold && millis > MIN_FLAGGED_GAP_MS {
            debug!(
                message_id = message.id,
                gap = %format_hh_mm(gap),
                "gap found"
            );
            message.gap_after = Some(gap);
            gaps.push(Gap {
                after_message_id: message.id,
                duration: gap,
            });
        }
    }

    GapAnalysis {
        raw_average,
        average,
        gaps,
    }
}

/// Replaces every flagged silence with one average gap.
///
/// Each gap, in increasing message id order, shifts the elapsed time of the
/// message that ends it and of every later message by `average - gap`. The
/// session duration gets the same adjustment. Returns the total time removed.
pub fn squash_gaps(
    messages: &mut [LogicalMessage],
    analysis: &GapAnalysis,
    duration: &mut TimeDelta,
) -> TimeDelta {
    let mut gaps = analysis.gaps.clone();
    gaps.sort_by_key(|g| g.after_message_id);

    let mut squashed = TimeDelta::zero();
    for gap in &gaps {
        let adjustment = analysis.average - gap.duration;
        for message in messages.iter_mut().filter(|m| m.id >= gap.after_message_id) {
            message.set_elapsed(message.elapsed_since_start + adjustment);
        }
        *duration += adjustment;
        squashed += gap.duration - analysis.average;
    }

    squashed
}

/// Runs detection, and squashing when `squash` is set, over a transcript.
///
/// Gaps are always recorded so they can be reported; the clock is only
/// adjusted when squashing.
pub fn process_gaps(transcript: &mut Transcript, squash: bool) -> (GapAnalysis, TimeDelta) {
    let analysis = detect_gaps(&mut transcript.messages);
    transcript.gaps.clone_from(&analysis.gaps);

    let squashed = if squash {
        squash_gaps(&mut transcript.messages, &analysis, &mut transcript.duration)
    } else {
        TimeDelta::zero()
    };

    info!(
        average = %format_hh_mm(analysis.average),
        gaps = analysis.gaps.len(),
        squashed = %format_hh_mm(squashed),
        "gap analysis complete"
    );

    (analysis, squashed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RawMessage;
    use chrono::{DateTime, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    /// Messages separated by the given gaps, in seconds.
    fn messages_with_gaps(gaps: &[i64]) -> Vec<LogicalMessage> {
        let mut at = start();
        let mut messages = vec![LogicalMessage::from_raw(
            1,
            &RawMessage::new("Alice", "first message", at),
            start(),
        )];
        for (i, gap) in gaps.iter().enumerate() {
            at += TimeDelta::seconds(*gap);
            messages.push(LogicalMessage::from_raw(
                i as u64 + 2,
                &RawMessage::new("Bob", "another message", at),
                start(),
            ));
        }
        messages
    }

    #[test]
    fn test_gaps_from_previous() {
        let messages = messages_with_gaps(&[10, 20]);
        assert_eq!(
            gaps_from_previous(&messages),
            vec![TimeDelta::zero(), TimeDelta::seconds(10), TimeDelta::seconds(20)]
        );
    }

    #[test]
    fn test_average_excludes_outlier() {
        let gaps: Vec<TimeDelta> = [0, 10, 10, 10, 10, 18_000]
            .iter()
            .map(|s| TimeDelta::seconds(*s))
            .collect();
        let (raw, average) = average_gap(&gaps);
        assert!(raw > TimeDelta::seconds(3000));
        assert_eq!(average, TimeDelta::seconds(8));
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average_gap(&[]), (TimeDelta::zero(), TimeDelta::zero()));
        assert_eq!(
            average_gap(&[TimeDelta::zero(), TimeDelta::zero()]),
            (TimeDelta::zero(), TimeDelta::zero())
        );
    }

    #[test]
    fn test_detects_single_long_gap() {
        let mut messages = messages_with_gaps(&[10, 10, 10, 10, 3600 * 5]);
        let analysis = detect_gaps(&mut messages);

        assert_eq!(analysis.gaps.len(), 1);
        assert_eq!(analysis.gaps[0].after_message_id, 6);
        assert_eq!(analysis.gaps[0].duration, TimeDelta::hours(5));
        assert_eq!(messages[5].gap_after, Some(TimeDelta::hours(5)));
        assert!(messages[..5].iter().all(|m| m.gap_after.is_none()));
    }

    #[test]
    fn test_fast_session_under_an_hour_not_flagged() {
        // 50 minutes is far above 3x the average, but not above an hour
        let mut messages = messages_with_gaps(&[5, 5, 5, 5, 5, 3000]);
        assert!(detect_gaps(&mut messages).gaps.is_empty());
    }

    #[test]
    fn test_evenly_slow_session_not_flagged() {
        // two-hour gaps everywhere: none is abnormal
        let mut messages = messages_with_gaps(&[7200, 7200, 7200]);
        assert!(detect_gaps(&mut messages).gaps.is_empty());
    }

    #[test]
    fn test_zero_and_one_message() {
        let mut none: Vec<LogicalMessage> = Vec::new();
        assert_eq!(detect_gaps(&mut none), GapAnalysis::default());

        let mut one = messages_with_gaps(&[]);
        let analysis = detect_gaps(&mut one);
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.average, TimeDelta::zero());
    }

    #[test]
    fn test_squash_adjusts_following_messages() {
        let mut messages = messages_with_gaps(&[60, 60, 60, 60, 3600 * 4, 60]);
        let analysis = detect_gaps(&mut messages);
        assert_eq!(analysis.gaps.len(), 1);

        let mut duration = messages[6].sent_at - start();
        let squashed = squash_gaps(&mut messages, &analysis, &mut duration);

        assert_eq!(squashed, TimeDelta::hours(4) - analysis.average);
        assert_eq!(messages[4].elapsed_since_start, TimeDelta::minutes(4));
        assert_eq!(
            messages[5].elapsed_since_start,
            TimeDelta::minutes(4) + analysis.average
        );
        assert_eq!(
            messages[6].elapsed_since_start,
            TimeDelta::minutes(5) + analysis.average
        );
        assert_eq!(duration, messages[6].elapsed_since_start);
        assert_eq!(messages[6].into_session, format_hh_mm(messages[6].elapsed_since_start));
    }

    #[test]
    fn test_squash_multiple_gaps_compounds() {
        let mut messages =
            messages_with_gaps(&[60, 60, 60, 60, 60, 60, 3600 * 3, 60, 60, 3600 * 2, 60]);
        let analysis = detect_gaps(&mut messages);
        assert_eq!(analysis.gaps.len(), 2);

        let mut duration = messages.last().unwrap().sent_at - start();
        squash_gaps(&mut messages, &analysis, &mut duration);

        let elapsed: Vec<TimeDelta> = messages.iter().map(|m| m.elapsed_since_start).collect();
        assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            *elapsed.last().unwrap(),
            TimeDelta::minutes(9) + analysis.average * 2
        );
    }
}
