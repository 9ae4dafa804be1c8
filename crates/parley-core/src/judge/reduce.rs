//! Vote reduction: strict majority, rounded-median fallback.
//!
//! The same rule applies at both levels — within one judge's
//! self-consistency samples and across the jury's judge votes. Reduction is
//! deterministic and recomputable from the stored votes, so an annotated
//! record always carries enough evidence to reproduce its final score.

use crate::record::{FinalScore, JudgeVote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// One score held more than half of the non-null votes.
    Majority(u8),
    /// No strict majority; rounded median of the non-null votes.
    Median(u8),
}

impl Reduction {
    pub fn value(self) -> u8 {
        match self {
            Reduction::Majority(n) | Reduction::Median(n) => n,
        }
    }
}

/// Reduce a set of parsed scores. `None` iff the slice is empty.
pub fn reduce_scores(scores: &[u8]) -> Option<Reduction> {
    if scores.is_empty() {
        return None;
    }
    let mut counts = std::collections::BTreeMap::<u8, usize>::new();
    for &s in scores {
        *counts.entry(s).or_default() += 1;
    }
    for (&score, &count) in &counts {
        if count * 2 > scores.len() {
            return Some(Reduction::Majority(score));
        }
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        f64::from(sorted[mid])
    } else {
        (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
    };
    // Half-way medians round away from zero, e.g. (2, 3) -> 3.
    Some(Reduction::Median(median.round() as u8))
}

/// Reduce the full vote list of one record to a final score.
///
/// Votes are grouped by judge in first-appearance order; each judge's
/// non-null samples reduce to one judge vote, and judge votes reduce to the
/// verdict. All-null input yields `Unavailable` — never a default score.
pub fn reduce_verdict(votes: &[JudgeVote]) -> (FinalScore, String) {
    let mut order: Vec<&str> = Vec::new();
    for vote in votes {
        if !order.contains(&vote.judge.as_str()) {
            order.push(&vote.judge);
        }
    }

    let mut judge_votes = Vec::new();
    for judge in order {
        let samples: Vec<u8> = votes
            .iter()
            .filter(|v| v.judge == judge)
            .filter_map(|v| v.score)
            .collect();
        if let Some(reduced) = reduce_scores(&samples) {
            judge_votes.push(reduced.value());
        }
    }

    match reduce_scores(&judge_votes) {
        None => (
            FinalScore::Unavailable,
            "all judge votes were null; final score unavailable".to_string(),
        ),
        Some(Reduction::Majority(score)) => (
            FinalScore::Score(score),
            format!("final score {score} by majority vote on {judge_votes:?}"),
        ),
        Some(Reduction::Median(score)) => (
            FinalScore::Score(score),
            format!("no majority in {judge_votes:?}; median fallback to {score}"),
        ),
    }
}
