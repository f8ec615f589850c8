//! Synthesized engagement for freshly seeded stories.
//!
//! Popular stories get decisive, high-magnitude totals while obscure ones get
//! smaller, more balanced and noisier totals. Which side wins is drawn per
//! story and says nothing about the story itself.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::model::{Candidate, Story, Votes, MIN_VOTES};

const VIRAL_THRESHOLD: u64 = 50_000;
const POPULAR_THRESHOLD: u64 = 10_000;
const NOTICED_THRESHOLD: u64 = 1_000;

/// How a popularity tier shapes its vote pair.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    /// `yes` takes the majority with probability `yes_wins`, `no` otherwise.
    Landslide {
        yes_wins: f64,
        majority: RangeInclusive<u32>,
        minority: RangeInclusive<u32>,
    },
    /// A coin picks the favoured side. It wins with `favoured`, the other side wins with
    /// `underdog`, and the remainder is a split around `base` with `jitter` on each side.
    Contested {
        favoured: f64,
        underdog: f64,
        majority: RangeInclusive<u32>,
        minority: RangeInclusive<u32>,
        base: RangeInclusive<u32>,
        jitter: i64,
    },
    /// `yes` is `base` with `jitter`, `no` is drawn from its own range.
    Quiet {
        base: RangeInclusive<u32>,
        jitter: i64,
        no: RangeInclusive<u32>,
    },
}

fn shape(popularity: u64) -> Shape {
    match popularity {
        p if p > VIRAL_THRESHOLD => Shape::Landslide {
            yes_wins: 0.7,
            majority: 500..=900,
            minority: 20..=80,
        },
        p if p >= POPULAR_THRESHOLD => Shape::Landslide {
            yes_wins: 0.6,
            majority: 400..=700,
            minority: 30..=100,
        },
        p if p >= NOTICED_THRESHOLD => Shape::Contested {
            favoured: 0.6,
            underdog: 0.3,
            majority: 300..=600,
            minority: 40..=120,
            base: 150..=250,
            jitter: 30,
        },
        _ => Shape::Quiet {
            base: 100..=300,
            jitter: 50,
            no: 50..=200,
        },
    }
}

/// Map a popularity score to a `(yes, no)` vote pair. Both sides are at least [MIN_VOTES].
pub fn synthesize<R: Rng + ?Sized>(popularity: u64, rng: &mut R) -> Votes {
    let (yes, no) = match shape(popularity) {
        Shape::Landslide {
            yes_wins,
            majority,
            minority,
        } => {
            let winner = rng.random_range(majority);
            let loser = rng.random_range(minority);
            if rng.random_bool(yes_wins) {
                (winner, loser)
            } else {
                (loser, winner)
            }
        }
        Shape::Contested {
            favoured,
            underdog,
            majority,
            minority,
            base,
            jitter,
        } => {
            let favour_yes = rng.random_bool(0.5);
            let roll: f64 = rng.random();

            if roll < favoured + underdog {
                let winner = rng.random_range(majority);
                let loser = rng.random_range(minority);
                let yes_wins = (roll < favoured) == favour_yes;
                if yes_wins {
                    (winner, loser)
                } else {
                    (loser, winner)
                }
            } else {
                let base = rng.random_range(base);
                let yes = jittered(base, jitter, rng);
                let no = jittered(base, jitter, rng);
                (yes, no)
            }
        }
        Shape::Quiet { base, jitter, no } => {
            let base = rng.random_range(base);
            (jittered(base, jitter, rng), rng.random_range(no))
        }
    };

    Votes::new(yes.max(MIN_VOTES), no.max(MIN_VOTES))
}

fn jittered<R: Rng + ?Sized>(base: u32, jitter: i64, rng: &mut R) -> u32 {
    let value = i64::from(base) + rng.random_range(-jitter..=jitter);
    value.max(0) as u32
}

/// Attach synthesized votes to every candidate, in order.
pub fn synthesize_all<R: Rng + ?Sized>(candidates: Vec<Candidate>, rng: &mut R) -> Vec<Story> {
    candidates
        .into_iter()
        .map(|candidate| {
            let votes = synthesize(candidate.popularity, rng);
            Story::from_candidate(candidate, votes)
        })
        .collect()
}
