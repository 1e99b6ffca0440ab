//! Recession and boom scheduling.
//!
//! Intervals are measured in steps (quarters). The schedule is generated
//! once before the time loop and stays read-only afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::RandomSource;

/// Gap between recession starts, `[6, 12)` years.
pub const RECESSION_SPACING: (usize, usize) = (6 * 4, 12 * 4);
/// Recession length, `[0.5, 2)` years.
pub const RECESSION_DURATION: (usize, usize) = (2, 2 * 4);
/// Gap between the previous boom end and the next boom start, `[3, 10)` years.
pub const BOOM_SPACING: (usize, usize) = (3 * 4, 10 * 4);
/// Boom length, 3 years.
pub const BOOM_DURATION: usize = 3 * 4;

/// Inclusive step range `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Interval { start, end }
    }

    pub fn contains(&self, t: usize) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Regime active at a single step. Recession takes precedence over boom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    #[default]
    None,
    /// `periods` steps since the recession began.
    Recession { start: usize, periods: usize },
    Boom { start: usize },
}

/// Recession and boom intervals plus the per-step regime tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeSchedule {
    pub recessions: Vec<Interval>,
    pub booms: Vec<Interval>,
    recession_active: Vec<bool>,
    tags: Vec<Regime>,
}

impl RegimeSchedule {
    /// Draw a schedule covering `horizon` steps.
    ///
    /// Recessions are drawn first, then booms; a boom that would overlap a
    /// recession is shifted forward one step at a time until it clears.
    pub fn generate(horizon: usize, rng: &mut RandomSource) -> Self {
        let recessions = draw_recessions(horizon, rng);
        let booms = draw_booms(horizon, &recessions, rng);
        let schedule = Self::from_intervals(horizon, recessions, booms);
        debug!(
            horizon,
            recessions = schedule.recessions.len(),
            booms = schedule.booms.len(),
            "regime schedule generated"
        );
        schedule
    }

    /// Build the per-step tables for a given set of intervals.
    ///
    /// Both lists must be sorted by start and internally disjoint, which is
    /// what [`RegimeSchedule::generate`] produces.
    pub fn from_intervals(horizon: usize, recessions: Vec<Interval>, booms: Vec<Interval>) -> Self {
        let recession_hits = membership(horizon, &recessions);
        let recession_active = recession_hits.iter().map(Option::is_some).collect();
        let boom_hits = membership(horizon, &booms);
        let tags = (0..horizon)
            .map(|t| match (recession_hits[t], boom_hits[t]) {
                (Some(r), _) => {
                    let start = recessions[r].start;
                    Regime::Recession {
                        start,
                        periods: t - start,
                    }
                }
                (None, Some(b)) => Regime::Boom {
                    start: booms[b].start,
                },
                (None, None) => Regime::None,
            })
            .collect();

        RegimeSchedule {
            recessions,
            booms,
            recession_active,
            tags,
        }
    }

    /// Number of steps the tag table covers.
    pub fn horizon(&self) -> usize {
        self.tags.len()
    }

    pub fn is_recession(&self, t: usize) -> bool {
        self.recession_active.get(t).copied().unwrap_or(false)
    }

    /// Regime at step `t`; steps past the horizon have no regime.
    pub fn regime_at(&self, t: usize) -> Regime {
        self.tags.get(t).copied().unwrap_or_default()
    }

    pub fn recession_steps(&self) -> usize {
        self.recession_active.iter().filter(|&&r| r).count()
    }
}

fn draw_recessions(horizon: usize, rng: &mut RandomSource) -> Vec<Interval> {
    let mut recessions = Vec::new();
    let mut current = 0usize;
    while current < horizon {
        current += rng.uniform_int(RECESSION_SPACING.0, RECESSION_SPACING.1);
        if current < horizon {
            let duration = rng.uniform_int(RECESSION_DURATION.0, RECESSION_DURATION.1);
            recessions.push(Interval::new(current, current + duration));
        }
    }
    recessions
}

fn draw_booms(horizon: usize, recessions: &[Interval], rng: &mut RandomSource) -> Vec<Interval> {
    let mut booms = Vec::new();
    let mut current = 0usize;
    while current < horizon {
        let start = current + rng.uniform_int(BOOM_SPACING.0, BOOM_SPACING.1);
        let mut boom = Interval::new(start, start + BOOM_DURATION);
        // Terminates: recessions are finite, so shifting eventually clears them all.
        while recessions.iter().any(|r| r.overlaps(&boom)) {
            boom = Interval::new(boom.start + 1, boom.start + 1 + BOOM_DURATION);
        }
        if boom.start >= horizon {
            break;
        }
        booms.push(boom);
        current = boom.end;
    }
    booms
}

/// For each step in `[0, horizon)`, the index of the interval containing it.
///
/// The cursor only moves past an interval once its end lies behind `t`, so an
/// empty list simply yields no hits.
fn membership(horizon: usize, intervals: &[Interval]) -> Vec<Option<usize>> {
    let mut cursor = 0usize;
    (0..horizon)
        .map(|t| {
            while cursor < intervals.len() && intervals[cursor].end < t {
                cursor += 1;
            }
            intervals
                .get(cursor)
                .filter(|interval| interval.contains(t))
                .map(|_| cursor)
        })
        .collect()
}
