// src/models/skill.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the four fixed fundamentals assessed by a diagnostic.
///
/// Variants are declared in alphabetical order; the derived `Ord` doubles as
/// the fixed tie-break ordering for primary-skill resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Application,
    Grasping,
    Listening,
    Retention,
}

impl Skill {
    /// All skills in fixed (alphabetical) order. Aggregates iterate this so
    /// every attempt reports the same four keys.
    pub const ALL: [Skill; 4] = [
        Skill::Application,
        Skill::Grasping,
        Skill::Listening,
        Skill::Retention,
    ];

    /// Resolves the primary skill of a weight map: highest weight wins, ties
    /// go to the earliest skill in `Skill::ALL`. An empty or all-missing map
    /// falls back to the first skill so classification is always defined.
    pub fn primary(weights: &BTreeMap<Skill, f64>) -> Skill {
        let mut best: Option<(Skill, f64)> = None;
        for skill in Skill::ALL {
            if let Some(&weight) = weights.get(&skill) {
                match best {
                    Some((_, best_weight)) if best_weight >= weight => {}
                    _ => best = Some((skill, weight)),
                }
            }
        }
        best.map(|(skill, _)| skill).unwrap_or(Skill::ALL[0])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Application => "application",
            Skill::Grasping => "grasping",
            Skill::Listening => "listening",
            Skill::Retention => "retention",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
