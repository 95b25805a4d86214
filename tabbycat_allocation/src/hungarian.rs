use std::cmp::Ordering;

use itertools::Itertools;
use mcmf::{GraphBuilder, Capacity, Vertex, Cost};
use sea_orm::prelude::Uuid;

use tabbycat_entities::preferences::MAX_PENALTY;
use tabbycat_entities::prelude::*;

use crate::allocator::{AllocationError, Allocator};
use crate::datastructures::{AdjudicatorInfo, AllocationInput, DebateInfo, PanelAssignment};


#[derive(Debug, Clone, PartialEq)]
pub struct HungarianOptions {
    pub min_score: f64,
    pub max_score: f64,
    pub min_voting_score: f64,
    pub conflict_penalty: i64,
    pub history_penalty: i64,
}

impl Default for HungarianOptions {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_score: 5.0,
            min_voting_score: 1.5,
            conflict_penalty: 1_000_000,
            history_penalty: 10_000,
        }
    }
}

impl HungarianOptions {
    pub fn from_preferences(prefs: &Preferences) -> Result<Self, AllocationError> {
        let options = Self {
            min_score: prefs.pref_f64(Preference::AdjMinScore),
            max_score: prefs.pref_f64(Preference::AdjMaxScore),
            min_voting_score: prefs.pref_f64(Preference::AdjMinVotingScore),
            conflict_penalty: prefs.pref_i64(Preference::AdjConflictPenalty),
            history_penalty: prefs.pref_i64(Preference::AdjHistoryPenalty),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        if self.max_score <= self.min_score {
            return Err(AllocationError::InvalidPreferences(
                format!("adj_max_score ({}) must be greater than adj_min_score ({})", self.max_score, self.min_score)
            ));
        }
        for (key, penalty) in [("adj_conflict_penalty", self.conflict_penalty), ("adj_history_penalty", self.history_penalty)] {
            if !(0..=MAX_PENALTY).contains(&penalty) {
                return Err(AllocationError::InvalidPreferences(
                    format!("{} ({}) must be between 0 and {}", key, penalty, MAX_PENALTY)
                ));
            }
        }
        Ok(())
    }
}

// The solver treats edge costs from 2^30 upwards as unusable, and potentials
// add up costs along a path, so every edge stays below this divided by the node count.
const SOLVER_COST_LIMIT: i64 = 1 << 29;

/// Divides `costs` by the smallest factor that brings each of them to at most `limit`.
fn scale_costs(costs: &mut [i64], limit: i64) {
    let max_cost = costs.iter().copied().max().unwrap_or(0);
    if max_cost <= limit {
        return;
    }
    let divisor = (max_cost + limit - 1) / limit;
    tracing::debug!("Scaling allocation costs down by {}", divisor);
    costs.iter_mut().for_each(|cost| *cost /= divisor);
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NodeType {
    Adjudicator(usize),
    Debate(usize),
}

/// Fills chairs and two-person panels by solving a min-cost assignment
/// between adjudicators and debates.
#[derive(Debug, Clone, Default)]
pub struct HungarianAllocator {
    options: HungarianOptions,
}

impl HungarianAllocator {
    pub fn new(options: HungarianOptions) -> Result<Self, AllocationError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn from_preferences(prefs: &Preferences) -> Result<Self, AllocationError> {
        Ok(Self { options: HungarianOptions::from_preferences(prefs)? })
    }

    fn clamped_score(&self, adjudicator: &AdjudicatorInfo) -> f64 {
        adjudicator.score.clamp(self.options.min_score, self.options.max_score)
    }

    fn count_conflicts(&self, adjudicator: &AdjudicatorInfo, debate: &DebateInfo) -> i64 {
        debate.teams.iter().map(|team| {
            let mut conflicts = 0;
            if adjudicator.team_conflicts.contains(&team.id) {
                conflicts += 1;
            }
            if let Some(institution) = team.institution_id {
                if adjudicator.institution_conflicts.contains(&institution) {
                    conflicts += 1;
                }
                if !adjudicator.independent && adjudicator.institution_id == Some(institution) {
                    conflicts += 1;
                }
            }
            conflicts
        }).sum()
    }

    fn count_history(&self, adjudicator: &AdjudicatorInfo, debate: &DebateInfo, input: &AllocationInput) -> i64 {
        debate.teams.iter().map(|team| {
            input.history.get(&(adjudicator.id, team.id)).copied().unwrap_or(0) as i64
        }).sum()
    }

    pub fn calc_cost(&self, adjudicator: &AdjudicatorInfo, debate: &DebateInfo, input: &AllocationInput) -> i64 {
        let score_cost = ((self.options.max_score - self.clamped_score(adjudicator)) * 100.0).round() as i64;
        self.count_conflicts(adjudicator, debate) * self.options.conflict_penalty
            + self.count_history(adjudicator, debate, input) * self.options.history_penalty
            + (debate.importance as i64 + 3) * score_cost
    }

    /// Assigns each adjudicator to exactly one debate, each debate taking `per_debate` adjudicators.
    fn assign(&self, adjudicators: &[&AdjudicatorInfo], debates: &[&DebateInfo], per_debate: i32, input: &AllocationInput) -> Result<Vec<(Uuid, Uuid)>, AllocationError> {
        if adjudicators.is_empty() || debates.is_empty() {
            return Ok(vec![]);
        }

        let mut costs = adjudicators.iter()
            .cartesian_product(debates.iter())
            .map(|(adjudicator, debate)| self.calc_cost(adjudicator, debate, input))
            .collect_vec();
        let num_nodes = (adjudicators.len() + debates.len() + 2) as i64;
        scale_costs(&mut costs, SOLVER_COST_LIMIT / num_nodes);

        let mut graph_build = GraphBuilder::new();

        adjudicators.iter().enumerate().for_each(
            |(adj_idx, _adjudicator)| {
                graph_build.add_edge(
                    Vertex::Source,
                    NodeType::Adjudicator(adj_idx),
                    Capacity(1),
                    Cost(0)
                );
                debates.iter().enumerate().for_each(
                    |(debate_idx, _debate)| {
                        let cost = costs[adj_idx * debates.len() + debate_idx];
                        graph_build.add_edge(
                            NodeType::Adjudicator(adj_idx),
                            NodeType::Debate(debate_idx),
                            Capacity(1),
                            Cost(cost as i32)
                        );
                    }
                );
            }
        );

        debates.iter().enumerate().for_each(
            |(debate_idx, _debate)| {
                graph_build.add_edge(
                    NodeType::Debate(debate_idx),
                    Vertex::Sink,
                    Capacity(per_debate),
                    Cost(0)
                );
            }
        );

        let (_cost, paths) = graph_build.mcmf();

        let assignments = paths.iter().flat_map(
            |path| path.edges()
        ).filter_map(
            |edge| {
                if edge.amount > 0 {
                    match (&edge.a, &edge.b) {
                        (Vertex::Node(NodeType::Adjudicator(adj_idx)), Vertex::Node(NodeType::Debate(debate_idx))) => Some((debates[*debate_idx].id, adjudicators[*adj_idx].id)),
                        _ => None
                    }
                }
                else {
                    None
                }
            }
        ).collect_vec();

        let expected = adjudicators.len().min(debates.len() * per_debate as usize);
        if assignments.len() < expected {
            return Err(AllocationError::IncompleteAssignment { expected, assigned: assignments.len() });
        }
        Ok(assignments)
    }
}

impl Allocator for HungarianAllocator {
    fn allocate(&self, input: &AllocationInput) -> Result<Vec<PanelAssignment>, AllocationError> {
        let debates = input.debates.iter()
            .sorted_by(|a, b| b.importance.cmp(&a.importance).then(a.room_rank.cmp(&b.room_rank)))
            .collect_vec();

        let voting = input.adjudicators.iter()
            .filter(|a| a.score >= self.options.min_voting_score)
            .sorted_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(a.id.cmp(&b.id)))
            .collect_vec();

        let n_debates = debates.len();
        let n_voting = voting.len();
        tracing::info!("Allocating {} voting adjudicators to {} debates", n_voting, n_debates);

        if n_voting < n_debates {
            tracing::warn!("There are {} debates but only {} voting adjudicators", n_debates, n_voting);
        }

        let n_chairs = n_debates.min(n_voting);
        let n_panels = n_debates.min((n_voting - n_chairs) / 2);

        let chairs = &voting[..n_chairs];
        let panellists = &voting[n_chairs..n_chairs + 2 * n_panels];

        let chair_assignments = self.assign(chairs, &debates[..n_chairs], 1, input)?;
        let panel_assignments = self.assign(panellists, &debates[..n_panels], 2, input)?;

        let mut assignments = chair_assignments.into_iter()
            .map(|(debate_id, adjudicator_id)| PanelAssignment { debate_id, adjudicator_id, position: AdjudicatorPosition::Chair })
            .chain(
                panel_assignments.into_iter()
                .map(|(debate_id, adjudicator_id)| PanelAssignment { debate_id, adjudicator_id, position: AdjudicatorPosition::Panellist })
            ).collect_vec();

        let debate_order = debates.iter().enumerate().map(|(idx, d)| (d.id, idx)).collect::<std::collections::HashMap<_, _>>();
        assignments.sort_by_key(|a| (debate_order.get(&a.debate_id).copied().unwrap_or(usize::MAX), a.position, a.adjudicator_id));

        Ok(assignments)
    }
}


#[cfg(test)]
mod test {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::datastructures::TeamInfo;

    fn debate(id: u128, importance: i32, room_rank: i32, teams: Vec<(u128, Option<u128>)>) -> DebateInfo {
        DebateInfo {
            id: Uuid::from_u128(id),
            importance,
            room_rank,
            teams: teams.into_iter().map(|(team, institution)| TeamInfo {
                id: Uuid::from_u128(team),
                institution_id: institution.map(Uuid::from_u128),
            }).collect(),
        }
    }

    fn adjudicator(id: u128, score: f64) -> AdjudicatorInfo {
        AdjudicatorInfo::new(Uuid::from_u128(id), score)
    }

    fn panel_of(assignments: &[PanelAssignment], debate: u128) -> Vec<(u128, AdjudicatorPosition)> {
        assignments.iter()
            .filter(|a| a.debate_id == Uuid::from_u128(debate))
            .map(|a| (a.adjudicator_id.as_u128(), a.position))
            .collect()
    }

    #[test]
    fn test_best_chair_goes_to_most_important_debate() {
        let input = AllocationInput {
            debates: vec![
                debate(1, 0, 1, vec![]),
                debate(2, 2, 2, vec![]),
            ],
            adjudicators: vec![adjudicator(10, 4.0), adjudicator(11, 2.0)],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::default().allocate(&input).unwrap();

        assert_eq!(panel_of(&assignments, 2), vec![(10, AdjudicatorPosition::Chair)]);
        assert_eq!(panel_of(&assignments, 1), vec![(11, AdjudicatorPosition::Chair)]);
        assert_eq!(assignments[0].debate_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_chairs_avoid_conflicts() {
        let mut conflicted = adjudicator(10, 5.0);
        conflicted.team_conflicts = HashSet::from([Uuid::from_u128(100)]);
        let input = AllocationInput {
            debates: vec![
                debate(1, 0, 1, vec![(100, None), (101, None)]),
                debate(2, 0, 2, vec![(102, None), (103, None)]),
            ],
            adjudicators: vec![conflicted, adjudicator(11, 5.0)],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::default().allocate(&input).unwrap();

        assert_eq!(panel_of(&assignments, 1), vec![(11, AdjudicatorPosition::Chair)]);
        assert_eq!(panel_of(&assignments, 2), vec![(10, AdjudicatorPosition::Chair)]);
    }

    #[test]
    fn test_own_institution_counts_as_conflict_unless_independent() {
        let mut local = adjudicator(10, 5.0);
        local.institution_id = Some(Uuid::from_u128(500));
        let input = AllocationInput {
            debates: vec![
                debate(1, 0, 1, vec![(100, Some(500))]),
                debate(2, 0, 2, vec![(101, Some(501))]),
            ],
            adjudicators: vec![local.clone(), adjudicator(11, 5.0)],
            history: HashMap::new(),
        };
        let allocator = HungarianAllocator::default();

        assert_eq!(allocator.calc_cost(&local, &input.debates[0], &input), 1_000_000);
        let assignments = allocator.allocate(&input).unwrap();
        assert_eq!(panel_of(&assignments, 2), vec![(10, AdjudicatorPosition::Chair)]);

        local.independent = true;
        assert_eq!(allocator.calc_cost(&local, &input.debates[0], &input), 0);
    }

    #[test]
    fn test_history_is_penalized() {
        let input = AllocationInput {
            debates: vec![debate(1, 0, 1, vec![(100, None), (101, None)])],
            adjudicators: vec![adjudicator(10, 3.0)],
            history: HashMap::from([((Uuid::from_u128(10), Uuid::from_u128(100)), 2)]),
        };
        let allocator = HungarianAllocator::default();

        // 2 * 10000 for history, (0 + 3) * 200 for the score gap
        assert_eq!(allocator.calc_cost(&input.adjudicators[0], &input.debates[0], &input), 20_600);
    }

    #[test]
    fn test_panels_get_two_panellists() {
        let input = AllocationInput {
            debates: vec![
                debate(1, 0, 1, vec![]),
                debate(2, 0, 2, vec![]),
                debate(3, 0, 3, vec![]),
            ],
            adjudicators: (0..7).map(|i| adjudicator(10 + i, 5.0 - i as f64 * 0.5)).collect(),
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::default().allocate(&input).unwrap();

        // 7 voting adjudicators: 3 chairs, 2 panels of 2 and 0 left over.
        assert_eq!(assignments.len(), 7);
        assert_eq!(panel_of(&assignments, 1).len(), 3);
        assert_eq!(panel_of(&assignments, 2).len(), 3);
        assert_eq!(panel_of(&assignments, 3).len(), 1);
        let chairs = assignments.iter().filter(|a| a.position == AdjudicatorPosition::Chair).map(|a| a.adjudicator_id.as_u128()).sorted().collect_vec();
        assert_eq!(chairs, vec![10, 11, 12]);
    }

    #[test]
    fn test_trainees_are_not_allocated() {
        let input = AllocationInput {
            debates: vec![debate(1, 0, 1, vec![])],
            adjudicators: vec![adjudicator(10, 1.0), adjudicator(11, 1.4)],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::default().allocate(&input).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_too_few_adjudicators_leave_debates_without_chair() {
        let input = AllocationInput {
            debates: vec![
                debate(1, 0, 1, vec![]),
                debate(2, 1, 2, vec![]),
            ],
            adjudicators: vec![adjudicator(10, 3.0)],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::default().allocate(&input).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(panel_of(&assignments, 2), vec![(10, AdjudicatorPosition::Chair)]);
    }

    #[test]
    fn test_scores_are_clamped() {
        let input = AllocationInput {
            debates: vec![debate(1, 0, 1, vec![])],
            adjudicators: vec![adjudicator(10, 9.0)],
            history: HashMap::new(),
        };
        let allocator = HungarianAllocator::default();
        assert_eq!(allocator.calc_cost(&input.adjudicators[0], &input.debates[0], &input), 0);
    }

    #[test]
    fn test_invalid_score_range_is_rejected() {
        let options = HungarianOptions { min_score: 5.0, max_score: 5.0, ..Default::default() };
        assert!(matches!(HungarianAllocator::new(options), Err(AllocationError::InvalidPreferences(_))));
    }

    #[test]
    fn test_trainee_threshold_uses_raw_score() {
        let options = HungarianOptions { min_score: 2.0, ..Default::default() };
        let input = AllocationInput {
            debates: vec![debate(1, 0, 1, vec![])],
            adjudicators: vec![adjudicator(10, 1.0)],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::new(options).unwrap().allocate(&input).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_maximum_penalty_still_seats_conflicted_chair() {
        let options = HungarianOptions { conflict_penalty: MAX_PENALTY, ..Default::default() };
        let mut conflicted = adjudicator(10, 4.0);
        conflicted.team_conflicts = HashSet::from([Uuid::from_u128(100)]);
        let input = AllocationInput {
            debates: vec![debate(1, 0, 1, vec![(100, None), (101, None)])],
            adjudicators: vec![conflicted],
            history: HashMap::new(),
        };

        let assignments = HungarianAllocator::new(options).unwrap().allocate(&input).unwrap();
        assert_eq!(panel_of(&assignments, 1), vec![(10, AdjudicatorPosition::Chair)]);
    }

    #[test]
    fn test_maximum_penalties_fill_every_chair_and_panel() {
        let options = HungarianOptions { conflict_penalty: MAX_PENALTY, history_penalty: MAX_PENALTY, ..Default::default() };
        let mut adjudicators = (0..6).map(|i| adjudicator(10 + i, 5.0 - i as f64 * 0.5)).collect_vec();
        for adj in adjudicators.iter_mut() {
            adj.team_conflicts = HashSet::from([Uuid::from_u128(100), Uuid::from_u128(102)]);
        }
        let input = AllocationInput {
            debates: vec![
                debate(1, 1, 1, vec![(100, None), (101, None)]),
                debate(2, 0, 2, vec![(102, None), (103, None)]),
            ],
            adjudicators,
            history: HashMap::from([((Uuid::from_u128(10), Uuid::from_u128(101)), 3)]),
        };

        let assignments = HungarianAllocator::new(options).unwrap().allocate(&input).unwrap();
        assert_eq!(assignments.len(), 6);
        assert_eq!(panel_of(&assignments, 1).len(), 3);
        assert_eq!(panel_of(&assignments, 2).len(), 3);
    }

    #[test]
    fn test_scaling_keeps_costs_below_limit() {
        let mut costs = vec![3_000_000_000, 1_000_000_000, 600, 0];
        scale_costs(&mut costs, 1_000_000);
        assert!(costs.iter().all(|c| *c <= 1_000_000));
        assert!(costs[0] > costs[1]);
        assert_eq!(costs[3], 0);

        let mut small = vec![600, 0];
        scale_costs(&mut small, 1_000_000);
        assert_eq!(small, vec![600, 0]);
    }

    #[test]
    fn test_out_of_range_penalty_is_rejected() {
        let options = HungarianOptions { conflict_penalty: MAX_PENALTY + 1, ..Default::default() };
        assert!(matches!(HungarianAllocator::new(options), Err(AllocationError::InvalidPreferences(_))));

        let options = HungarianOptions { history_penalty: -1, ..Default::default() };
        assert!(matches!(HungarianAllocator::new(options), Err(AllocationError::InvalidPreferences(_))));
    }
}
