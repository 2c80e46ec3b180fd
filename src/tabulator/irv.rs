//! Instant-runoff tabulation: per-candidate ballot queues, majority and
//! elimination rounds, and redistribution of an eliminated candidate's
//! ballots to each ballot's next still-active choice.

use super::{Result, TallyError};
use crate::audit::{
    AuditEvent, CandidateCount, ElectionResult, RunoffOutcome, Tabulation, TieStake, WinKind,
};
use crate::model::{Candidate, CandidateId, RankedBallot};
use crate::tiebreak;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

pub struct Runoff<'r, R: Rng> {
    rng: &'r mut R,
    candidates: Vec<Candidate>,
    /// Active candidates in declaration order; a candidate leaves exactly
    /// once, at elimination.
    active: Vec<CandidateId>,
    queues: HashMap<CandidateId, VecDeque<RankedBallot>>,
    total_ballots: usize,
    exhausted: usize,
    events: Vec<AuditEvent>,
}

impl<'r, R: Rng> Runoff<'r, R> {
    pub fn new(
        candidates: Vec<Candidate>,
        ballots: Vec<RankedBallot>,
        rng: &'r mut R,
    ) -> Result<Self> {
        if candidates.is_empty() {
            return Err(TallyError::InvalidConfiguration(
                "an election must have at least one candidate".into(),
            ));
        }
        let active: Vec<CandidateId> = (0..candidates.len()).collect();
        let mut queues: HashMap<CandidateId, VecDeque<RankedBallot>> = active
            .iter()
            .map(|&id| (id, VecDeque::new()))
            .collect();
        let total_ballots = ballots.len();
        let mut exhausted = 0;
        for mut ballot in ballots {
            match ballot.next_choice() {
                Some(first) => queues
                    .get_mut(&first)
                    .ok_or_else(|| {
                        TallyError::InvalidConfiguration(format!(
                            "ballot {} ranks an unknown candidate",
                            ballot.ordinal()
                        ))
                    })?
                    .push_back(ballot),
                // A ballot ranking no one never contributes to any queue.
                None => exhausted += 1,
            }
        }
        Ok(Runoff {
            rng,
            candidates,
            active,
            queues,
            total_ballots,
            exhausted,
            events: Vec::new(),
        })
    }

    /// Drive rounds until a winner emerges. Consumes the engine, so results
    /// cannot be observed before the run completes.
    pub fn run(mut self) -> Result<Tabulation> {
        let mut round = 0;
        let outcome = loop {
            round += 1;
            let counts = self
                .active
                .iter()
                .map(|&id| CandidateCount {
                    candidate: self.candidates[id].name.clone(),
                    ballots: self.queue_len(id),
                })
                .collect();
            self.events.push(AuditEvent::RoundTally { round, counts });

            match self.active.len() {
                0 => {
                    // Every ballot exhausted before anyone won; with a
                    // nonempty candidate list this cannot happen, since the
                    // last active candidate wins trivially.
                    return Err(TallyError::InvalidConfiguration(
                        "no active candidates remain".into(),
                    ));
                }
                1 => break self.outcome(self.active[0], WinKind::Majority, round),
                2 => {
                    if let Some(winner) = self.head_to_head() {
                        break self.outcome(winner, WinKind::Popularity, round);
                    }
                }
                _ => {
                    if let Some(winner) = self.majority_winner(round) {
                        break self.outcome(winner, WinKind::Majority, round);
                    }
                }
            }

            let loser = self.choose_loser();
            self.events.push(AuditEvent::CandidateEliminated {
                round,
                candidate: self.candidates[loser].name.clone(),
            });
            self.eliminate(loser);
        };

        Ok(Tabulation {
            events: self.events,
            result: ElectionResult::InstantRunoff(outcome),
        })
    }

    fn queue_len(&self, id: CandidateId) -> usize {
        self.queues.get(&id).map_or(0, |queue| queue.len())
    }

    /// With exactly two candidates left, the larger queue wins outright and
    /// an exact tie is settled by a single random draw.
    fn head_to_head(&mut self) -> Option<CandidateId> {
        let (a, b) = (self.active[0], self.active[1]);
        let (count_a, count_b) = (self.queue_len(a), self.queue_len(b));
        if count_a != count_b {
            return Some(if count_a > count_b { a } else { b });
        }
        let mut pair = vec![a, b];
        let winner = tiebreak::draw(&mut pair, self.rng)?;
        self.events.push(AuditEvent::TieResolved {
            among: vec![
                self.candidates[a].name.clone(),
                self.candidates[b].name.clone(),
            ],
            chosen: self.candidates[winner].name.clone(),
            stake: TieStake::Winner,
        });
        Some(winner)
    }

    /// Strict integer majority of the ORIGINAL ballot total, exhausted
    /// ballots included in the denominator.
    fn majority_winner(&mut self, round: usize) -> Option<CandidateId> {
        let threshold = self.total_ballots / 2;
        let leader = self
            .active
            .iter()
            .copied()
            .max_by_key(|&id| self.queue_len(id))?;
        let ballots = self.queue_len(leader);
        if ballots > threshold {
            self.events.push(AuditEvent::MajorityReached {
                round,
                candidate: self.candidates[leader].name.clone(),
                ballots,
                threshold,
            });
            Some(leader)
        } else {
            None
        }
    }

    /// Collect the candidates tied at the minimum queue size and draw the
    /// one to eliminate.
    fn choose_loser(&mut self) -> CandidateId {
        let mut by_count: Vec<CandidateId> = self.active.clone();
        by_count.sort_by_key(|&id| self.queue_len(id));
        let run = {
            let queues = &self.queues;
            tiebreak::equal_run(&by_count, 0, |&id| {
                queues.get(&id).map_or(0, |queue| queue.len())
            })
        };
        let mut group: Vec<CandidateId> = by_count[run].to_vec();
        let tied = group.len() > 1;
        let among: Vec<String> = group
            .iter()
            .map(|&id| self.candidates[id].name.clone())
            .collect();
        // The group is never empty: active is nonempty on every path here.
        let loser = tiebreak::draw(&mut group, self.rng).unwrap_or(by_count[0]);
        if tied {
            self.events.push(AuditEvent::TieResolved {
                among,
                chosen: self.candidates[loser].name.clone(),
                stake: TieStake::Elimination,
            });
        }
        loser
    }

    /// Remove `loser` from the active set and redistribute its queue. Each
    /// ballot's cursor advances past already-eliminated candidates to the
    /// next active choice; a ballot that runs out of choices is dropped and
    /// never redistributed again.
    fn eliminate(&mut self, loser: CandidateId) {
        self.active.retain(|&id| id != loser);
        let queue = self.queues.remove(&loser).unwrap_or_default();
        let from = self.candidates[loser].name.clone();
        for mut ballot in queue {
            loop {
                match ballot.next_choice() {
                    Some(next) => {
                        if let Some(target) = self.queues.get_mut(&next) {
                            self.events.push(AuditEvent::BallotTransferred {
                                ballot: ballot.ordinal(),
                                from: from.clone(),
                                to: self.candidates[next].name.clone(),
                            });
                            target.push_back(ballot);
                            break;
                        }
                        // Already eliminated; keep advancing.
                    }
                    None => {
                        self.exhausted += 1;
                        self.events.push(AuditEvent::BallotExhausted {
                            ballot: ballot.ordinal(),
                            from: from.clone(),
                        });
                        break;
                    }
                }
            }
        }
    }

    fn outcome(&self, winner: CandidateId, kind: WinKind, rounds: usize) -> RunoffOutcome {
        RunoffOutcome {
            winner: self.candidates[winner].name.clone(),
            kind,
            rounds,
            winner_ballots: self.queue_len(winner),
            exhausted_ballots: self.exhausted,
            total_ballots: self.total_ballots,
        }
    }
}
