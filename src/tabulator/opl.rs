//! Open-party-list seat apportionment: quota and largest-remainder
//! allocation across parties, then popularity-ordered seat assignment
//! within each party.

use super::{Result, TallyError};
use crate::audit::{
    AuditEvent, ElectionResult, PartySeats, SeatTable, Tabulation, TieStake,
};
use crate::model::{Candidate, CandidateId};
use crate::rational::Rational;
use crate::tiebreak;
use rand::Rng;
use std::collections::HashMap;

/// Running tally for one party. `candidates` is kept ascending by ballot
/// count, as the intra-party distribution scans it from the tail.
#[derive(Debug)]
struct PartyTally {
    party: String,
    ballots: usize,
    initial_seats: usize,
    seats: usize,
    remainder: Rational,
    candidates: Vec<(String, usize)>,
    seated: Vec<String>,
    saturated: bool,
}

impl PartyTally {
    fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

pub struct Apportionment<'r, R: Rng> {
    rng: &'r mut R,
    total_ballots: usize,
    total_seats: usize,
    parties: Vec<PartyTally>,
    events: Vec<AuditEvent>,
}

impl<'r, R: Rng> Apportionment<'r, R> {
    /// Group candidates by party and count each candidate's ballots. Parties
    /// appear in the order they first occur on the candidate line.
    pub fn new(
        candidates: &[Candidate],
        total_seats: usize,
        ballots: &[CandidateId],
        rng: &'r mut R,
    ) -> Result<Self> {
        if total_seats == 0 {
            return Err(TallyError::InvalidConfiguration(
                "an open-party-list election must have at least one seat".into(),
            ));
        }
        if candidates.is_empty() {
            return Err(TallyError::InvalidConfiguration(
                "an election must have at least one candidate".into(),
            ));
        }

        let mut counts = vec![0usize; candidates.len()];
        for &choice in ballots {
            counts[choice] += 1;
        }

        let mut parties: Vec<PartyTally> = Vec::new();
        let mut party_index: HashMap<String, usize> = HashMap::new();
        for (id, candidate) in candidates.iter().enumerate() {
            let party = candidate.party.clone().ok_or_else(|| {
                TallyError::InvalidConfiguration(format!(
                    "candidate {} has no party affiliation",
                    candidate.name
                ))
            })?;
            let slot = *party_index.entry(party.clone()).or_insert_with(|| {
                parties.push(PartyTally {
                    party,
                    ballots: 0,
                    initial_seats: 0,
                    seats: 0,
                    remainder: Rational::ZERO,
                    candidates: Vec::new(),
                    seated: Vec::new(),
                    saturated: false,
                });
                parties.len() - 1
            });
            parties[slot].ballots += counts[id];
            parties[slot].candidates.push((candidate.name.clone(), counts[id]));
        }
        for tally in &mut parties {
            tally.candidates.sort_by_key(|(_, count)| *count);
        }

        Ok(Apportionment {
            rng,
            total_ballots: ballots.len(),
            total_seats,
            parties,
            events: Vec::new(),
        })
    }

    pub fn run(mut self) -> Result<Tabulation> {
        let quota = Rational::new(self.total_ballots as i64, self.total_seats as i64)?;
        self.events.push(AuditEvent::QuotaComputed {
            total_ballots: self.total_ballots,
            total_seats: self.total_seats,
            quota,
        });

        let allocated = self.allocate_initial_seats(quota)?;
        let unallocated = self.allocate_remainder_seats(self.total_seats - allocated);
        self.assign_party_seats();

        let parties = self
            .parties
            .iter()
            .map(|tally| PartySeats {
                party: tally.party.clone(),
                ballots: tally.ballots,
                initial_seats: tally.initial_seats,
                remainder: tally.remainder,
                final_seats: tally.seats,
                seated: tally.seated.clone(),
            })
            .collect();

        Ok(Tabulation {
            events: self.events,
            result: ElectionResult::OpenPartyList(SeatTable {
                quota,
                total_seats: self.total_seats,
                unallocated,
                parties,
            }),
        })
    }

    /// Each party gets `floor(ballots / quota)` seats, capped at its
    /// candidate count, and keeps the exact leftover as its remainder.
    /// Returns the number of seats handed out.
    fn allocate_initial_seats(&mut self, quota: Rational) -> Result<usize> {
        let mut allocated = 0;
        for tally in &mut self.parties {
            let earned = if tally.ballots == 0 {
                0
            } else {
                Rational::from_integer(tally.ballots as i64)
                    .checked_div(quota)?
                    .whole_part() as usize
            };
            tally.seats = earned.min(tally.candidate_count());
            tally.initial_seats = tally.seats;
            tally.remainder = Rational::from_integer(tally.ballots as i64)
                - quota * Rational::from_integer(tally.seats as i64);
            tally.saturated = tally.seats == tally.candidate_count();
            allocated += tally.seats;
            self.events.push(AuditEvent::InitialAllocation {
                party: tally.party.clone(),
                ballots: tally.ballots,
                seats: tally.seats,
                remainder: tally.remainder,
                saturated: tally.saturated,
            });
        }
        Ok(allocated)
    }

    /// Hand out leftover seats by highest remainder, one at a time. A tied
    /// group at the maximal remainder is drawn down without replacement
    /// before the pool is re-sorted. Returns the seats left undistributed
    /// when every party saturates first.
    fn allocate_remainder_seats(&mut self, mut seats_remaining: usize) -> usize {
        while seats_remaining > 0 {
            let mut eligible: Vec<usize> = (0..self.parties.len())
                .filter(|&i| !self.parties[i].saturated)
                .collect();
            if eligible.is_empty() {
                self.events.push(AuditEvent::SeatShortage {
                    unallocated: seats_remaining,
                });
                break;
            }
            let parties = &self.parties;
            eligible.sort_by(|&a, &b| parties[b].remainder.cmp(&parties[a].remainder));
            let run = tiebreak::equal_run(&eligible, 0, |&i| parties[i].remainder);
            let mut group: Vec<usize> = eligible[run].to_vec();
            let tied = group.len() > 1;
            let among: Vec<String> = group
                .iter()
                .map(|&i| self.parties[i].party.clone())
                .collect();

            while seats_remaining > 0 {
                let index = match tiebreak::draw(&mut group, self.rng) {
                    Some(index) => index,
                    None => break,
                };
                if tied {
                    self.events.push(AuditEvent::TieResolved {
                        among: among.clone(),
                        chosen: self.parties[index].party.clone(),
                        stake: TieStake::RemainderSeat,
                    });
                }
                let tally = &mut self.parties[index];
                tally.seats += 1;
                seats_remaining -= 1;
                if tally.seats == tally.candidate_count() {
                    tally.saturated = true;
                }
                self.events.push(AuditEvent::RemainderSeatAwarded {
                    party: self.parties[index].party.clone(),
                    allocated: self.total_seats - seats_remaining,
                    total_seats: self.total_seats,
                });
            }
        }
        seats_remaining
    }

    /// Within each party, seats go to candidates by descending ballot count;
    /// a group tied at the current highest count is seated in random order.
    fn assign_party_seats(&mut self) {
        for slot in 0..self.parties.len() {
            let mut to_assign = self.parties[slot].seats;
            if to_assign == 0 {
                continue;
            }
            let ranked: Vec<(String, usize)> = self.parties[slot]
                .candidates
                .iter()
                .rev()
                .cloned()
                .collect();
            let mut start = 0;
            while to_assign > 0 && start < ranked.len() {
                let run = tiebreak::equal_run(&ranked, start, |c| c.1);
                start = run.end;
                let mut group: Vec<(String, usize)> = ranked[run].to_vec();
                let tied = group.len() > 1;
                let among: Vec<String> =
                    group.iter().map(|(name, _)| name.clone()).collect();
                while to_assign > 0 {
                    let (name, count) = match tiebreak::draw(&mut group, self.rng) {
                        Some(candidate) => candidate,
                        None => break,
                    };
                    if tied {
                        self.events.push(AuditEvent::TieResolved {
                            among: among.clone(),
                            chosen: name.clone(),
                            stake: TieStake::PartySeat,
                        });
                    }
                    self.events.push(AuditEvent::CandidateSeated {
                        party: self.parties[slot].party.clone(),
                        candidate: name.clone(),
                        ballots: count,
                    });
                    self.parties[slot].seated.push(name);
                    to_assign -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(name: &str, party: &str) -> Candidate {
        Candidate::new(name, Some(party.to_string()))
    }

    fn ballots_for(counts: &[(CandidateId, usize)]) -> Vec<CandidateId> {
        let mut ballots = Vec::new();
        for &(id, count) in counts {
            ballots.extend(std::iter::repeat(id).take(count));
        }
        ballots
    }

    fn seat_table(tabulation: Tabulation) -> SeatTable {
        match tabulation.result {
            ElectionResult::OpenPartyList(table) => table,
            _ => panic!("expected a seat table"),
        }
    }

    #[test]
    fn zero_seats_is_invalid() {
        let candidates = vec![candidate("Pike", "D")];
        let mut rng = StdRng::seed_from_u64(0);
        let result = Apportionment::new(&candidates, 0, &[], &mut rng);
        assert!(matches!(result, Err(TallyError::InvalidConfiguration(_))));
    }

    #[test]
    fn exact_quota_needs_no_remainder_round() {
        // 100 ballots over 10 seats: quota 10, every remainder 0.
        let candidates = vec![
            candidate("A1", "A"),
            candidate("A2", "A"),
            candidate("A3", "A"),
            candidate("A4", "A"),
            candidate("A5", "A"),
            candidate("B1", "B"),
            candidate("B2", "B"),
            candidate("B3", "B"),
            candidate("C1", "C"),
            candidate("C2", "C"),
        ];
        let ballots = ballots_for(&[(0, 50), (5, 30), (8, 20)]);
        let mut rng = StdRng::seed_from_u64(0);
        let tabulation = Apportionment::new(&candidates, 10, &ballots, &mut rng)
            .unwrap()
            .run()
            .unwrap();
        assert!(!tabulation
            .events
            .iter()
            .any(|e| matches!(e, AuditEvent::RemainderSeatAwarded { .. })));
        let table = seat_table(tabulation);
        assert_eq!(table.quota, Rational::from_integer(10));
        assert_eq!(table.unallocated, 0);
        let seats: Vec<(String, usize)> = table
            .parties
            .iter()
            .map(|p| (p.party.clone(), p.final_seats))
            .collect();
        assert_eq!(
            seats,
            vec![
                ("A".to_string(), 5),
                ("B".to_string(), 3),
                ("C".to_string(), 2)
            ]
        );
    }

    #[test]
    fn tied_remainders_award_exactly_one_seat() {
        // Two parties with 10 ballots each, one seat: quota 20, both get 0
        // initial seats and remainder 10. The single seat goes to exactly one.
        let candidates = vec![candidate("Pike", "D"), candidate("Borg", "R")];
        let ballots = ballots_for(&[(0, 10), (1, 10)]);
        let mut rng = StdRng::seed_from_u64(3);
        let table = seat_table(
            Apportionment::new(&candidates, 1, &ballots, &mut rng)
                .unwrap()
                .run()
                .unwrap(),
        );
        let total: usize = table.parties.iter().map(|p| p.final_seats).sum();
        assert_eq!(total, 1);
        assert!(table
            .parties
            .iter()
            .all(|p| p.final_seats == 0 || p.final_seats == 1));
        assert_eq!(table.unallocated, 0);
    }

    #[test]
    fn seats_never_exceed_candidate_count() {
        // One party, one candidate, three seats: party saturates after one
        // seat and the rest are a reported shortage.
        let candidates = vec![candidate("Solo", "S")];
        let ballots = ballots_for(&[(0, 9)]);
        let mut rng = StdRng::seed_from_u64(0);
        let tabulation = Apportionment::new(&candidates, 3, &ballots, &mut rng)
            .unwrap()
            .run()
            .unwrap();
        assert!(tabulation
            .events
            .iter()
            .any(|e| matches!(e, AuditEvent::SeatShortage { unallocated: 2 })));
        let table = seat_table(tabulation);
        assert_eq!(table.unallocated, 2);
        assert_eq!(table.parties[0].final_seats, 1);
        assert_eq!(table.parties[0].seated, vec!["Solo".to_string()]);
    }

    #[test]
    fn zero_initial_party_can_win_a_remainder_seat() {
        // Quota 31/3: X earns 2 seats (rem 4/3), Y earns 0 (rem 9).
        // The leftover seat goes to Y, whose remainder is larger.
        let candidates = vec![
            candidate("X1", "X"),
            candidate("X2", "X"),
            candidate("X3", "X"),
            candidate("Y1", "Y"),
        ];
        let ballots = ballots_for(&[(0, 22), (3, 9)]);
        let mut rng = StdRng::seed_from_u64(0);
        let table = seat_table(
            Apportionment::new(&candidates, 3, &ballots, &mut rng)
                .unwrap()
                .run()
                .unwrap(),
        );
        assert_eq!(table.parties[0].final_seats, 2);
        assert_eq!(table.parties[1].initial_seats, 0);
        assert_eq!(table.parties[1].final_seats, 1);
        assert_eq!(table.unallocated, 0);
    }

    #[test]
    fn intra_party_seats_follow_ballot_counts() {
        let candidates = vec![
            candidate("High", "P"),
            candidate("Mid", "P"),
            candidate("Low", "P"),
        ];
        let ballots = ballots_for(&[(0, 6), (1, 3), (2, 1)]);
        let mut rng = StdRng::seed_from_u64(0);
        let table = seat_table(
            Apportionment::new(&candidates, 2, &ballots, &mut rng)
                .unwrap()
                .run()
                .unwrap(),
        );
        assert_eq!(table.parties[0].final_seats, 2);
        assert_eq!(
            table.parties[0].seated,
            vec!["High".to_string(), "Mid".to_string()]
        );
    }

    #[test]
    fn final_seats_sum_to_total_without_shortage() {
        let candidates = vec![
            candidate("A1", "A"),
            candidate("A2", "A"),
            candidate("B1", "B"),
            candidate("B2", "B"),
            candidate("C1", "C"),
            candidate("C2", "C"),
        ];
        let ballots = ballots_for(&[(0, 7), (1, 4), (2, 5), (3, 1), (4, 3)]);
        let mut rng = StdRng::seed_from_u64(11);
        let table = seat_table(
            Apportionment::new(&candidates, 5, &ballots, &mut rng)
                .unwrap()
                .run()
                .unwrap(),
        );
        let total: usize = table.parties.iter().map(|p| p.final_seats).sum();
        assert_eq!(total + table.unallocated, 5);
        assert_eq!(table.unallocated, 0);
        for party in &table.parties {
            assert!(party.final_seats <= 2);
            assert_eq!(party.seated.len(), party.final_seats);
        }
    }
}
