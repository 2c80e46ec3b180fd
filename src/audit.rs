//! Structured audit trail emitted by the counting engines. The engines yield
//! plain data; rendering it as tables or JSON is the presentation layer's
//! concern.

use crate::rational::Rational;
use serde::Serialize;

/// One step of the tabulation, in the order it happened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AuditEvent {
    /// The open-party-list quota, computed once per election.
    #[serde(rename_all = "camelCase")]
    QuotaComputed {
        total_ballots: usize,
        total_seats: usize,
        quota: Rational,
    },
    /// A party's allocation before any remainder seats.
    #[serde(rename_all = "camelCase")]
    InitialAllocation {
        party: String,
        ballots: usize,
        seats: usize,
        remainder: Rational,
        saturated: bool,
    },
    /// One leftover seat awarded by highest remainder.
    #[serde(rename_all = "camelCase")]
    RemainderSeatAwarded {
        party: String,
        allocated: usize,
        total_seats: usize,
    },
    /// Remainder rounds ran out of eligible parties with seats left over.
    #[serde(rename_all = "camelCase")]
    SeatShortage { unallocated: usize },
    /// A party seat assigned to a specific candidate.
    #[serde(rename_all = "camelCase")]
    CandidateSeated {
        party: String,
        candidate: String,
        ballots: usize,
    },
    /// Per-candidate first-preference counts at the start of a runoff round.
    #[serde(rename_all = "camelCase")]
    RoundTally {
        round: usize,
        counts: Vec<CandidateCount>,
    },
    /// A candidate crossed the strict majority of the original ballot total.
    #[serde(rename_all = "camelCase")]
    MajorityReached {
        round: usize,
        candidate: String,
        ballots: usize,
        threshold: usize,
    },
    #[serde(rename_all = "camelCase")]
    CandidateEliminated { round: usize, candidate: String },
    /// A ballot moved from an eliminated candidate's queue to its next
    /// still-active choice.
    #[serde(rename_all = "camelCase")]
    BallotTransferred {
        ballot: usize,
        from: String,
        to: String,
    },
    /// A ballot ran out of ranked choices and was dropped for good.
    #[serde(rename_all = "camelCase")]
    BallotExhausted { ballot: usize, from: String },
    /// A tie resolved by random draw.
    #[serde(rename_all = "camelCase")]
    TieResolved {
        among: Vec<String>,
        chosen: String,
        stake: TieStake,
    },
}

/// What the randomly drawn party or candidate won (or lost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TieStake {
    /// Drawn candidate is eliminated from the runoff.
    Elimination,
    /// Drawn candidate wins the final head-to-head.
    Winner,
    /// Drawn party receives a leftover seat.
    RemainderSeat,
    /// Drawn candidate is seated within its party.
    PartySeat,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCount {
    pub candidate: String,
    pub ballots: usize,
}

/// Final apportionment for an open-party-list election.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatTable {
    pub quota: Rational,
    pub total_seats: usize,
    /// Seats that could not be distributed because every party saturated.
    pub unallocated: usize,
    pub parties: Vec<PartySeats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySeats {
    pub party: String,
    pub ballots: usize,
    pub initial_seats: usize,
    pub remainder: Rational,
    pub final_seats: usize,
    /// Seated candidates in the order their seats were assigned.
    pub seated: Vec<String>,
}

/// How an instant-runoff winner was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WinKind {
    /// Strict majority of the original ballot total, or last candidate
    /// standing.
    Majority,
    /// Larger queue in the final head-to-head.
    Popularity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunoffOutcome {
    pub winner: String,
    pub kind: WinKind,
    pub rounds: usize,
    pub winner_ballots: usize,
    pub exhausted_ballots: usize,
    pub total_ballots: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ElectionResult {
    InstantRunoff(RunoffOutcome),
    OpenPartyList(SeatTable),
}

/// Everything an engine produces for one run: the ordered audit trail plus
/// the final result record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabulation {
    pub events: Vec<AuditEvent>,
    pub result: ElectionResult,
}
