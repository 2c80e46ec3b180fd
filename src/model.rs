use serde::Serialize;

/// Index of a candidate within an election's candidate list.
pub type CandidateId = usize;

/// A candidate as declared on the header line. Identity is by value
/// (name plus party); instant-runoff candidates may carry no party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, party: Option<String>) -> Self {
        Candidate {
            name: name.into(),
            party,
        }
    }
}

/// A ranked ballot with a cursor that advances monotonically over its
/// choices and never resets. The ballot is exhausted once the cursor has
/// passed the last ranked candidate.
#[derive(Debug, Clone)]
pub struct RankedBallot {
    ordinal: usize,
    choices: Vec<CandidateId>,
    cursor: usize,
}

impl RankedBallot {
    /// `choices` is ordered by rank, most preferred first.
    pub fn new(ordinal: usize, choices: Vec<CandidateId>) -> Self {
        RankedBallot {
            ordinal,
            choices,
            cursor: 0,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Advance the cursor and return the next ranked candidate, or `None`
    /// when the ballot is exhausted.
    pub fn next_choice(&mut self) -> Option<CandidateId> {
        let choice = self.choices.get(self.cursor).copied();
        if choice.is_some() {
            self.cursor += 1;
        }
        choice
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.choices.len()
    }
}

/// A fully parsed election: the candidate list plus method-specific ballots.
/// The variant tag replaces the header-string dispatch of the text format;
/// the parser resolves it before any engine is constructed.
#[derive(Debug)]
pub struct Election {
    pub candidates: Vec<Candidate>,
    pub kind: ElectionKind,
}

#[derive(Debug)]
pub enum ElectionKind {
    InstantRunoff {
        ballots: Vec<RankedBallot>,
    },
    OpenPartyList {
        seats: usize,
        /// One selected candidate per ballot.
        ballots: Vec<CandidateId>,
    },
}

impl Election {
    pub fn total_ballots(&self) -> usize {
        match &self.kind {
            ElectionKind::InstantRunoff { ballots } => ballots.len(),
            ElectionKind::OpenPartyList { ballots, .. } => ballots.len(),
        }
    }
}
