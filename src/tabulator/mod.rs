pub mod irv;
pub mod opl;

use crate::audit::Tabulation;
use crate::model::{Election, ElectionKind};
use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] crate::rational::ArithmeticError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;

/// Run the engine matching the election's counting method. Each call owns a
/// fresh engine; nothing is shared across runs except the caller's RNG.
pub fn tabulate<R: Rng>(election: Election, rng: &mut R) -> Result<Tabulation> {
    let Election { candidates, kind } = election;
    match kind {
        ElectionKind::InstantRunoff { ballots } => {
            irv::Runoff::new(candidates, ballots, rng)?.run()
        }
        ElectionKind::OpenPartyList { seats, ballots } => {
            opl::Apportionment::new(&candidates, seats, &ballots, rng)?.run()
        }
    }
}
