//! Line-oriented election file parser.
//!
//! ```text
//! IR                              OPL
//! 4                               6
//! Rosen (D), Kleinberg (R), ...   [Pike,D], [Foster,D], [Borg,R], ...
//! 4                               3
//! 1,3,4,2                         9
//! ...                             ,1,,,,
//! ```
//!
//! An IR ballot gives an optional rank per candidate column; an OPL ballot
//! marks exactly one column. The parser checks counts and referential
//! integrity so the engines never have to.

use crate::model::{Candidate, CandidateId, Election, ElectionKind, RankedBallot};
use std::io::BufRead;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("unknown counting method: {0}")]
    UnknownMethod(String),
    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

struct Lines<B> {
    reader: B,
    line: usize,
}

impl<B: BufRead> Lines<B> {
    fn next_line(&mut self) -> ParseResult<String> {
        let mut buffer = String::new();
        if self.reader.read_line(&mut buffer)? == 0 {
            return Err(ParseError::UnexpectedEof);
        }
        self.line += 1;
        Ok(buffer.trim_end_matches(|c| c == '\n' || c == '\r').to_string())
    }

    fn next_count(&mut self, what: &str) -> ParseResult<usize> {
        let text = self.next_line()?;
        text.trim().parse().map_err(|_| ParseError::Invalid {
            line: self.line,
            message: format!("expected {}, found {:?}", what, text),
        })
    }

    fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::Invalid {
            line: self.line,
            message: message.into(),
        }
    }
}

/// Parse a complete election file from any buffered reader.
pub fn parse_election<B: BufRead>(reader: B) -> ParseResult<Election> {
    let mut lines = Lines { reader, line: 0 };
    let header = lines.next_line()?;
    match header.trim() {
        "IR" => parse_instant_runoff(&mut lines),
        "OPL" => parse_open_party_list(&mut lines),
        other => Err(ParseError::UnknownMethod(other.to_string())),
    }
}

fn parse_instant_runoff<B: BufRead>(lines: &mut Lines<B>) -> ParseResult<Election> {
    let candidate_count = lines.next_count("a candidate count")?;
    let candidates = parse_ir_candidates(lines, candidate_count)?;
    let ballot_count = lines.next_count("a ballot count")?;
    let mut ballots = Vec::with_capacity(ballot_count);
    for ordinal in 1..=ballot_count {
        let row = lines.next_line()?;
        ballots.push(parse_ir_ballot(lines, &row, ordinal, candidate_count)?);
    }
    Ok(Election {
        candidates,
        kind: ElectionKind::InstantRunoff { ballots },
    })
}

fn parse_open_party_list<B: BufRead>(lines: &mut Lines<B>) -> ParseResult<Election> {
    let candidate_count = lines.next_count("a candidate count")?;
    let candidates = parse_opl_candidates(lines, candidate_count)?;
    let seats = lines.next_count("a seat count")?;
    let ballot_count = lines.next_count("a ballot count")?;
    let mut ballots = Vec::with_capacity(ballot_count);
    for _ in 0..ballot_count {
        let row = lines.next_line()?;
        ballots.push(parse_opl_ballot(lines, &row, candidate_count)?);
    }
    Ok(Election {
        candidates,
        kind: ElectionKind::OpenPartyList { seats, ballots },
    })
}

/// `Rosen (D), Kleinberg (R)`; the parenthesized party is optional.
fn parse_ir_candidates<B: BufRead>(
    lines: &mut Lines<B>,
    expected: usize,
) -> ParseResult<Vec<Candidate>> {
    let row = lines.next_line()?;
    let mut candidates = Vec::new();
    for entry in row.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(lines.invalid("empty candidate entry"));
        }
        let candidate = match (entry.find('('), entry.rfind(')')) {
            (Some(open), Some(close)) if open < close => Candidate::new(
                entry[..open].trim(),
                Some(entry[open + 1..close].trim().to_string()),
            ),
            (None, None) => Candidate::new(entry, None),
            _ => {
                return Err(lines.invalid(format!("malformed candidate entry {:?}", entry)));
            }
        };
        candidates.push(candidate);
    }
    if candidates.len() != expected {
        return Err(lines.invalid(format!(
            "expected {} candidates, found {}",
            expected,
            candidates.len()
        )));
    }
    Ok(candidates)
}

/// `[Pike,D], [Foster,D]`; every candidate must carry a party.
fn parse_opl_candidates<B: BufRead>(
    lines: &mut Lines<B>,
    expected: usize,
) -> ParseResult<Vec<Candidate>> {
    let row = lines.next_line()?;
    let mut candidates = Vec::new();
    let mut rest = row.as_str();
    while let Some(open) = rest.find('[') {
        let close = rest[open..]
            .find(']')
            .map(|i| open + i)
            .ok_or_else(|| lines.invalid("unclosed candidate bracket"))?;
        let inner = &rest[open + 1..close];
        let mut parts = inner.splitn(2, ',');
        let name = parts.next().unwrap_or("").trim();
        let party = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                lines.invalid(format!("candidate {:?} is missing a party", inner))
            })?;
        if name.is_empty() {
            return Err(lines.invalid("candidate with an empty name"));
        }
        candidates.push(Candidate::new(name, Some(party.to_string())));
        rest = &rest[close + 1..];
    }
    if candidates.len() != expected {
        return Err(lines.invalid(format!(
            "expected {} candidates, found {}",
            expected,
            candidates.len()
        )));
    }
    Ok(candidates)
}

/// One optional rank per candidate column, normalized into a sequence of
/// candidate ids ordered by rank.
fn parse_ir_ballot<B: BufRead>(
    lines: &Lines<B>,
    row: &str,
    ordinal: usize,
    candidate_count: usize,
) -> ParseResult<RankedBallot> {
    let columns: Vec<&str> = row.split(',').map(str::trim).collect();
    if columns.len() != candidate_count {
        return Err(lines.invalid(format!(
            "expected {} columns, found {}",
            candidate_count,
            columns.len()
        )));
    }
    let mut ranked: Vec<(usize, CandidateId)> = Vec::new();
    for (id, column) in columns.iter().enumerate() {
        if column.is_empty() {
            continue;
        }
        let rank: usize = column.parse().map_err(|_| {
            lines.invalid(format!("invalid rank {:?}", column))
        })?;
        if rank == 0 || rank > candidate_count {
            return Err(lines.invalid(format!("rank {} out of range", rank)));
        }
        ranked.push((rank, id));
    }
    if ranked.is_empty() {
        return Err(lines.invalid("ballot ranks no candidates"));
    }
    ranked.sort_by_key(|(rank, _)| *rank);
    for pair in ranked.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(lines.invalid(format!("duplicate rank {}", pair[0].0)));
        }
    }
    Ok(RankedBallot::new(
        ordinal,
        ranked.into_iter().map(|(_, id)| id).collect(),
    ))
}

/// Exactly one marked column.
fn parse_opl_ballot<B: BufRead>(
    lines: &Lines<B>,
    row: &str,
    candidate_count: usize,
) -> ParseResult<CandidateId> {
    let columns: Vec<&str> = row.split(',').map(str::trim).collect();
    if columns.len() != candidate_count {
        return Err(lines.invalid(format!(
            "expected {} columns, found {}",
            candidate_count,
            columns.len()
        )));
    }
    let mut selected = None;
    for (id, column) in columns.iter().enumerate() {
        match *column {
            "" => {}
            "1" => {
                if selected.is_some() {
                    return Err(lines.invalid("ballot marks more than one candidate"));
                }
                selected = Some(id);
            }
            other => {
                return Err(lines.invalid(format!("unexpected mark {:?}", other)));
            }
        }
    }
    selected.ok_or_else(|| lines.invalid("ballot marks no candidate"))
}
