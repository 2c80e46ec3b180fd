//! Human-readable rendering of a tabulation: fixed-width box-drawing tables
//! built purely from the audit trail and result record.

use crate::audit::{
    AuditEvent, ElectionResult, RunoffOutcome, SeatTable, Tabulation, WinKind,
};
use colored::Colorize;
use itertools::Itertools;

pub fn render(tabulation: &Tabulation) -> String {
    match &tabulation.result {
        ElectionResult::OpenPartyList(table) => render_seat_table(table),
        ElectionResult::InstantRunoff(outcome) => {
            render_runoff(&tabulation.events, outcome)
        }
    }
}

fn render_seat_table(table: &SeatTable) -> String {
    let headers = [
        "Party",
        "Ballots",
        "Initial Seats",
        "Remainder",
        "Final Seats",
        "Seated Candidates",
    ];
    let rows: Vec<Vec<String>> = table
        .parties
        .iter()
        .map(|party| {
            vec![
                party.party.clone(),
                party.ballots.to_string(),
                party.initial_seats.to_string(),
                party.remainder.to_string(),
                party.final_seats.to_string(),
                party.seated.iter().join(", "),
            ]
        })
        .collect();

    let mut out = format!("Quota: {} ballots per seat\n", table.quota);
    out.push_str(&draw_table(&headers, &rows));
    if table.unallocated > 0 {
        out.push_str(&format!(
            "{}\n",
            format!(
                "{} of {} seats could not be distributed: every party is at its candidate limit",
                table.unallocated, table.total_seats
            )
            .yellow()
        ));
    }
    out
}

fn render_runoff(events: &[AuditEvent], outcome: &RunoffOutcome) -> String {
    // Column per candidate, in first-round order; row per round.
    let first_round = events.iter().find_map(|event| match event {
        AuditEvent::RoundTally { counts, .. } => Some(counts),
        _ => None,
    });
    let candidates: Vec<String> = first_round
        .map(|counts| counts.iter().map(|c| c.candidate.clone()).collect())
        .unwrap_or_default();

    let mut headers = vec!["Round".to_string()];
    headers.extend(candidates.iter().cloned());
    let mut rows = Vec::new();
    for event in events {
        if let AuditEvent::RoundTally { round, counts } = event {
            let mut row = vec![round.to_string()];
            for name in &candidates {
                let cell = counts
                    .iter()
                    .find(|c| &c.candidate == name)
                    .map(|c| c.ballots.to_string())
                    .unwrap_or_else(|| "-".to_string());
                row.push(cell);
            }
            rows.push(row);
        }
    }

    let mut out = draw_table(&headers, &rows);
    let how = match outcome.kind {
        WinKind::Majority => "by majority",
        WinKind::Popularity => "by popularity",
    };
    out.push_str(&format!(
        "Winner: {} ({}, {} of {} ballots, {} exhausted)\n",
        outcome.winner.as_str().green().bold(),
        how,
        outcome.winner_ballots,
        outcome.total_ballots,
        outcome.exhausted_ballots
    ));
    out
}

/// Draw a box table. Headers and cells are measured uncolored so the frame
/// stays aligned.
fn draw_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.as_ref().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&frame_line(&widths, '┌', '┬', '┐'));
    out.push_str(&row_line(
        &widths,
        &headers.iter().map(|h| h.as_ref().to_string()).collect::<Vec<_>>(),
    ));
    out.push_str(&frame_line(&widths, '├', '┼', '┤'));
    for row in rows {
        out.push_str(&row_line(&widths, row));
    }
    out.push_str(&frame_line(&widths, '└', '┴', '┘'));
    out
}

fn frame_line(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (column, width) in widths.iter().enumerate() {
        if column > 0 {
            line.push(mid);
        }
        for _ in 0..width + 2 {
            line.push('─');
        }
    }
    line.push(right);
    line.push('\n');
    line
}

fn row_line(widths: &[usize], cells: &[String]) -> String {
    let mut line = String::new();
    line.push('│');
    for (column, width) in widths.iter().enumerate() {
        let cell = cells.get(column).map(String::as_str).unwrap_or("");
        line.push_str(&format!(" {:<w$} ", cell, w = *width));
        line.push('│');
    }
    line.push('\n');
    line
}
