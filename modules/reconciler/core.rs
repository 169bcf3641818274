//! Pure export state assessment

use chrono::{DateTime, SecondsFormat, Utc};

use crate::modules::error::{ExportError, ExportResult};
use crate::modules::marker::{Marker, MarkerScan, StartedMarker};

use super::layout::LedgerLayout;
use super::types::{Assessment, ExportPlan, Relocation, TimeWindow};

/// Infer the export state from a scan.
///
/// Any started marker without a completed marker of the same group blocks
/// planning, whether or not its body could be decoded. Otherwise the next
/// window starts at the latest end time across every readable started marker
/// (or `epoch` when there are none) and ends at `now`.
pub fn reconcile(
    scan: &MarkerScan,
    now: DateTime<Utc>,
    epoch: DateTime<Utc>,
    layout: &LedgerLayout,
) -> ExportResult<Assessment> {
    let running = in_progress(scan);
    let unreadable = unreadable_in_progress(scan);
    if !running.is_empty() || !unreadable.is_empty() {
        return Ok(Assessment::InProgress { running, unreadable });
    }

    let window = next_window(scan, now, epoch)?;
    let archive = archive_moves(scan, layout);

    Ok(Assessment::Ready(ExportPlan { window, archive }))
}

/// Started markers that have no completed counterpart
pub fn in_progress(scan: &MarkerScan) -> Vec<StartedMarker> {
    scan.started
        .iter()
        .filter(|started| !scan.has_completed(started.group()))
        .cloned()
        .collect()
}

/// Malformed started markers that have no completed counterpart
pub fn unreadable_in_progress(scan: &MarkerScan) -> Vec<Marker> {
    scan.malformed_started
        .iter()
        .filter(|marker| !scan.has_completed(&marker.group))
        .cloned()
        .collect()
}

/// Completed markers whose started marker is not under the prefix
pub fn orphaned_completed(scan: &MarkerScan) -> Vec<&Marker> {
    scan.completed
        .iter()
        .filter(|completed| {
            !scan.started.iter().any(|s| s.group() == &completed.group)
                && !scan.malformed_started.iter().any(|m| m.group == completed.group)
        })
        .collect()
}

/// The window following everything already requested
pub fn next_window(
    scan: &MarkerScan,
    now: DateTime<Utc>,
    epoch: DateTime<Utc>,
) -> ExportResult<TimeWindow> {
    let inclusive_start = scan
        .started
        .iter()
        .map(StartedMarker::exclusive_end_time)
        .max()
        .unwrap_or(epoch);

    if inclusive_start >= now {
        return Err(ExportError::EmptyWindow {
            start: inclusive_start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        });
    }

    Ok(TimeWindow {
        inclusive_start,
        exclusive_end: now,
    })
}

fn archive_moves(scan: &MarkerScan, layout: &LedgerLayout) -> Vec<Relocation> {
    let mut moves = Vec::new();

    for started in &scan.started {
        let end = started.exclusive_end_time();

        for completed in scan.completed_for(started.group()) {
            moves.push(Relocation {
                source_key: completed.key.clone(),
                destination_key: layout.archive_key(&completed.key, end),
            });
        }

        moves.push(Relocation {
            source_key: started.key().to_string(),
            destination_key: layout.archive_key(started.key(), end),
        });
    }

    moves
}
