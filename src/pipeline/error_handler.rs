//! End-of-pass reporting of units that were skipped or failed.

use log::{info, warn};

use super::enrich::PassReport;

/// Log the outcome of one enrichment pass. Failed units were already warned about one by one;
/// with `verbose` they are listed again so the summary is self-contained.
pub fn report_skipped_units(pass_name: &str, report: &PassReport, verbose: bool) {
    info!(
        "{}: {} of {} described ({} empty, {} unsupported)",
        pass_name, report.described, report.units, report.empty, report.unsupported
    );
    if report.failed.is_empty() {
        return;
    }
    warn!(
        "{}: skipped {} unit(s) whose description failed",
        pass_name,
        report.failed.len()
    );
    if verbose {
        for (path, reason) in &report.failed {
            eprintln!("  skipped: {} ({})", path.display(), reason);
        }
    }
}
