//! Human-readable rendering of linkage results.

use crate::domain::signature::FullyQualifiedMethodSignature;
use std::fmt::Write as _;

pub const UNRESOLVED_HEADER: &str = "There were unresolved method references from the jar file(s):";
pub const NO_UNRESOLVED_PREFIX: &str =
    "There were no unresolved method references from the jar file(s) :";

/// Renders the linkage report for the archives named by `arguments`, as given
/// on the command line. Each finding is one line.
pub fn render_linkage_report(
    arguments: &[String],
    unresolved: &[FullyQualifiedMethodSignature],
) -> String {
    let mut out = String::new();
    if unresolved.is_empty() {
        out.push_str(NO_UNRESOLVED_PREFIX);
        out.push('[');
        out.push_str(&arguments.join(", "));
        out.push(']');
        return out;
    }

    out.push_str(UNRESOLVED_HEADER);
    out.push('\n');
    for reference in unresolved {
        let _ = writeln!(out, "{}", reference);
    }
    out
}
