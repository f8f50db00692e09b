use crate::models::StopLossRecord;
use std::collections::HashSet;

/// Keep the stop-loss records whose symbol has an open position.
///
/// An empty symbol set means position data is missing or not loaded yet,
/// so every record is returned rather than hiding all stop-loss state.
pub fn filter_records(
    records: &[StopLossRecord],
    open_symbols: &HashSet<String>,
) -> Vec<StopLossRecord> {
    if open_symbols.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|r| open_symbols.contains(&r.symbol))
        .cloned()
        .collect()
}

/// True if `new` differs from `last`: a different size, or a symbol `last` lacks.
///
/// With equal sizes any removed symbol implies an added one, so this catches
/// every change of set membership.
pub fn symbols_changed(last: &HashSet<String>, new: &HashSet<String>) -> bool {
    last.len() != new.len() || new.iter().any(|s| !last.contains(s))
}
