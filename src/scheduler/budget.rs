//! # Budget Enforcement
//!
//! Derivazione dell'allowance di memoria per-thread dal budget globale.
//! Calcolata una sola volta alla costruzione del pool e passata per valore
//! a ogni worker: nessuna sincronizzazione successiva.

/// Minimum per-thread allowance in MB. Guarantees no worker is starved to
/// an unworkable allowance when the budget is small or the thread count
/// large.
pub const ALLOWANCE_FLOOR_MB: u64 = 100;

/// Derive the per-thread memory allowance from a global budget.
pub fn per_thread_allowance_mb(budget_mb: u64, thread_count: usize) -> u64 {
    let share = budget_mb / thread_count.max(1) as u64;
    share.max(ALLOWANCE_FLOOR_MB)
}
