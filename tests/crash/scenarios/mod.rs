//! Crash scenarios, grouped by the phase of the drain that is interrupted

mod commit;
mod swap;
