//! Monte Carlo estimate of the yearly return of a peer-lending auto-invest
//! portfolio, driven by a discrete-event simulation of cash being re-lent
//! across a pool of credits.

pub mod analysis;
pub mod config;
pub mod credit;
pub mod error;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod montecarlo;
pub mod report;
pub mod scheduler;
pub mod simulation;
pub mod types;

pub use error::{Result, SimError};
