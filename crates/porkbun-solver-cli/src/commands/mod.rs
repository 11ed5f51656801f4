pub mod challenge;

pub use challenge::{ChallengeAction, ChallengeCommand, SolverArgs};
