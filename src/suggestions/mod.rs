//! Suggestion engine (scoring, skill progression, history, feedback).

pub mod engine;
pub mod feedback;
pub mod history;
pub mod session;
pub mod shared;
pub mod skill;

pub use engine::{Candidate, Evaluation, Recommender};
pub use feedback::{Experiment, Pairing, PairingLedger, Rating};
pub use history::{History, SuggestionResult};
pub use session::{ChefSession, FeedbackOutcome, SessionSnapshot};
pub use shared::SharedSession;
pub use skill::{SkillState, SkillTier, TierPolicy};
