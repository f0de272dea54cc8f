pub mod history;
pub mod learning;
pub mod profile;
pub mod recorder;

pub use history::{MatchOutcome, MatchRecord, MoveEvent};
pub use learning::{CardScoreReader, CardScoreWriter, card_score_store};
pub use profile::{OpponentProfile, OpponentProfileStore};
pub use recorder::{MAX_RETAINED_MATCHES, MatchRecorder};
