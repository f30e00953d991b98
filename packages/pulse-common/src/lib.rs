pub mod decimal;
pub mod message;
pub mod types;
pub mod verify;

pub use decimal::Decimal;
pub use message::{consensus_digest, update_digest, MessageError};
pub use types::{FeedSubmission, Quote};
pub use verify::{recover_pubkey, VerifyError};
