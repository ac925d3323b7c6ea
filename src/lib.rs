pub mod address;
pub mod anonymize;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod guard;
pub mod i18n;
pub mod logger;
pub mod message;
pub mod scorer;
pub mod validators;
pub mod word_list;

pub use cache::{ListCache, MemoryCache, PassThrough, WordListCache};
pub use classifier::{Decision, Reason, Thresholds};
pub use config::{Config, ValidatorFailurePolicy};
pub use error::{BoxError, GuardError};
pub use guard::{SpamGuard, Verdict};
pub use i18n::{Catalog, Translator};
pub use message::{Message, Submission};
pub use scorer::{CompiledWordList, ScoreResult, SpamScorer};
pub use validators::CustomValidator;
pub use word_list::{WordList, WordListStore};
