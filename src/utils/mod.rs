mod cancel;
mod distance;
mod retry;

pub use cancel::CancelToken;
pub use distance::levenshtein;
pub use retry::{Retryable, with_retry};
