pub mod cancel;
pub mod poller;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use poller::{Completion, Poller};
