#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Values computed lazily, once per thread, and cached in that thread only.
//!
//! [`LazyThreadLocal`] pairs a [`Producer`] with a private slot on every
//! thread that touches it. A slot is filled on the first access from its
//! thread and then reused; a producer failure leaves it empty so the next
//! access retries.

pub mod error;
pub mod identity;
pub mod lazy;
pub mod producer;

pub use error::Error;
pub use identity::Identity;
pub use lazy::LazyThreadLocal;
pub use producer::{Infallible, Producer};
