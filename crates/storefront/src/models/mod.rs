//! Domain models for the storefront.
//!
//! Everything here is plain data plus pure operations. Persistence to the
//! visitor's storage lives in `services`.

pub mod cart;
pub mod identity;
pub mod notice;
pub mod session;

pub use cart::{Cart, CartDecodeError, CartLine};
pub use identity::Identity;
pub use notice::{Notice, NoticeLevel};
pub use session::keys as session_keys;
