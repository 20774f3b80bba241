//! Shared primitive types.
mod balance;
pub use balance::*;

mod call;
pub use call::*;

mod entrypoint;
pub use entrypoint::*;

mod erc20;
pub use erc20::*;

mod quote;
pub use quote::*;

mod receipt;
pub use receipt::*;

mod signed;
pub use signed::*;

mod token;
pub use token::*;
