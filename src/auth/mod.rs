pub mod allow_list;

pub use allow_list::{InvalidToken, TokenAllowList};
