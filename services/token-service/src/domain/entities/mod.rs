mod refresh_token;

pub use refresh_token::*;
