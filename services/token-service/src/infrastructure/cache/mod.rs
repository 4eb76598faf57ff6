mod ephemeral_token_store;

pub use ephemeral_token_store::*;
