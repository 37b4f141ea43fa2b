mod common;

mod token_exchange;
