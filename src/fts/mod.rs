pub mod ascii;
pub mod ngram;
pub mod registry;
pub mod tokenizer;
pub mod unicode61;
