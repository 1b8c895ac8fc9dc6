pub mod migrate;
pub mod operator;
