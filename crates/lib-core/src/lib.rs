pub mod ast;
pub mod dialects;
pub mod errors;
pub mod generator;
pub mod helpers;
pub mod parser;
pub mod value;

#[cfg(test)]
mod test_functions;
