pub mod chain;
pub mod document;
pub mod extract;
pub mod sections;
pub mod strategies;
