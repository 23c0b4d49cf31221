pub mod classifier;
pub mod identifier;


pub use classifier::{Classification, ClassifierRules, QueryClassifier, classify};
pub use identifier::{format_identifier, normalize_identifier};
