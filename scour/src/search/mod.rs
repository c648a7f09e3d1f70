pub mod context;
pub mod engine;
pub mod matcher;
pub mod processor;
pub mod splitter;

pub use engine::{search_paths, STDIN_NAME};
pub use matcher::{MatchStrategy, PatternMatcher};
pub use processor::FileProcessor;
pub use splitter::Record;
