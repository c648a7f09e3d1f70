pub mod config;
pub mod errors;
pub mod filters;
pub mod printer;
pub mod results;
pub mod search;

pub use config::{BinaryMode, DeviceAction, DirectoryAction, PatternSyntax, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use filters::FilterSet;
pub use printer::Printer;
pub use results::{FileReport, RunSummary};
pub use search::{search_paths, PatternMatcher, Record, STDIN_NAME};
