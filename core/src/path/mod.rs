//! Represents the file-system side of git paths: file modes and the
//! ordering rules git applies to names within a tree.

mod file_mode;
pub use file_mode::FileMode;

mod path_mode;
pub use path_mode::PathMode;
