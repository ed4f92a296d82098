// Output formatting — terminal display and JSON export.

pub mod export;
pub mod terminal;
