pub mod migrate;
pub mod report;
