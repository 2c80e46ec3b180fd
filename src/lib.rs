pub mod audit;
pub mod formats;
pub mod model;
pub mod rational;
pub mod report;
pub mod tabulator;
pub mod tiebreak;
