//! Workbook store: physical .xlsx/.xlsm I/O at the run's boundaries.

pub mod exporter;
pub mod importer;

pub use exporter::save;
pub use importer::load;
