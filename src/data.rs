pub mod diagnostics;
pub mod loader;
pub mod observation;
pub mod reclassify;
pub mod table;
pub mod writer;
