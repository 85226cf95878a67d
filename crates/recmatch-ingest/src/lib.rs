//! Loading and saving datasets as delimited text files.
//!
//! `.csv` files use a comma delimiter and `.tsv` files a tab. Any other
//! extension is rejected with [`IngestError::UnsupportedExtension`].

#![deny(unsafe_code)]

pub mod delimited;
pub mod error;

pub use delimited::{DelimitedFormat, read_dataset, write_dataset};
pub use error::{IngestError, Result};
