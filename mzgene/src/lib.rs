#![doc = include_str!("../README.md")]

mod annotate;
mod collapse;
mod helper_functions;
mod identifier;
mod mapping_error;
mod merge;
mod output;
mod parameters;
mod report;
mod resolver;
mod service;
mod table;

pub use annotate::*;
pub use collapse::*;
pub use identifier::*;
pub use mapping_error::*;
pub use merge::*;
pub use output::*;
pub use parameters::*;
pub use report::*;
pub use resolver::*;
pub use service::*;
pub use table::*;
