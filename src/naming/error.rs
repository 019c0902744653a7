use thiserror::Error;

use crate::product::ProductFormat;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("product format not recognized")]
    UnknownFormat,
    #[error("`{name}` does not follow the {format} layout ({layout})")]
    Malformed {
        name: String,
        format: ProductFormat,
        layout: &'static str,
    },
}
