pub mod flatten;

pub use flatten::{corpus, flatten_row, flatten_sheet};
