pub(crate) mod common;

mod csv_store;
