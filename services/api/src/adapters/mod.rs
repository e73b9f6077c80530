pub mod csv_store;
pub mod db;

pub use csv_store::CsvEventStore;
pub use db::DbAdapter;
