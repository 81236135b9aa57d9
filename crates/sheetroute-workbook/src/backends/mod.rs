#[cfg(feature = "calamine")]
pub mod calamine;

#[cfg(feature = "calamine")]
pub use calamine::CalamineAdapter;

#[cfg(feature = "csv")]
pub mod csv;

#[cfg(feature = "csv")]
pub use csv::CsvAdapter;

#[cfg(feature = "umya")]
pub mod umya;

#[cfg(feature = "umya")]
pub use umya::UmyaAdapter;
