mod calendar;
mod countries;

pub use calendar::CalendarSystem;
pub use countries::{CountrySystem, COUNTRIES_STREAM};
