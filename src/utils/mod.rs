pub mod jwt;
pub mod seats;
pub mod uploads;
