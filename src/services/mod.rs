pub mod customers;
pub mod dashboard;
