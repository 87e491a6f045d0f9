pub mod calculator;
pub mod scenarios;
