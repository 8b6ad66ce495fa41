pub mod average;
pub mod create;
pub mod next;
pub mod total;
pub mod upcoming;
