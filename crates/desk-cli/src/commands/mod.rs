pub mod dispatch;
pub mod init;
pub mod notify;
pub mod report;
pub mod serve;
pub mod stock;
pub mod user;
