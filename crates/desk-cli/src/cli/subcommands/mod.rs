pub mod notify;
pub mod report;
pub mod stock;
pub mod user;

pub use notify::{NotifyCommands, NotifySendArgs};
pub use report::ReportCommands;
pub use stock::StockCommands;
pub use user::{UserCommands, UserCreateArgs};
