pub mod inventory;
pub mod menu;
pub mod orders;
pub mod reports;

pub use inventory::InventoryHandler;
pub use menu::MenuHandler;
pub use orders::{OrderHandler, ValidatedOrder};
pub use reports::ReportHandler;
