/// Time of day and user agent helpers for pages
pub mod clock;
/// Escaping of parameter values
pub mod codec;
/// Host side of the status channel
pub mod data;
/// Hover-driven nested list menus
pub mod menu;
/// Data messages sent from a page over the status channel
pub mod message;
/// Reading parameters from a page address
pub mod query;

pub use data::{DataDispatcher, DataError, NaviData};
pub use menu::DropdownMenu;
pub use message::{QueryMessage, StatusChannel, StdoutChannel, STATUS_TAG};
pub use query::{Location, PageQuery, QueryParameter};
