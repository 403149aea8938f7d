pub mod add_target;
pub mod allocate;
pub mod claim;
pub mod custody;
pub mod deposit;
pub mod governance;
pub mod harvest;
pub mod initialize;
pub mod reclaim;
pub mod request;
pub mod shares;
pub mod targets;
pub mod toggle_target;
pub mod update_whitelist;
pub mod withdraw;

pub use add_target::*;
pub use allocate::*;
pub use claim::*;
pub use deposit::*;
pub use governance::*;
pub use harvest::*;
pub use initialize::*;
pub use reclaim::*;
pub use request::*;
pub use shares::*;
pub use toggle_target::*;
pub use update_whitelist::*;
pub use withdraw::*;
