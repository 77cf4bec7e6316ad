mod category;
mod ledger;
mod money;
mod record;
mod window;

pub use category::*;
pub use ledger::*;
pub use money::*;
pub use record::*;
pub use window::*;
