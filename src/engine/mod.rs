pub mod hooks;
pub mod power_up;
pub mod resolve;
pub mod session;
pub mod swap;

pub use hooks::{GameEvent, GameHooks};
pub use power_up::{Inventory, PowerUp};
pub use resolve::{Resolution, Round};
pub use session::{ActivateOutcome, GameState, Session, Summary, TapOutcome};
pub use swap::SwapOutcome;
