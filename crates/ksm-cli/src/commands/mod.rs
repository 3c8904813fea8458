mod ckc;
mod debug_ckc;
mod inspect_spc;

pub use self::ckc::CkcCommand;
pub use self::debug_ckc::DebugCkcCommand;
pub use self::inspect_spc::InspectSpcCommand;
