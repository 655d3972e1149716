mod state;

pub use state::{ClientSnapshot, ClientState, HotkeyGuard};
