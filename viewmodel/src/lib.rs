//! Finite-state view model for the MuseCam flow.
//!
//! UI layers tend to grow ad hoc boolean flags (loading, error text,
//! camera-on). Here the whole flow is one [`Phase`] value advanced by pure
//! transitions, with a broadcast [`UiBus`] for observers that want to
//! follow along without touching the state.

pub mod bus;
pub mod state;

pub use bus::{UiBus, UiEvent};
pub use state::{Input, Phase, ViewModel};
