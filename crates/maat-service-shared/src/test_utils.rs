//! Handler test fixtures backed by in-memory providers.

pub use maat_lib::test_helpers::{
    place_row, sample_rows, FakeGeocoder, FakeIpLocator, FakePlaces, FakeProviders,
};

use crate::state::AppState;

/// State over `fakes` with the places key reported as configured.
pub fn state_with(fakes: &FakeProviders) -> AppState {
    AppState::new(fakes.finder(), true)
}

/// State over the three sample rows, with the fakes kept for assertions.
pub fn test_state() -> (AppState, FakeProviders) {
    let fakes = FakeProviders::with_sample_rows();
    (state_with(&fakes), fakes)
}
