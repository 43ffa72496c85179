// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ledger;
pub mod modal;
pub mod model;
pub mod preview;
pub mod state;

pub use forms::*;
pub use ledger::*;
pub use modal::*;
pub use model::*;
pub use preview::*;
pub use state::*;
