// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod evento;
pub mod usuario;

pub use evento::Evento;
pub use usuario::Usuario;
