//! Cross-module scenarios
//!
//! Exercise the collision system and the message bus together the way a
//! game loop drives them.

mod gameplay_messaging;
mod platformer_scenarios;
