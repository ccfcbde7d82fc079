// handlers/mod.rs - two tiers: public (anyone) and protected (logged in)
pub mod protected;
pub mod public;
