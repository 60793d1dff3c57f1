// handlers/mod.rs - two security tiers
//
// Public (no auth): service info, health and the Google sign-in flow.
// Protected (admin JWT): profile and sheet operations under /api.
pub mod protected;
pub mod public;
