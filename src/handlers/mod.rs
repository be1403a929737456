// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) -> Protected (tenant token) -> Elevated (platform token)
//
// The tiers only decide which guard sits in front of a route; all
// business rules live in `crate::services`.
pub mod elevated; // Tier 3: super-admin token required (/admin/*)
pub mod protected; // Tier 2: tenant token required
pub mod public; // Tier 1: no authentication
