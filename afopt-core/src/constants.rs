/// Climb sizes analyzed for display tiers: how many positions above the
/// player each tier attempts to jump. Sizes beyond the number of players
/// above clamp to it. The overtake planners ignore this list and derive the
/// full 1..=N range instead, since the knapsack needs every option.
pub const TIER_TARGETS: [usize; 7] = [1, 3, 5, 10, 15, 20, 25];

/// Steepness of the exponential difficulty weight applied to planner costs:
/// weight = exp(K * (1 - target_rank / current_rank)).
///
/// The weight is 1.0 for a zero climb and grows toward exp(K) as the target
/// approaches rank 1, so time-cheap but unrealistic deep climbs stop looking
/// attractive to the optimizer. It multiplies cost only — positions gained
/// are never reweighted.
pub const DIFFICULTY_STEEPNESS: f64 = 5.0;

/// Guard added before taking the ceiling of the positions requirement, so an
/// exactly-representable boundary (e.g. a gap worth exactly 3.0 positions)
/// is not pushed below its ceiling by floating-point rounding.
pub const REQUIREMENT_EPSILON: f64 = 1e-9;
