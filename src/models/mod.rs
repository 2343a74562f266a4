pub mod black_scholes;
pub mod path;
pub mod random;

/// Source of independent standard normal draws.
/// Injected into path generation so runs can be seeded or fully scripted.
/// Send required for use on tokio blocking workers.
pub trait NormalSource: Send {
    /// Next draw Z ~ N(0, 1). Never fails.
    fn next_normal(&mut self) -> f64;
}

