/// `[OPTIONS] COUPLING` (spec §4.4): whether equilibrium equations are
/// nested inside each ODE derivative evaluation or solved only between
/// steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coupling {
    #[default]
    None,
    Full,
}
