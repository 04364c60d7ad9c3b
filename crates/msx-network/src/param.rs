/// A kinetic parameter with a network-wide default; individual links and
/// tanks may override it (see `Link::param_values` / `Tank::param_values`,
/// which are dense vectors indexed by `ParamId`, pre-filled with the default
/// and overwritten by `[PARAMETERS]` lines).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    pub name: String,
    pub default_value: f64,
}

/// A scalar constant, global in scope.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constant {
    pub name: String,
    pub value: f64,
}
