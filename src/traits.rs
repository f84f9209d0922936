pub trait Filter {
    /// Let the input through unchanged and clear the delay registers.
    fn set_passthrough(&mut self);
    /// Output silence and clear the delay registers.
    fn set_mute(&mut self);
}

pub trait BasicFilter {
    /// Perform one step of a filter.
    fn step(&mut self, x: f64) -> f64;
    /// Clear the delay registers, keeping the coefficients.
    fn reset(&mut self);
}
