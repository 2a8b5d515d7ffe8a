/// Pen-position bookkeeping for one path translation.
///
/// Holds the current point and a LIFO stack of saved points. It knows nothing
/// about command kinds; the translator is the only caller that moves the pen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformContext {
    current_x: f64,
    current_y: f64,
    saved: Vec<(f64, f64)>,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_x(&self) -> f64 {
        self.current_x
    }

    pub fn current_y(&self) -> f64 {
        self.current_y
    }

    pub fn current_point(&self) -> (f64, f64) {
        (self.current_x, self.current_y)
    }

    /// Sets the current point to an absolute position.
    pub fn translate(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;
    }

    /// Saves the current point and restarts from the origin.
    pub fn begin_scope(&mut self) {
        self.saved.push((self.current_x, self.current_y));
        self.translate(0.0, 0.0);
    }

    /// Restores the point saved by the matching `begin_scope`. An unbalanced
    /// call lands on the origin.
    pub fn end_scope(&mut self) {
        let (x, y) = self.saved.pop().unwrap_or((0.0, 0.0));
        self.translate(x, y);
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}
