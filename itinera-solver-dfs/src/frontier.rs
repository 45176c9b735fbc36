//! Visited stacks scoped to one planning call.

/// Restaurants and attractions already placed on the partial itinerary.
///
/// Every push is paired with a pop on backtrack, so after any failed branch
/// the stacks are back to their length on entry.
///
/// # Examples
/// ```
/// use itinera_solver_dfs::VisitedStacks;
///
/// let mut visited = VisitedStacks::default();
/// visited.push_attraction(3, "garden", "Humble Administrator's Garden");
/// assert!(visited.has_attraction(3));
/// visited.pop_attraction();
/// assert!(visited.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedStacks {
    restaurants: Vec<usize>,
    cuisines: Vec<String>,
    attractions: Vec<usize>,
    spot_types: Vec<String>,
    attraction_names: Vec<String>,
}

impl VisitedStacks {
    /// Record a restaurant visit.
    pub fn push_restaurant(&mut self, index: usize, cuisine: impl Into<String>) {
        self.restaurants.push(index);
        self.cuisines.push(cuisine.into());
    }

    /// Undo the latest restaurant visit.
    pub fn pop_restaurant(&mut self) {
        self.restaurants.pop();
        self.cuisines.pop();
    }

    /// Record an attraction visit.
    pub fn push_attraction(
        &mut self,
        index: usize,
        spot_type: impl Into<String>,
        name: impl Into<String>,
    ) {
        self.attractions.push(index);
        self.spot_types.push(spot_type.into());
        self.attraction_names.push(name.into());
    }

    /// Undo the latest attraction visit.
    pub fn pop_attraction(&mut self) {
        self.attractions.pop();
        self.spot_types.pop();
        self.attraction_names.pop();
    }

    /// Whether restaurant `index` is already on the plan.
    #[must_use]
    pub fn has_restaurant(&self, index: usize) -> bool {
        self.restaurants.contains(&index)
    }

    /// Whether attraction `index` is already on the plan.
    #[must_use]
    pub fn has_attraction(&self, index: usize) -> bool {
        self.attractions.contains(&index)
    }

    /// Cuisines eaten so far, oldest first.
    #[must_use]
    pub fn cuisines(&self) -> &[String] {
        &self.cuisines
    }

    /// Attraction types visited so far, oldest first.
    #[must_use]
    pub fn spot_types(&self) -> &[String] {
        &self.spot_types
    }

    /// Attraction names visited so far, oldest first.
    #[must_use]
    pub fn attraction_names(&self) -> &[String] {
        &self.attraction_names
    }

    /// Restaurant and attraction stack depths.
    #[must_use]
    pub const fn depth(&self) -> (usize, usize) {
        (self.restaurants.len(), self.attractions.len())
    }

    /// Whether nothing has been visited.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.restaurants.is_empty() && self.attractions.is_empty()
    }

    /// Forget every visit.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
