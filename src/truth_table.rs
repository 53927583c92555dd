use std::collections::{BTreeMap, BTreeSet};

/// Anything that can be evaluated under every assignment of its variables.
pub trait BuildTruthTable<'a, T> {
    fn build_truth_table(&'a self) -> TruthTable<'a, T>;
}

/// Exhaustive evaluation table. Only usable for small variable counts: the
/// arrangement is a `u128` bit mask and every arrangement gets a row.
pub struct TruthTable<'a, T> {
    pub var_to_index_map: BTreeMap<&'a T, usize>,
    pub index_to_var_map: BTreeMap<usize, &'a T>,
    rows: BTreeMap<u128, bool>,
}

impl<'a, T, I> From<I> for TruthTable<'a, T> where I: IntoIterator<Item=&'a T>, T: Ord {
    fn from(iter: I) -> Self {
        let unique = iter.into_iter().collect::<BTreeSet<_>>();

        let index_to_var_map: BTreeMap<usize, &T> = unique.iter().copied().enumerate().collect();
        let var_to_index_map: BTreeMap<&T, usize> = unique.iter().enumerate().map(|(index, &var)| (var, index)).collect();

        Self {
            var_to_index_map,
            index_to_var_map,
            rows: BTreeMap::default(),
        }
    }
}

impl<'a, T> TruthTable<'a, T> {
    pub fn num_vars(&self) -> usize {
        self.var_to_index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.var_to_index_map.is_empty()
    }

    pub fn add_row(&mut self, arrangement: u128, result: bool) {
        self.rows.insert(arrangement, result);
    }

    pub fn is_satisfiable(&self) -> bool {
        self.rows.values().any(|&value| value)
    }

    /// Satisfying assignments, one map per true row.
    pub fn models(&self) -> Vec<BTreeMap<&'a T, bool>> where T: Ord {
        self.rows
            .iter()
            .filter(|(_, value)| **value)
            .map(|(&arrangement, _)| {
                self.index_to_var_map
                    .iter()
                    .map(|(&bit, &var)| (var, arrangement & (1 << bit) != 0))
                    .collect()
            })
            .collect()
    }

    pub fn to_matrix(&self) -> Vec<Vec<bool>> {
        let mut rows = vec![];
        for (&arrangement, &value) in self.rows.iter() {
            let mut row = (0..self.var_to_index_map.len()).map(|bit| arrangement & (1 << bit) != 0).collect::<Vec<_>>();
            row.push(value);
            rows.push(row);
        }

        rows.sort_unstable();
        rows
    }
}

impl<'a, T: Ord> TruthTable<'a, T> {
    /// Existentially quantifies every variable outside `vars`: a projected
    /// arrangement is true when some extension of it is true.
    pub fn project(&self, vars: impl IntoIterator<Item=&'a T>) -> BTreeMap<Vec<bool>, bool> {
        let unique_vars = vars.into_iter().collect::<BTreeSet<_>>();
        let bits = unique_vars
            .iter()
            .filter_map(|var| self.var_to_index_map.get(var).copied())
            .collect::<Vec<_>>();

        let mut projection = BTreeMap::new();
        for (&arrangement, &value) in self.rows.iter() {
            let row = bits.iter().map(|&bit| arrangement & (1 << bit) != 0).collect::<Vec<_>>();
            *projection.entry(row).or_insert(false) |= value;
        }

        projection
    }

    pub fn extract_intersecting_vars(&self, other: &TruthTable<'a, T>) -> BTreeSet<&'a T> {
        let self_keys = self.var_to_index_map.keys().copied().collect::<BTreeSet<_>>();
        let other_keys = other.var_to_index_map.keys().copied().collect::<BTreeSet<_>>();

        self_keys.intersection(&other_keys).copied().collect()
    }

    /// Both tables agree on every arrangement of their shared variables once the
    /// remaining variables are existentially quantified. Comparing a formula
    /// with its asserted Tseitin encoding this way checks equisatisfiability
    /// per assignment of the original variables.
    pub fn agrees_with(&self, other: &TruthTable<'a, T>) -> bool {
        let vars = self.extract_intersecting_vars(other);
        if vars.is_empty() {
            return self.is_satisfiable() == other.is_satisfiable();
        }

        self.project(vars.iter().copied()) == other.project(vars.iter().copied())
    }
}
